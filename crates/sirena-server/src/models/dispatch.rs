//! Dispatch DTOs
//!
//! Messaging endpoint status and operator-initiated messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct DestinationStatus {
    pub destination: String,
    /// Configuration key holding the address
    pub config_key: String,
    pub configured: bool,
}

/// Messaging endpoint readiness and destination configuration
#[derive(Debug, Serialize, ToSchema)]
pub struct DispatchStatusResponse {
    pub endpoint: String,
    pub endpoint_ready: bool,
    pub destinations: Vec<DestinationStatus>,
    pub max_attempts: u32,
    pub attempt_timeout_ms: u64,
    pub dispatch_deadline_ms: u64,
}

/// Free-form message from an operator
#[derive(Debug, Deserialize, ToSchema)]
pub struct ManualMessageRequest {
    pub phone: String,
    pub message: String,
    /// Shown in the message footer; defaults to "manual"
    #[serde(default, alias = "tipo")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageSentResponse {
    pub endpoint: String,
    pub to: String,
    /// Text as it was sent
    pub text: String,
    pub sent_at: DateTime<Utc>,
}
