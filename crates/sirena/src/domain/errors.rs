//! Domain Errors
//!
//! Error types for domain operations, plus the non-fatal warnings a
//! call can finish with.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::value_objects::{DestinationService, EmergencyType, LocationClass, Priority};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or incomplete call input; nothing was persisted
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No route for {emergency_type} / {location_class} / {priority}")]
    UnmappedRoute {
        emergency_type: EmergencyType,
        location_class: LocationClass,
        priority: Priority,
    },

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DomainError {
    pub fn not_found<T: AsRef<str>, I: std::fmt::Display>(entity_type: T, id: I) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }

    pub fn invalid_input<T: Into<String>>(message: T) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Whether trying the same operation again can succeed
    ///
    /// Bad input and missing configuration fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidInput(_) | Self::Configuration(_))
    }
}

/// Non-fatal problem attached to an otherwise recorded call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallWarning {
    /// Some, but not all, destinations could not be notified
    PartialNotificationFailure { failed: Vec<DestinationService> },

    /// No destination could be notified
    NotificationFailure { failed: Vec<DestinationService> },

    /// The store rejected a delivery attempt; the record itself is saved
    DeliveryNotRecorded {
        destination: DestinationService,
        attempt_number: u32,
        reason: String,
    },
}

impl std::fmt::Display for CallWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PartialNotificationFailure { failed } => {
                write!(f, "notification failed for: {}", join(failed))
            }
            Self::NotificationFailure { failed } => {
                write!(f, "no destination was notified ({})", join(failed))
            }
            Self::DeliveryNotRecorded {
                destination,
                attempt_number,
                reason,
            } => write!(
                f,
                "attempt {} to {} was not recorded: {}",
                attempt_number, destination, reason
            ),
        }
    }
}

fn join(destinations: &[DestinationService]) -> String {
    destinations
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
