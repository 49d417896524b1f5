//! DeliveryAttempt - One try at notifying one destination

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::DestinationService;

/// Detail recorded when a destination has no configured address
pub const UNCONFIGURED_DESTINATION: &str = "unconfigured_destination";
/// Detail recorded when an attempt or the whole dispatch ran out of time
pub const TIMEOUT: &str = "timeout";
/// Detail recorded when the task delivering to a destination died
pub const DELIVERY_TASK_FAILED: &str = "delivery_task_failed";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryAttempt {
    pub destination: DestinationService,
    /// 1-based attempt counter per destination
    pub attempt_number: u32,
    pub timestamp: DateTime<Utc>,
    pub outcome: DeliveryOutcome,
    pub error_detail: Option<String>,
}

impl DeliveryAttempt {
    pub fn success(
        destination: DestinationService,
        attempt_number: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            destination,
            attempt_number,
            timestamp,
            outcome: DeliveryOutcome::Success,
            error_detail: None,
        }
    }

    pub fn failure(
        destination: DestinationService,
        attempt_number: u32,
        timestamp: DateTime<Utc>,
        error_detail: impl Into<String>,
    ) -> Self {
        Self {
            destination,
            attempt_number,
            timestamp,
            outcome: DeliveryOutcome::Failure,
            error_detail: Some(error_detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == DeliveryOutcome::Success
    }
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryOutcome::Success => write!(f, "success"),
            DeliveryOutcome::Failure => write!(f, "failure"),
        }
    }
}

impl std::str::FromStr for DeliveryOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "success" => Ok(DeliveryOutcome::Success),
            "failure" => Ok(DeliveryOutcome::Failure),
            _ => Err(format!("Unknown delivery outcome: {}", s)),
        }
    }
}
