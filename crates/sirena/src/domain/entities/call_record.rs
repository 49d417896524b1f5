//! CallRecord - Record of one emergency call
//!
//! Built once by the record builder, then only extended with
//! delivery attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DeliveryAttempt, TriageAnswers};
use crate::domain::value_objects::{DestinationService, EmergencyType, LocationClass, Priority};

/// Call record identifier, monotonically increasing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CallId(pub i64);

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Person who placed the call
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallerInfo {
    pub name: String,
    pub surname: String,
    pub phone: String,
    /// National identity document number
    #[serde(default)]
    pub national_id: Option<String>,
}

impl CallerInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.trim(), self.surname.trim())
            .trim()
            .to_string()
    }
}

/// Street address of the emergency
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub between_streets: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
}

impl Address {
    /// Single-line address as read out to responders
    pub fn to_text(&self) -> String {
        let mut text = self.street.trim().to_string();

        if let Some(number) = non_blank(&self.number) {
            text.push(' ');
            text.push_str(number);
        }
        if let Some(between) = non_blank(&self.between_streets) {
            text.push_str(", between ");
            text.push_str(between);
        }
        if let Some(neighborhood) = non_blank(&self.neighborhood) {
            text.push_str(", ");
            text.push_str(neighborhood);
        }

        text
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Operator input for a new call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallInput {
    pub emergency_type: EmergencyType,
    pub location_class: LocationClass,
    /// Required for medical calls, ignored otherwise
    #[serde(default)]
    pub triage_answers: Option<TriageAnswers>,
    /// Operator escalation; can raise the computed priority, never lower it
    #[serde(default)]
    pub declared_priority: Option<Priority>,
    pub caller: CallerInfo,
    pub address: Address,
    #[serde(default)]
    pub observations: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
}

/// CallRecord - Immutable call record plus its delivery history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub id: CallId,
    pub timestamp: DateTime<Utc>,
    pub emergency_type: EmergencyType,
    pub location_class: LocationClass,
    pub triage_answers: Option<TriageAnswers>,
    pub priority: Priority,
    pub primary_destination: DestinationService,
    pub caller: CallerInfo,
    pub address: Address,
    pub observations: Option<String>,
    pub operator: Option<String>,
    pub notification_outcomes: Vec<DeliveryAttempt>,
}

impl CallRecord {
    /// Destinations to notify: the primary service, then the supervisor
    pub fn destinations(&self) -> Vec<DestinationService> {
        let mut destinations = vec![self.primary_destination];
        if self.primary_destination != DestinationService::Supervisor {
            destinations.push(DestinationService::Supervisor);
        }
        destinations
    }

    pub fn append_attempt(&mut self, attempt: DeliveryAttempt) {
        self.notification_outcomes.push(attempt);
    }

    /// Attempts made for one destination, in order
    pub fn attempts_for(
        &self,
        destination: DestinationService,
    ) -> impl Iterator<Item = &DeliveryAttempt> + '_ {
        self.notification_outcomes
            .iter()
            .filter(move |a| a.destination == destination)
    }

    pub fn delivered_to(&self, destination: DestinationService) -> bool {
        self.attempts_for(destination).any(|a| a.is_success())
    }

    /// Destinations with no successful attempt
    pub fn failed_destinations(&self) -> Vec<DestinationService> {
        self.destinations()
            .into_iter()
            .filter(|d| !self.delivered_to(*d))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_text_skips_blank_parts() {
        let address = Address {
            street: "San Martín".to_string(),
            number: Some("450".to_string()),
            between_streets: Some("  ".to_string()),
            neighborhood: Some("Centro".to_string()),
        };
        assert_eq!(address.to_text(), "San Martín 450, Centro");
    }

    #[test]
    fn test_caller_full_name() {
        let caller = CallerInfo {
            name: "Ana".to_string(),
            surname: "Gómez".to_string(),
            ..Default::default()
        };
        assert_eq!(caller.full_name(), "Ana Gómez");
    }
}
