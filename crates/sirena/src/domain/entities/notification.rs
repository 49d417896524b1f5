//! NotificationMessage - Structured dispatch message
//!
//! What a responding service receives about a call. Adapters decide how
//! to render it (plain text, JSON, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CallId, CallRecord};
use crate::domain::value_objects::{DestinationService, EmergencyType, LocationClass, Priority};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub call_id: CallId,
    pub emergency_type: EmergencyType,
    pub priority: Priority,
    pub location_class: LocationClass,
    pub address_text: String,
    pub timestamp: DateTime<Utc>,
    /// Critical triage findings, only for medical calls
    pub triage_summary: Option<Vec<String>>,
    pub caller_name: String,
    pub caller_phone: String,
    pub observations: Option<String>,
    pub operator: Option<String>,
    /// Idempotency key; see `for_destination`
    pub delivery_key: String,
}

impl NotificationMessage {
    pub fn from_record(record: &CallRecord) -> Self {
        let triage_summary = record
            .triage_answers
            .filter(|_| record.emergency_type.is_medical())
            .map(|answers| {
                answers
                    .critical_signals()
                    .iter()
                    .map(|s| s.label().to_string())
                    .collect()
            });

        Self {
            call_id: record.id,
            emergency_type: record.emergency_type,
            priority: record.priority,
            location_class: record.location_class,
            address_text: record.address.to_text(),
            timestamp: record.timestamp,
            triage_summary,
            caller_name: record.caller.full_name(),
            caller_phone: record.caller.phone.clone(),
            observations: record
                .observations
                .clone()
                .filter(|o| !o.trim().is_empty()),
            operator: record.operator.clone(),
            delivery_key: Uuid::new_v4().to_string(),
        }
    }

    /// The copy sent to one destination
    ///
    /// Its key is unique per destination and shared by every retry to
    /// that destination, so the endpoint can drop duplicates without
    /// dropping another recipient's copy.
    pub fn for_destination(&self, destination: DestinationService) -> Self {
        Self {
            delivery_key: format!("{}-{}", self.delivery_key, destination),
            ..self.clone()
        }
    }
}
