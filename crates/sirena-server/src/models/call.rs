//! Call DTOs
//!
//! Enum fields travel as strings and accept both English names and the
//! Spanish intake-form values (`medica`, `via_publica`, `rojo`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use sirena::{
    Address, CallInput, CallOutcome, CallRecord, CallRecordFilter, CallWarning, CallerInfo,
    DeliveryAttempt, DomainError, TriageAnswers,
};

fn parse_field<T>(field: &str, value: &str) -> Result<T, DomainError>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e| DomainError::invalid_input(format!("{}: {}", field, e)))
}

/// Medical triage answers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct TriageRequest {
    pub conscious: bool,
    pub breathing: bool,
    #[serde(default)]
    pub severe_bleeding: bool,
    #[serde(default)]
    pub serious_base_pathology: bool,
    #[serde(default)]
    pub disability: bool,
}

impl From<TriageRequest> for TriageAnswers {
    fn from(t: TriageRequest) -> Self {
        Self {
            conscious: t.conscious,
            breathing: t.breathing,
            severe_bleeding: t.severe_bleeding,
            serious_base_pathology: t.serious_base_pathology,
            disability: t.disability,
        }
    }
}

impl From<TriageAnswers> for TriageRequest {
    fn from(t: TriageAnswers) -> Self {
        Self {
            conscious: t.conscious,
            breathing: t.breathing,
            severe_bleeding: t.severe_bleeding,
            serious_base_pathology: t.serious_base_pathology,
            disability: t.disability,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CallerDto {
    pub name: String,
    #[serde(default)]
    pub surname: String,
    pub phone: String,
    /// National identity document number
    pub national_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddressDto {
    pub street: String,
    pub number: Option<String>,
    pub between_streets: Option<String>,
    pub neighborhood: Option<String>,
}

/// Intake of a new emergency call
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCallRequest {
    /// medical | fire | security | civil_defense | other
    pub emergency_type: String,
    /// residence | public_road
    pub location_class: String,
    /// Required for medical calls
    pub triage: Option<TriageRequest>,
    /// Operator escalation (red | yellow | green); never lowers the computed priority
    pub declared_priority: Option<String>,
    pub caller: CallerDto,
    pub address: AddressDto,
    pub observations: Option<String>,
    pub operator: Option<String>,
}

impl CreateCallRequest {
    pub fn into_input(self) -> Result<CallInput, DomainError> {
        Ok(CallInput {
            emergency_type: parse_field("emergency_type", &self.emergency_type)?,
            location_class: parse_field("location_class", &self.location_class)?,
            triage_answers: self.triage.map(Into::into),
            declared_priority: self
                .declared_priority
                .as_deref()
                .map(|p| parse_field("declared_priority", p))
                .transpose()?,
            caller: CallerInfo {
                name: self.caller.name,
                surname: self.caller.surname,
                phone: self.caller.phone,
                national_id: self.caller.national_id,
            },
            address: Address {
                street: self.address.street,
                number: self.address.number,
                between_streets: self.address.between_streets,
                neighborhood: self.address.neighborhood,
            },
            observations: self.observations,
            operator: self.operator,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryAttemptResponse {
    pub destination: String,
    pub attempt_number: u32,
    pub timestamp: DateTime<Utc>,
    /// success | failure
    pub outcome: String,
    pub error_detail: Option<String>,
}

impl From<DeliveryAttempt> for DeliveryAttemptResponse {
    fn from(a: DeliveryAttempt) -> Self {
        Self {
            destination: a.destination.to_string(),
            attempt_number: a.attempt_number,
            timestamp: a.timestamp,
            outcome: a.outcome.to_string(),
            error_detail: a.error_detail,
        }
    }
}

/// Stored call record
#[derive(Debug, Serialize, ToSchema)]
pub struct CallResponse {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub emergency_type: String,
    pub location_class: String,
    pub priority: String,
    pub primary_destination: String,
    pub triage: Option<TriageRequest>,
    pub caller: CallerDto,
    pub address: AddressDto,
    pub address_text: String,
    pub observations: Option<String>,
    pub operator: Option<String>,
    pub attempts: Vec<DeliveryAttemptResponse>,
}

impl From<CallRecord> for CallResponse {
    fn from(record: CallRecord) -> Self {
        let address_text = record.address.to_text();

        Self {
            id: record.id.0,
            timestamp: record.timestamp,
            emergency_type: record.emergency_type.to_string(),
            location_class: record.location_class.to_string(),
            priority: record.priority.to_string(),
            primary_destination: record.primary_destination.to_string(),
            triage: record.triage_answers.map(Into::into),
            caller: CallerDto {
                name: record.caller.name,
                surname: record.caller.surname,
                phone: record.caller.phone,
                national_id: record.caller.national_id,
            },
            address: AddressDto {
                street: record.address.street,
                number: record.address.number,
                between_streets: record.address.between_streets,
                neighborhood: record.address.neighborhood,
            },
            address_text,
            observations: record.observations,
            operator: record.operator,
            attempts: record
                .notification_outcomes
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WarningResponse {
    /// partial_notification_failure | notification_failure | delivery_not_recorded
    pub kind: String,
    pub message: String,
}

impl From<CallWarning> for WarningResponse {
    fn from(warning: CallWarning) -> Self {
        let kind = match &warning {
            CallWarning::PartialNotificationFailure { .. } => "partial_notification_failure",
            CallWarning::NotificationFailure { .. } => "notification_failure",
            CallWarning::DeliveryNotRecorded { .. } => "delivery_not_recorded",
        };

        Self {
            kind: kind.to_string(),
            message: warning.to_string(),
        }
    }
}

/// Result of handling a call
#[derive(Debug, Serialize, ToSchema)]
pub struct HandleCallResponse {
    /// notified | notified_with_warnings
    pub state: String,
    pub call: CallResponse,
    pub warnings: Vec<WarningResponse>,
}

impl From<CallOutcome> for HandleCallResponse {
    fn from(outcome: CallOutcome) -> Self {
        Self {
            state: outcome.state.to_string(),
            call: outcome.record.into(),
            warnings: outcome.warnings.into_iter().map(Into::into).collect(),
        }
    }
}

/// Query parameters for listing calls
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListCallsQuery {
    /// Filter by emergency type
    pub emergency_type: Option<String>,
    /// Filter by priority
    pub priority: Option<String>,
    /// Maximum number of calls (default 50, max 500)
    pub limit: Option<u32>,
}

impl ListCallsQuery {
    pub const MAX_LIMIT: u32 = 500;

    pub fn into_filter(self) -> Result<CallRecordFilter, DomainError> {
        let defaults = CallRecordFilter::default();

        Ok(CallRecordFilter {
            emergency_type: self
                .emergency_type
                .as_deref()
                .map(|t| parse_field("emergency_type", t))
                .transpose()?,
            priority: self
                .priority
                .as_deref()
                .map(|p| parse_field("priority", p))
                .transpose()?,
            limit: self.limit.unwrap_or(defaults.limit).clamp(1, Self::MAX_LIMIT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sirena::{EmergencyType, LocationClass, Priority};

    fn request(json: serde_json::Value) -> CreateCallRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_intake_form_aliases() {
        let input = request(serde_json::json!({
            "emergency_type": "medica",
            "location_class": "via_publica",
            "triage": { "conscious": true, "breathing": false },
            "declared_priority": "amarillo",
            "caller": { "name": "Ana", "phone": "3515123456" },
            "address": { "street": "San Martín" }
        }))
        .into_input()
        .unwrap();

        assert_eq!(input.emergency_type, EmergencyType::Medical);
        assert_eq!(input.location_class, LocationClass::PublicRoad);
        assert_eq!(input.declared_priority, Some(Priority::Yellow));
        let answers = input.triage_answers.unwrap();
        assert!(!answers.breathing);
        assert!(!answers.severe_bleeding);
    }

    #[test]
    fn test_unknown_type_is_invalid_input() {
        let err = request(serde_json::json!({
            "emergency_type": "flood",
            "location_class": "residence",
            "caller": { "name": "Ana", "phone": "1" },
            "address": { "street": "X" }
        }))
        .into_input()
        .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(msg) if msg.starts_with("emergency_type")));
    }

    #[test]
    fn test_list_query_filter() {
        let filter = ListCallsQuery {
            emergency_type: Some("bomberos".to_string()),
            priority: None,
            limit: Some(10_000),
        }
        .into_filter()
        .unwrap();

        assert_eq!(filter.emergency_type, Some(EmergencyType::Fire));
        assert_eq!(filter.priority, None);
        assert_eq!(filter.limit, ListCallsQuery::MAX_LIMIT);

        assert_eq!(ListCallsQuery::default().into_filter().unwrap().limit, 50);
        assert!(ListCallsQuery {
            priority: Some("purple".to_string()),
            ..Default::default()
        }
        .into_filter()
        .is_err());
    }
}
