//! Plain-text chat rendering of a dispatch notification

use sirena::NotificationMessage;

use super::local_time;

pub fn format_as_whatsapp_text(message: &NotificationMessage) -> String {
    let mut text = format!(
        "🚨 EMERGENCY\n\n\
         {} TYPE: {}\n\
         {} PRIORITY: {}\n\n\
         👤 CALLER:\n{}\n📞 {}\n\n\
         📍 LOCATION:\n{}\n{} {}\n\n\
         📝 OBSERVATIONS:\n{}\n\n\
         ⏰ TIME: {}\n\
         🆔 CALL: #{}",
        message.emergency_type.emoji(),
        upper(&message.emergency_type.to_string()),
        message.priority.emoji(),
        upper(&message.priority.to_string()),
        message.caller_name,
        message.caller_phone,
        message.address_text,
        message.location_class.emoji(),
        upper(&message.location_class.to_string()),
        message.observations.as_deref().unwrap_or("No observations"),
        local_time(message.timestamp),
        message.call_id,
    );

    if let Some(operator) = &message.operator {
        text.push_str(&format!("\n👨‍💼 OPERATOR: {}", operator));
    }

    if let Some(findings) = message.triage_summary.as_ref().filter(|f| !f.is_empty()) {
        text.push_str("\n\n🩺 TRIAGE:");
        for finding in findings {
            text.push_str(&format!("\n⚠️ {}", finding));
        }
    }

    text
}

fn upper(value: &str) -> String {
    value.replace('_', " ").to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sirena::{CallId, EmergencyType, LocationClass, Priority};
    use uuid::Uuid;

    fn message() -> NotificationMessage {
        NotificationMessage {
            call_id: CallId(17),
            emergency_type: EmergencyType::Medical,
            priority: Priority::Red,
            location_class: LocationClass::PublicRoad,
            address_text: "San Martín 450, Centro".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 15, 30, 0).unwrap(),
            triage_summary: Some(vec!["NOT BREATHING".to_string()]),
            caller_name: "Ana Gómez".to_string(),
            caller_phone: "3515123456".to_string(),
            observations: None,
            operator: Some("operator-1".to_string()),
            delivery_key: format!("{}-cec", Uuid::new_v4()),
        }
    }

    #[test]
    fn test_medical_message() {
        let text = format_as_whatsapp_text(&message());

        assert!(text.contains("🏥 TYPE: MEDICAL"));
        assert!(text.contains("🔴 PRIORITY: RED"));
        assert!(text.contains("🛣️ PUBLIC ROAD"));
        assert!(text.contains("San Martín 450, Centro"));
        assert!(text.contains("No observations"));
        assert!(text.contains("⏰ TIME: 01/03/2025 12:30"));
        assert!(text.contains("🆔 CALL: #17"));
        assert!(text.contains("👨‍💼 OPERATOR: operator-1"));
        assert!(text.ends_with("🩺 TRIAGE:\n⚠️ NOT BREATHING"));
    }

    #[test]
    fn test_no_triage_section_without_findings() {
        let mut msg = message();
        msg.triage_summary = Some(vec![]);
        msg.operator = None;
        msg.observations = Some("Smoke from the roof".to_string());

        let text = format_as_whatsapp_text(&msg);
        assert!(!text.contains("TRIAGE"));
        assert!(!text.contains("OPERATOR"));
        assert!(text.contains("Smoke from the roof"));
    }
}
