//! Free-form texts sent by operators

use chrono::{DateTime, Utc};

use super::local_time;

/// Wrap an operator's message with the send time and message kind
pub fn format_manual_text(body: &str, kind: &str, at: DateTime<Utc>) -> String {
    format!(
        "📱 MANUAL MESSAGE\n\n{}\n\n⏰ {}\n📨 TYPE: {}",
        body.trim(),
        local_time(at),
        kind.trim().to_uppercase()
    )
}

pub fn format_connection_test(at: DateTime<Utc>) -> String {
    format!("🧪 Connection test - {}", local_time(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_text_layout() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 2, 5, 0).unwrap();
        let text = format_manual_text("  Road closed on Av. Goycoechea\n", "notice", at);

        assert_eq!(
            text,
            "📱 MANUAL MESSAGE\n\nRoad closed on Av. Goycoechea\n\n⏰ 28/02/2025 23:05\n📨 TYPE: NOTICE"
        );
    }

    #[test]
    fn test_connection_test_text() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 15, 30, 0).unwrap();
        assert_eq!(format_connection_test(at), "🧪 Connection test - 01/03/2025 12:30");
    }
}
