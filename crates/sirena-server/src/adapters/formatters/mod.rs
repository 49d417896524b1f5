//! Message Formatters
//!
//! Render a NotificationMessage, or an operator's text, for a specific
//! messaging endpoint.

use chrono::{DateTime, FixedOffset, Utc};

mod operator_text;
mod whatsapp_text;

pub use operator_text::{format_connection_test, format_manual_text};
pub use whatsapp_text::format_as_whatsapp_text;

/// Argentina time, UTC-3 all year
const LOCAL_OFFSET_SECS: i32 = -3 * 3600;

/// `dd/mm/yyyy HH:MM` in local time
fn local_time(at: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(LOCAL_OFFSET_SECS) {
        Some(offset) => at.with_timezone(&offset).format("%d/%m/%Y %H:%M").to_string(),
        None => at.format("%d/%m/%Y %H:%M").to_string(),
    }
}
