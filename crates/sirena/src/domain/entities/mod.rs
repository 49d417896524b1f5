//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - TriageAnswers: Operator-entered medical facts
//! - CallRecord: Immutable record of one emergency call
//! - DeliveryAttempt: One try at notifying one destination
//! - NotificationMessage: Structured dispatch message

mod call_record;
mod delivery;
mod notification;
mod triage;

pub use call_record::*;
pub use delivery::*;
pub use notification::*;
pub use triage::*;
