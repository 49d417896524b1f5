//! Application Layer (Use Cases)
//!
//! Coordinates domain services with the store and the messaging
//! endpoint for each incoming call.

mod call_orchestrator;
mod notification_dispatcher;

pub use call_orchestrator::{CallOrchestrator, CallOutcome};
pub use notification_dispatcher::NotificationDispatcher;
