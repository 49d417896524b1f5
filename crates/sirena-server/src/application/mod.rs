//! Application Layer (Use Cases)
//!
//! Server-side use cases on top of the engine's call orchestrator.

mod call_service;
mod messaging_service;

pub use call_service::CallService;
pub use messaging_service::MessagingService;
