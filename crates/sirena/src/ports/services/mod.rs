//! Service Ports
//!
//! Abstract interfaces for external services.

mod messaging;

pub use messaging::*;
