//! Ports (Interfaces)
//!
//! Abstract interfaces that define how the engine interacts with
//! external systems (record store, messaging endpoint, configuration).
//!
//! Implementations of these traits live in the infrastructure layer.

pub mod configuration;
pub mod repositories;
pub mod services;

// Re-exports
pub use configuration::*;
pub use repositories::*;
pub use services::*;
