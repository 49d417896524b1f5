//! Infrastructure Adapters
//!
//! Implementations of engine ports for external systems.

pub mod formatters;
pub mod postgres;
pub mod secrets;
pub mod whatsapp;

// Re-exports
pub use postgres::PgCallRecordRepository;
pub use secrets::SecretsConfigProvider;
pub use whatsapp::WhatsAppMessenger;
