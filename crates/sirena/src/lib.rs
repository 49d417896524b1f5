//! Sirena Engine Library
//!
//! Triage classification and dispatch routing for a municipal emergency
//! call center.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (CallRecord, DeliveryAttempt, TriageAnswers)
//!   - `value_objects/`: Immutable value types (Priority, EmergencyType, DestinationService)
//!   - `services/`: Pure decision logic (triage, routing, record building)
//!   - `errors/`: Domain-specific error and warning types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Call record persistence
//!   - `services/`: Outbound messaging
//!   - `configuration`: Destination directory and retry tuning
//!
//! - **Application** (`application/`): Notification dispatch and per-call orchestration
//!
//! # Usage
//!
//! ```rust,ignore
//! use sirena::{CallOrchestrator, CallInput};
//!
//! let outcome = orchestrator.handle_call(input).await?;
//! for warning in &outcome.warnings {
//!     tracing::warn!("{}", warning);
//! }
//! ```

pub mod application;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use application::{CallOrchestrator, CallOutcome, NotificationDispatcher};
pub use domain::{
    Address, CallId, CallInput, CallRecord, CallSequence, CallState, CallWarning, CallerInfo,
    CriticalSignal, DeliveryAttempt, DeliveryOutcome, DestinationService, DispatchRecordBuilder,
    DomainError, EmergencyType, LocationClass, NotificationMessage, Priority, Route, RouteKey,
    RoutingResolver, RoutingTable, TriageAnswers, TriageEvaluator,
};
pub use ports::{
    // Repositories
    CallRecordFilter,
    CallRecordRepository,
    // Configuration
    ConfigurationProvider,
    DestinationDirectory,
    DispatchConfig,
    // Services
    Messenger,
    RetryPolicy,
};
