//! Messaging Endpoint Port
//!
//! Abstract interface for delivering a dispatch notification to one
//! destination address (phone number, token, ...).

use async_trait::async_trait;

use crate::domain::entities::NotificationMessage;
use crate::domain::errors::DomainError;

/// Outbound messaging interface
///
/// One call to `send` is one delivery attempt. Retries, timeouts and
/// bookkeeping belong to the dispatcher, not to implementations.
///
/// # Example
///
/// ```rust,ignore
/// use sirena::ports::Messenger;
///
/// struct SmsGateway { /* http client */ }
///
/// #[async_trait]
/// impl Messenger for SmsGateway {
///     async fn send(&self, address: &str, message: &NotificationMessage)
///         -> Result<(), DomainError>
///     {
///         // POST the rendered message, map non-2xx to Err
///     }
///
///     async fn send_text(&self, address: &str, text: &str) -> Result<(), DomainError> {
///         // POST the text as is
///     }
///
///     fn name(&self) -> &str { "sms" }
/// }
/// ```
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a message to an address
    ///
    /// `Err` carries the failure reason that ends up in the attempt's
    /// error detail. Errors that are not
    /// [`retryable`](DomainError::is_retryable) end the destination's
    /// retries.
    async fn send(&self, address: &str, message: &NotificationMessage) -> Result<(), DomainError>;

    /// Send already rendered text (operator messages, connection tests)
    async fn send_text(&self, address: &str, text: &str) -> Result<(), DomainError>;

    /// Endpoint name (e.g., "whatsapp")
    fn name(&self) -> &str;

    /// The endpoint's own sending address, if it has one
    fn own_address(&self) -> Option<&str> {
        None
    }

    /// Whether the endpoint has what it needs to send at all
    async fn health_check(&self) -> Result<bool, DomainError> {
        Ok(true)
    }
}
