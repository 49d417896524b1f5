//! Sirena API Routes
//!
//! - /sirena/calls - Call intake and history
//! - /sirena/dispatch/status - Messaging endpoint and destination status
//! - /sirena/dispatch/{test,manual} - Operator-initiated messages

pub mod call;
pub mod dispatch;
pub mod swagger;

use axum::http::StatusCode;

use sirena::DomainError;

/// Map an engine error onto an HTTP status
pub(crate) fn error_response(e: DomainError) -> (StatusCode, String) {
    let status = match &e {
        DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::ExternalService(_) => StatusCode::BAD_GATEWAY,
        DomainError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => {
            tracing::error!("Request failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}
