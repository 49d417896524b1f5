//! Dispatch Routes - Messaging readiness and operator messages

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::error_response;
use crate::models::{DispatchStatusResponse, ManualMessageRequest, MessageSentResponse};
use crate::AppState;

/// Messaging endpoint and per-destination configuration
#[utoipa::path(
    get,
    path = "/sirena/dispatch/status",
    responses(
        (status = 200, description = "Dispatch status", body = DispatchStatusResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Dispatch"
)]
pub async fn dispatch_status(
    State(state): State<AppState>,
) -> Result<Json<DispatchStatusResponse>, (StatusCode, String)> {
    let status = state
        .call_service
        .dispatch_status()
        .await
        .map_err(error_response)?;

    Ok(Json(status))
}

/// Send a test message to the messaging account itself
#[utoipa::path(
    post,
    path = "/sirena/dispatch/test",
    responses(
        (status = 200, description = "Test message sent", body = MessageSentResponse),
        (status = 502, description = "Messaging endpoint rejected the message"),
        (status = 503, description = "Messaging endpoint not configured")
    ),
    tag = "Dispatch"
)]
pub async fn send_test_message(
    State(state): State<AppState>,
) -> Result<Json<MessageSentResponse>, (StatusCode, String)> {
    let sent = state
        .messaging_service
        .send_connection_test()
        .await
        .map_err(error_response)?;

    Ok(Json(sent))
}

/// Send an operator's message to any phone
#[utoipa::path(
    post,
    path = "/sirena/dispatch/manual",
    request_body = ManualMessageRequest,
    responses(
        (status = 200, description = "Message sent", body = MessageSentResponse),
        (status = 400, description = "Missing phone or message"),
        (status = 502, description = "Messaging endpoint rejected the message"),
        (status = 503, description = "Messaging endpoint not configured")
    ),
    tag = "Dispatch"
)]
pub async fn send_manual_message(
    State(state): State<AppState>,
    Json(request): Json<ManualMessageRequest>,
) -> Result<Json<MessageSentResponse>, (StatusCode, String)> {
    let sent = state
        .messaging_service
        .send_manual(&request)
        .await
        .map_err(error_response)?;

    Ok(Json(sent))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sirena/dispatch/status", get(dispatch_status))
        .route("/sirena/dispatch/test", post(send_test_message))
        .route("/sirena/dispatch/manual", post(send_manual_message))
}
