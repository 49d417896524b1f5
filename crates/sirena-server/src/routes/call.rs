//! Call Routes - Intake and history

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use sirena::CallId;

use super::error_response;
use crate::models::{CallResponse, CreateCallRequest, HandleCallResponse, ListCallsQuery};
use crate::AppState;

/// Handle a new emergency call
///
/// Classifies, routes, persists and notifies. Notification problems do
/// not fail the request; they come back as warnings.
#[utoipa::path(
    post,
    path = "/sirena/calls",
    request_body = CreateCallRequest,
    responses(
        (status = 201, description = "Call recorded and dispatched", body = HandleCallResponse),
        (status = 400, description = "Invalid call input"),
        (status = 500, description = "Call could not be recorded")
    ),
    tag = "Call"
)]
pub async fn create_call(
    State(state): State<AppState>,
    Json(payload): Json<CreateCallRequest>,
) -> Result<(StatusCode, Json<HandleCallResponse>), (StatusCode, String)> {
    let input = payload.into_input().map_err(error_response)?;

    let outcome = state
        .call_service
        .handle_call(input)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Get a call by ID, with its delivery attempts
#[utoipa::path(
    get,
    path = "/sirena/calls/{id}",
    params(("id" = i64, Path, description = "Call ID")),
    responses(
        (status = 200, description = "Call found", body = CallResponse),
        (status = 404, description = "Call not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Call"
)]
pub async fn get_call(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CallResponse>, (StatusCode, String)> {
    let record = state
        .call_service
        .get_call(CallId(id))
        .await
        .map_err(error_response)?;

    Ok(Json(record.into()))
}

/// List recent calls, newest first
#[utoipa::path(
    get,
    path = "/sirena/calls",
    params(ListCallsQuery),
    responses(
        (status = 200, description = "Recent calls", body = Vec<CallResponse>),
        (status = 400, description = "Invalid filter"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Call"
)]
pub async fn list_calls(
    State(state): State<AppState>,
    Query(query): Query<ListCallsQuery>,
) -> Result<Json<Vec<CallResponse>>, (StatusCode, String)> {
    let filter = query.into_filter().map_err(error_response)?;

    let records = state
        .call_service
        .list_calls(&filter)
        .await
        .map_err(error_response)?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sirena/calls", get(list_calls).post(create_call))
        .route("/sirena/calls/:id", get(get_call))
}
