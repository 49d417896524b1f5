//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use crate::models::{
    // Call models
    AddressDto,
    CallResponse,
    CallerDto,
    CreateCallRequest,
    DeliveryAttemptResponse,
    // Dispatch models
    DestinationStatus,
    DispatchStatusResponse,
    HandleCallResponse,
    ManualMessageRequest,
    MessageSentResponse,
    TriageRequest,
    WarningResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Call endpoints
        super::call::create_call,
        super::call::get_call,
        super::call::list_calls,
        // Dispatch endpoints
        super::dispatch::dispatch_status,
        super::dispatch::send_test_message,
        super::dispatch::send_manual_message,
    ),
    info(
        title = "Sirena API",
        version = "0.1.0",
        description = "Emergency call triage classification and dispatch routing",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Call", description = "Call - Intake, triage, routing and notification"),
        (name = "Dispatch", description = "Dispatch - Messaging endpoint status and operator messages"),
    ),
    components(
        schemas(
            // Call
            TriageRequest,
            CallerDto,
            AddressDto,
            CreateCallRequest,
            DeliveryAttemptResponse,
            CallResponse,
            WarningResponse,
            HandleCallResponse,
            // Dispatch
            DestinationStatus,
            DispatchStatusResponse,
            ManualMessageRequest,
            MessageSentResponse,
        )
    ),
)]
pub struct ApiDoc;
