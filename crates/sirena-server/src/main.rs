use anyhow::Context;
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use sirena::{
    CallOrchestrator, CallRecordRepository, CallSequence, DestinationService, DispatchConfig,
    DispatchRecordBuilder, NotificationDispatcher, RoutingResolver,
};

mod adapters;
mod application;
mod auth;
mod models;
mod routes;

use adapters::{PgCallRecordRepository, SecretsConfigProvider, WhatsAppMessenger};
use application::{CallService, MessagingService};

/// Application services with concrete adapters
pub type AppCallService = CallService<PgCallRecordRepository, WhatsAppMessenger>;
pub type AppMessagingService = MessagingService<WhatsAppMessenger>;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub call_service: Arc<AppCallService>,
    pub messaging_service: Arc<AppMessagingService>,
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
}

async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Sirena API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    tracing::info!("🚨 Sirena API initializing...");

    if let Some(api_key) = secrets.get("SIRENA_API_KEY") {
        auth::init_api_key(api_key);
        tracing::info!("🔐 API key authentication enabled");
    } else {
        tracing::warn!("⚠️  No SIRENA_API_KEY set - authentication disabled");
    }

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("✅ Database migrations completed");

    let messenger = Arc::new(
        WhatsAppMessenger::new(secrets.get("WHATSAPP_TOKEN"), secrets.get("WHATSAPP_UID"))
            .context("Failed to build WhatsApp client")?,
    );
    if messenger.is_configured() {
        tracing::info!("💬 WhatsApp messaging enabled");
    } else {
        tracing::warn!("⚠️  No WHATSAPP_TOKEN/WHATSAPP_UID set - every notification will fail");
    }

    let config = DispatchConfig::from_provider(&SecretsConfigProvider::new(secrets))
        .context("Invalid dispatch configuration")?;
    for destination in DestinationService::ALL {
        if !config.directory.is_configured(destination) {
            tracing::warn!(
                "⚠️  No {} set - {} will not be notified",
                destination.config_key(),
                destination
            );
        }
    }

    let repo = Arc::new(PgCallRecordRepository::new(pool));
    let last_id = repo
        .last_id()
        .await
        .context("Failed to read last call id")?;
    let sequence = Arc::new(CallSequence::starting_after(last_id));
    tracing::info!("🔢 Call numbering continues after {:?}", last_id);

    let orchestrator = CallOrchestrator::new(
        DispatchRecordBuilder::new(RoutingResolver::default(), sequence),
        repo.clone(),
        NotificationDispatcher::new(messenger.clone(), Arc::new(config)),
    );

    let state = AppState {
        call_service: Arc::new(CallService::new(orchestrator, repo, messenger.clone())),
        messaging_service: Arc::new(MessagingService::new(messenger)),
    };

    // Protected routes (require authentication)
    let protected_routes = Router::new()
        .merge(routes::call::router())
        .merge(routes::dispatch::router())
        .layer(middleware::from_fn(auth::auth_middleware));

    let openapi = routes::swagger::ApiDoc::openapi();

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state);

    tracing::info!("📚 Swagger UI: /swagger-ui");
    tracing::info!("✅ Sirena API ready");

    Ok(router.into())
}
