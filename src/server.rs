//! # Server Configuration
//!
//! Router, shared state and OpenAPI document for the classroom service.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::handlers::{self, classroom};
use crate::models::Actor;
use crate::services::ClassroomService;
use crate::telemetry::trace_context_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub classroom: ClassroomService,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Self {
        let actor = Actor::new(config.audit_actor.clone());
        Self {
            config: Arc::new(config),
            classroom: ClassroomService::new(db, actor),
        }
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/api/register", post(classroom::register))
        .route("/api/commonstudents", get(classroom::common_students))
        .route("/api/suspend", post(classroom::suspend))
        .route(
            "/api/retrievefornotifications",
            post(classroom::retrieve_for_notifications),
        )
        .route("/api/students", get(classroom::roster))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(trace_context_middleware)),
        )
}

/// Serves the API until Ctrl-C
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .with_context(|| format!("Invalid server address: {}", config.api_bind_addr))?;
    let profile = config.profile.clone();

    let app = create_app(AppState::new(config, db));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, %profile, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::classroom::register,
        crate::handlers::classroom::common_students,
        crate::handlers::classroom::suspend,
        crate::handlers::classroom::retrieve_for_notifications,
        crate::handlers::classroom::roster,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::handlers::HealthStatus,
            crate::handlers::classroom::RegisterRequest,
            crate::handlers::classroom::SuspendRequest,
            crate::handlers::classroom::NotificationRequest,
            crate::handlers::classroom::StudentsResponse,
            crate::handlers::classroom::RecipientsResponse,
        )
    ),
    tags(
        (name = "root", description = "Service metadata and health"),
        (name = "classroom", description = "Teacher and student registration")
    ),
    info(
        title = "Classroom API",
        description = "Registers students under teachers and resolves notification recipients",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
