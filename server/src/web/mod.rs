use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::response::Json;
use migration::MigratorTrait;
use sea_orm::Database;
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::{self, Config};
use crate::task::memory::InMemoryTaskStore;
use crate::task::orm::DbTaskStore;
use crate::task::web::{
    ErrorResponse, MessageResponse, TaskJson, TaskPayload, TaskState, create_task_router,
};
use crate::task::TaskStore;

/// Sentinel `database_url` value selecting the in-memory store variant.
const MEMORY_STORE_URL: &str = "memory";

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::task::web::list_tasks_handler,
        crate::task::web::create_task_handler,
        crate::task::web::update_task_handler,
        crate::task::web::toggle_task_handler,
        crate::task::web::delete_task_handler,
    ),
    components(schemas(TaskJson, TaskPayload, MessageResponse, ErrorResponse)),
    tags((name = "Tasks", description = "Task management endpoints"))
)]
struct ApiDoc;

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: config::Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!(
        environment = %config.environment,
        "Task manager server running on http://{}",
        server_address
    );

    let store = create_task_store(&config).await?;
    let app = create_router(TaskState { store }).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config)),
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Builds the store the server runs against: the in-memory variant for the
/// `memory` sentinel, otherwise a SeaORM connection with migrations applied.
pub async fn create_task_store(config: &Config) -> anyhow::Result<Arc<dyn TaskStore>> {
    if config.database_url == MEMORY_STORE_URL {
        tracing::info!("Using in-memory task store");
        return Ok(Arc::new(InMemoryTaskStore::new()));
    }

    let db = Database::connect(&config.database_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");
    Ok(Arc::new(DbTaskStore::new(db)))
}

/// Assembles the full application router: task routes plus the liveness,
/// health, and OpenAPI document endpoints.
pub fn create_router(task_state: TaskState) -> Router {
    Router::new()
        .merge(create_task_router(task_state))
        .route("/", axum::routing::get(root_handler))
        .route("/health", axum::routing::get(health_check_handler))
        .route(
            "/api-docs/openapi.json",
            axum::routing::get(openapi_handler),
        )
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // tower-http rejects wildcards when credentials are allowed, so the
    // methods and headers are listed explicitly.
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Liveness payload for GET /.
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    message: &'static str,
}

/// Health payload for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[tracing::instrument]
pub async fn root_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        message: "Task Manager API is running!",
    })
}

#[tracing::instrument]
pub async fn health_check_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[tracing::instrument]
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_build_cors_layer_from_configured_origins() {
        let config: Config = serde_json::from_str(
            r#"{"cors_origins": "http://localhost:3000,https://tasks.example.com"}"#,
        )
        .unwrap();

        // HeaderValue parsing must accept every configured origin.
        let origins: Vec<HeaderValue> = config
            .cors_origins_list()
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        assert_eq!(origins.len(), 2);

        let _layer = cors_layer(&config);
    }

    #[tokio::test]
    async fn can_report_liveness_message() {
        let response = root_handler().await;
        assert_eq!(response.0.message, "Task Manager API is running!");
    }

    #[tokio::test]
    async fn can_report_health_status_and_version() {
        let response = health_check_handler().await;
        assert_eq!(response.0.status, "healthy");
        assert_eq!(response.0.version, env!("CARGO_PKG_VERSION"));
    }
}
