use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;

use crate::db::{check_connection, DbPool};

/// State the health handlers need access to.
pub trait HealthHandlerState: Clone + Send + Sync + 'static {
    fn db_pool(&self) -> &Arc<DbPool>;
}

pub fn health_router<S>() -> Router<S>
where
    S: HealthHandlerState,
{
    Router::new()
        .route("/health", get(health::<S>))
        .route("/health/ready", get(readiness::<S>))
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "health"
)]
pub async fn health<S>(State(_state): State<S>) -> impl IntoResponse
where
    S: HealthHandlerState,
{
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Readiness probe; verifies the database is reachable
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Database unreachable")
    ),
    tag = "health"
)]
pub async fn readiness<S>(State(state): State<S>) -> impl IntoResponse
where
    S: HealthHandlerState,
{
    match check_connection(state.db_pool()).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable", "error": err.response_message() })),
        ),
    }
}
