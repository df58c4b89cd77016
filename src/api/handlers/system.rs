//! System endpoints: health check, template catalog, route fallback.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::TemplateInfo;
use crate::error::ApiError;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    version: String,
    timestamp: String,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }),
    )
}

/// `GET /config/templates`: Portfolio template catalog.
#[utoipa::path(
    get,
    path = "/config/templates",
    tag = "System",
    summary = "List portfolio templates",
    description = "Returns every layout a public portfolio can be rendered with.",
    responses(
        (status = 200, description = "Template catalog", body = Vec<TemplateInfo>),
    )
)]
pub async fn templates_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.portfolio.templates())
}

/// Fallback for unmatched routes.
pub async fn not_found_handler() -> ApiError {
    ApiError::RouteNotFound
}

/// System routes mounted at the root level (not under /api).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/templates", get(templates_handler))
}
