//! Dashboard handler.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::DashboardResponse;
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::{ApiError, ErrorResponse};

/// `GET /dashboard/overview`: Stats, recent activity, weekly deadline.
///
/// # Errors
///
/// Returns [`ApiError::UserNotFound`] when the account is gone.
#[utoipa::path(
    get,
    path = "/api/dashboard/overview",
    tag = "Dashboard",
    summary = "Dashboard overview",
    description = "Submission counts, ZorBits earned, the five newest submissions, the weekly deadline and the three newest notifications.",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Overview", body = DashboardResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn overview(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    Ok(Json(state.activity.dashboard(user.id).await?.into()))
}

/// Dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard/overview", get(overview))
}
