//! ZorBit balance and history handlers.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{BalanceResponse, HistoryEntryDto, LimitParams};
use crate::api::extract::ApiQuery;
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::{ApiError, ErrorResponse};

/// `GET /tokens/balance`: Current ZorBit balance.
///
/// # Errors
///
/// Returns [`ApiError::UserNotFound`] when the account is gone.
#[utoipa::path(
    get,
    path = "/api/tokens/balance",
    tag = "Tokens",
    summary = "Get balance",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Balance", body = BalanceResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    )
)]
pub async fn balance(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BalanceResponse>, ApiError> {
    Ok(Json(state.activity.balance(user.id).await?.into()))
}

/// `GET /tokens/history`: Balance changes.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/tokens/history",
    tag = "Tokens",
    summary = "Balance history",
    description = "Newest first with a readable description; `limit` defaults to 50 and is clamped to 1..=200.",
    security(("bearer" = [])),
    params(LimitParams),
    responses(
        (status = 200, description = "History", body = Vec<HistoryEntryDto>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    )
)]
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<LimitParams>,
) -> Result<Json<Vec<HistoryEntryDto>>, ApiError> {
    let entries = state.activity.history(user.id, params.limit).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Token routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tokens/balance", get(balance))
        .route("/tokens/history", get(history))
}
