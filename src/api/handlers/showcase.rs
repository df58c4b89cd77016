//! Showcase marketplace handlers: listings, purchase, purchase history.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{BuyRequest, BuyResponse, PurchaseDto, ShowcaseItemDto};
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::{ApiError, ErrorResponse};

/// `GET /showcase`: Approved projects for sale.
///
/// # Errors
///
/// Returns [`ApiError::Persistence`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/showcase",
    tag = "Showcase",
    summary = "List showcase projects",
    description = "All approved projects, newest approval first. With a valid token, `purchased` and `owned` reflect the caller.",
    responses(
        (status = 200, description = "Showcase listings", body = Vec<ShowcaseItemDto>),
    )
)]
pub async fn showcase(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
) -> Result<Json<Vec<ShowcaseItemDto>>, ApiError> {
    let items = state.marketplace.showcase(viewer.map(|v| v.id)).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// `POST /showcase/buy`: Buy a project with ZorBits.
///
/// # Errors
///
/// Returns [`ApiError::SubmissionNotFound`] for a missing or unapproved
/// project, [`ApiError::AlreadyPurchased`], [`ApiError::InsufficientBalance`]
/// and [`ApiError::InvalidRequest`] for one's own project or a wrong price.
#[utoipa::path(
    post,
    path = "/api/showcase/buy",
    tag = "Showcase",
    summary = "Buy a project",
    description = "Debits the listing price from the caller and notifies the owner, atomically.",
    security(("bearer" = [])),
    request_body = BuyRequest,
    responses(
        (status = 200, description = "Purchase successful", body = BuyResponse),
        (status = 400, description = "Insufficient tokens, already purchased, or invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse),
    )
)]
pub async fn buy(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<BuyRequest>,
) -> Result<Json<BuyResponse>, ApiError> {
    let receipt = state
        .marketplace
        .buy(user.id, req.submission_id()?, req.tokens_spent)
        .await?;
    Ok(Json(receipt.into()))
}

/// `GET /showcase/purchases/me`: The caller's purchases.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/showcase/purchases/me",
    tag = "Showcase",
    summary = "List own purchases",
    description = "Projects the caller bought, newest first.",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Purchases", body = Vec<PurchaseDto>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    )
)]
pub async fn my_purchases(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<PurchaseDto>>, ApiError> {
    let records = state.marketplace.purchases(user.id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Showcase routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/showcase", get(showcase))
        .route("/showcase/buy", post(buy))
        .route("/showcase/purchases/me", get(my_purchases))
}
