//! Notification handlers.

use axum::extract::State;
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{LimitParams, MarkReadAllRequest, MessageResponse};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::Notification;
use crate::error::{ApiError, ErrorResponse};

/// `GET /notifications`: The caller's notifications.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    summary = "List notifications",
    description = "Newest first; `limit` defaults to 20 and is clamped to 1..=100.",
    security(("bearer" = [])),
    params(LimitParams),
    responses(
        (status = 200, description = "Notifications", body = Vec<Notification>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    )
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<LimitParams>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    Ok(Json(state.activity.notifications(user.id, params.limit).await?))
}

/// `PATCH /notifications/{id}/read`: Mark one notification read.
///
/// # Errors
///
/// Returns [`ApiError::NotificationNotFound`] when it is not the caller's.
#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    summary = "Mark notification read",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Notification UUID"),
    ),
    responses(
        (status = 200, description = "Updated notification", body = Notification),
        (status = 404, description = "Notification not found", body = ErrorResponse),
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Notification>, ApiError> {
    Ok(Json(state.activity.mark_read(user.id, id).await?))
}

/// `PATCH /notifications/mark-read-all`: Mark several notifications read.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] when `ids` is missing.
#[utoipa::path(
    patch,
    path = "/api/notifications/mark-read-all",
    tag = "Notifications",
    summary = "Mark notifications read",
    description = "Ids that do not belong to the caller are ignored.",
    security(("bearer" = [])),
    request_body = MarkReadAllRequest,
    responses(
        (status = 200, description = "Notifications marked read", body = MessageResponse),
        (status = 400, description = "ids array is required", body = ErrorResponse),
    )
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<MarkReadAllRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.activity.mark_all_read(user.id, req.ids()?).await?;
    Ok(Json(MessageResponse::new("Notifications marked as read")))
}

/// `DELETE /notifications/{id}`: Delete one notification.
///
/// # Errors
///
/// Returns [`ApiError::NotificationNotFound`] when it is not the caller's.
#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    tag = "Notifications",
    summary = "Delete notification",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Notification UUID"),
    ),
    responses(
        (status = 200, description = "Notification deleted", body = MessageResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse),
    )
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.activity.delete_notification(user.id, id).await?;
    Ok(Json(MessageResponse::new("Notification deleted")))
}

/// Notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/mark-read-all", patch(mark_all_read))
        .route("/notifications/{id}/read", patch(mark_read))
        .route("/notifications/{id}", delete(delete_notification))
}
