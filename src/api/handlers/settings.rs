//! Account settings handlers.

use axum::extract::State;
use axum::routing::{delete, get, patch};
use axum::{Json, Router};

use crate::api::dto::{
    AvatarRequest, AvatarResponse, MessageResponse, NotificationPreferences,
    PasswordChangeRequest, PreferencesResponse, ProfileUpdateRequest, ProfileUpdateResponse,
    SettingsResponse,
};
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::UserUpdate;
use crate::error::{ApiError, ErrorResponse};

/// `GET /settings`: Profile and notification preferences.
///
/// # Errors
///
/// Returns [`ApiError::UserNotFound`] when the account is gone.
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    summary = "Get settings",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Settings", body = SettingsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_settings(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<SettingsResponse>, ApiError> {
    Ok(Json(state.accounts.profile(user.id).await?.into()))
}

/// `PATCH /settings/profile`: Update name, GitHub account, avatar.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] when nothing changes or a field is
/// malformed.
#[utoipa::path(
    patch,
    path = "/api/settings/profile",
    tag = "Settings",
    summary = "Update profile",
    security(("bearer" = [])),
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileUpdateResponse),
        (status = 400, description = "No fields to update", body = ErrorResponse),
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<ProfileUpdateRequest>,
) -> Result<Json<ProfileUpdateResponse>, ApiError> {
    let updated = state.accounts.update(user.id, req.into_update()?).await?;
    Ok(Json(updated.into()))
}

/// `PATCH /settings/password`: Change the password.
///
/// # Errors
///
/// Returns [`ApiError::IncorrectPassword`] when the current password is
/// wrong and [`ApiError::InvalidRequest`] for a short replacement.
#[utoipa::path(
    patch,
    path = "/api/settings/password",
    tag = "Settings",
    summary = "Change password",
    security(("bearer" = [])),
    request_body = PasswordChangeRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Missing or short password", body = ErrorResponse),
        (status = 401, description = "Current password is incorrect", body = ErrorResponse),
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<PasswordChangeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (current, new) = req.passwords()?;
    state.accounts.change_password(user.id, current, new).await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// `PATCH /settings/avatar`: Replace the avatar URL.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] for a missing or malformed URL.
#[utoipa::path(
    patch,
    path = "/api/settings/avatar",
    tag = "Settings",
    summary = "Update avatar",
    security(("bearer" = [])),
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar updated", body = AvatarResponse),
        (status = 400, description = "avatar_url is required", body = ErrorResponse),
    )
)]
pub async fn update_avatar(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<AvatarRequest>,
) -> Result<Json<AvatarResponse>, ApiError> {
    let update = UserUpdate {
        avatar_url: Some(req.url()?.to_string()),
        ..UserUpdate::default()
    };
    let updated = state.accounts.update(user.id, update).await?;
    Ok(Json(AvatarResponse {
        message: "Avatar updated successfully".to_string(),
        avatar_url: updated.avatar_url,
    }))
}

/// `PATCH /settings/notifications`: Notification preferences.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] when neither flag is given.
#[utoipa::path(
    patch,
    path = "/api/settings/notifications",
    tag = "Settings",
    summary = "Update notification preferences",
    security(("bearer" = [])),
    request_body = NotificationPreferences,
    responses(
        (status = 200, description = "Preferences updated", body = PreferencesResponse),
        (status = 400, description = "No fields to update", body = ErrorResponse),
    )
)]
pub async fn update_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<NotificationPreferences>,
) -> Result<Json<PreferencesResponse>, ApiError> {
    let updated = state.accounts.update(user.id, req.to_update()).await?;
    Ok(Json(updated.into()))
}

/// `DELETE /settings/account`: Delete the account and everything it owns.
///
/// # Errors
///
/// Returns [`ApiError::UserNotFound`] when the account is already gone.
#[utoipa::path(
    delete,
    path = "/api/settings/account",
    tag = "Settings",
    summary = "Delete account",
    description = "Removes the user with their submissions, purchases, history and notifications, and revokes the token.",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    )
)]
pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    state.accounts.delete_account(&user.token).await?;
    Ok(Json(MessageResponse::new("Account deleted successfully")))
}

/// Settings routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(get_settings))
        .route("/settings/profile", patch(update_profile))
        .route("/settings/password", patch(change_password))
        .route("/settings/avatar", patch(update_avatar))
        .route("/settings/notifications", patch(update_notifications))
        .route("/settings/account", delete(delete_account))
}
