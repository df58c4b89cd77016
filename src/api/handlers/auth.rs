//! Authentication handlers: register, login, logout, current user.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    LoginRequest, LoginResponse, MeResponse, MessageResponse, RegisterRequest, RegisterResponse,
};
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::{ApiError, ErrorResponse};

/// `POST /auth/register`: Create an account.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] for missing or malformed fields and
/// [`ApiError::EmailTaken`] for a registered email.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    summary = "Register a new user",
    description = "Creates an account with a zero ZorBit balance. The username is derived from the email local part.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Missing or invalid fields, or email taken", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.accounts.register(req.into_new_account()?).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse::from(&user))))
}

/// `POST /auth/login`: Exchange credentials for a bearer token.
///
/// # Errors
///
/// Returns [`ApiError::InvalidCredentials`] on a bad email/password pair.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    summary = "Log in",
    description = "Verifies the password and issues an access token.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (email, password) = req.credentials()?;
    let session = state.accounts.login(email, password).await?;
    Ok(Json(session.into()))
}

/// `POST /auth/logout`: Revoke the presented token.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] without a valid token.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    summary = "Log out",
    description = "Revokes the bearer token until it would have expired.",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    state.accounts.logout(&user.token).await?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// `GET /auth/me`: The caller's profile.
///
/// # Errors
///
/// Returns [`ApiError::UserNotFound`] when the account is gone.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    summary = "Current user",
    description = "Returns the caller's profile, balance and selected template.",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let profile = state.accounts.profile(user.id).await?;
    Ok(Json(profile.into()))
}

/// Authentication routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}
