//! API error type with HTTP status code mapping.
//!
//! [`ApiError`] is the central error type. Every variant maps to one HTTP
//! status, and every error response has the same body:
//!
//! ```json
//! { "error": "You can only submit one project per week" }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{SubmissionId, ZorBits};

/// JSON error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// | Status | Variants                                                  |
/// |--------|-----------------------------------------------------------|
/// | 400    | validation, weekly limit, balance, duplicate purchase     |
/// | 401    | missing/invalid token, bad credentials                    |
/// | 403    | not owner, not admin                                      |
/// | 404    | missing user, submission, notification, portfolio, route  |
/// | 500    | persistence and internal failures                         |
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request validation failed.
    #[error("{0}")]
    InvalidRequest(String),

    /// The user already submitted inside the current seven-day window.
    #[error("You can only submit one project per week")]
    WeeklyLimitReached,

    /// The buyer cannot afford the listing.
    #[error("Insufficient tokens")]
    InsufficientBalance {
        /// Buyer's balance at the time of the check.
        balance: ZorBits,
        /// Listing price.
        price: ZorBits,
    },

    /// The buyer already owns a copy of the project.
    #[error("You have already purchased this project")]
    AlreadyPurchased,

    /// An email address is registered twice.
    #[error("Email is already registered")]
    EmailTaken,

    /// Missing, malformed, expired or revoked bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Email/password pair did not match.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// The current password given for a password change was wrong.
    #[error("Current password is incorrect")]
    IncorrectPassword,

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Authenticated user row no longer exists.
    #[error("User not found")]
    UserNotFound,

    /// Submission with the given ID was not found.
    #[error("Submission not found")]
    SubmissionNotFound(Option<SubmissionId>),

    /// Notification not found for the caller.
    #[error("Notification not found")]
    NotificationNotFound(uuid::Uuid),

    /// No user with the requested username.
    #[error("Portfolio not found")]
    PortfolioNotFound(String),

    /// No route matched the request.
    #[error("Route not found")]
    RouteNotFound,

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::WeeklyLimitReached
            | Self::InsufficientBalance { .. }
            | Self::AlreadyPurchased
            | Self::EmailTaken => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::InvalidCredentials | Self::IncorrectPassword => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::SubmissionNotFound(_)
            | Self::NotificationNotFound(_)
            | Self::PortfolioNotFound(_)
            | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Shorthand for [`ApiError::InvalidRequest`].
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Shorthand for [`ApiError::Forbidden`].
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(ToString::to_string))
            .next()
            .unwrap_or_else(|| errors.to_string());
        Self::InvalidRequest(message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        // Server-side details stay in the log.
        let message = match &self {
            Self::Persistence(_) | Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        let mut response = axum::Json(ErrorResponse { error: message }).into_response();
        *response.status_mut() = status;
        response
    }
}
