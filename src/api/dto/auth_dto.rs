//! Registration, login and profile DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::present;
use crate::domain::{PortfolioTemplate, User, ZorBits};
use crate::error::ApiError;
use crate::service::{NewAccount, Session};

/// Request body for `POST /api/auth/register`.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Login email.
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// Password, at least six characters.
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    /// Display name.
    #[serde(default)]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

impl RegisterRequest {
    /// Checks presence and format of every field.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for missing or malformed fields.
    pub fn into_new_account(self) -> Result<NewAccount, ApiError> {
        let (Some(email), Some(password), Some(name)) = (
            present(self.email.as_deref()),
            self.password.as_deref().filter(|p| !p.is_empty()),
            present(self.name.as_deref()),
        ) else {
            return Err(ApiError::invalid("Email, password, and name are required"));
        };
        self.validate()?;
        Ok(NewAccount {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        })
    }
}

/// Identity of a newly registered user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisteredUser {
    /// User id.
    pub id: Uuid,
    /// Stored (lowercased) email.
    pub email: String,
}

/// Response body for `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterResponse {
    /// Confirmation.
    pub message: String,
    /// The new account.
    pub user: RegisteredUser,
}

impl From<&User> for RegisterResponse {
    fn from(user: &User) -> Self {
        Self {
            message: "User registered successfully".to_string(),
            user: RegisteredUser {
                id: user.id.into(),
                email: user.email.clone(),
            },
        }
    }
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login email.
    #[serde(default)]
    pub email: Option<String>,
    /// Password.
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns `(email, password)` when both are present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when either is missing.
    pub fn credentials(&self) -> Result<(&str, &str), ApiError> {
        match (
            present(self.email.as_deref()),
            self.password.as_deref().filter(|p| !p.is_empty()),
        ) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(ApiError::invalid("Email and password are required")),
        }
    }
}

/// Access token section of a login response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionDto {
    /// Bearer token.
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
    /// Always `Bearer`.
    pub token_type: String,
}

/// User section of a login response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginUser {
    /// User id.
    pub id: Uuid,
    /// Email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Public username.
    pub username: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// Current balance.
    #[schema(value_type = f64)]
    pub token_balance: ZorBits,
}

/// Response body for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Token details.
    pub session: SessionDto,
    /// The logged-in user.
    pub user: LoginUser,
}

impl From<Session> for LoginResponse {
    fn from(session: Session) -> Self {
        let user = session.user;
        Self {
            session: SessionDto {
                access_token: session.token.token,
                expires_in: session.token.expires_in,
                token_type: "Bearer".to_string(),
            },
            user: LoginUser {
                id: user.id.into(),
                email: user.email,
                name: user.name,
                username: user.username,
                avatar_url: user.avatar_url,
                token_balance: user.token_balance,
            },
        }
    }
}

/// Response body for `GET /api/auth/me`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MeResponse {
    /// User id.
    pub id: Uuid,
    /// Email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Public username.
    pub username: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// GitHub account.
    pub github_username: Option<String>,
    /// Current balance.
    #[schema(value_type = f64)]
    pub token_balance: ZorBits,
    /// Portfolio template.
    pub selected_template: PortfolioTemplate,
    /// Administrator flag.
    pub is_admin: bool,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl From<User> for MeResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.into(),
            email: user.email,
            name: user.name,
            username: user.username,
            avatar_url: user.avatar_url,
            github_username: user.github_username,
            token_balance: user.token_balance,
            selected_template: user.selected_template,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str, name: &str) -> RegisterRequest {
        RegisterRequest {
            email: Some(email.into()),
            password: Some(password.into()),
            name: Some(name.into()),
        }
    }

    #[test]
    fn missing_fields_share_one_message() {
        let result = RegisterRequest::default().into_new_account();
        assert!(matches!(
            result,
            Err(ApiError::InvalidRequest(msg)) if msg == "Email, password, and name are required"
        ));
    }

    #[test]
    fn malformed_fields_are_rejected() {
        assert!(matches!(
            register("not-an-email", "secret1", "Ada").into_new_account(),
            Err(ApiError::InvalidRequest(msg)) if msg == "Invalid email address"
        ));
        assert!(matches!(
            register("ada@example.com", "short", "Ada").into_new_account(),
            Err(ApiError::InvalidRequest(msg)) if msg == "Password must be at least 6 characters"
        ));
        assert!(register("ada@example.com", "secret1", "Ada").into_new_account().is_ok());
    }

    #[test]
    fn login_requires_both_fields() {
        let req = LoginRequest {
            email: Some("ada@example.com".into()),
            password: None,
        };
        assert!(req.credentials().is_err());
    }
}
