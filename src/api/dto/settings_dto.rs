//! Account settings DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::present;
use crate::domain::{User, UserUpdate};
use crate::error::ApiError;

/// Response body for `GET /api/settings`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SettingsResponse {
    /// User id.
    pub id: Uuid,
    /// Public username.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// GitHub account.
    pub github_username: Option<String>,
    /// Email notifications enabled.
    pub email_notifications: bool,
    /// Project notifications enabled.
    pub project_notifications: bool,
}

impl From<User> for SettingsResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.into(),
            username: user.username,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            github_username: user.github_username,
            email_notifications: user.email_notifications,
            project_notifications: user.project_notifications,
        }
    }
}

/// Request body for `PATCH /api/settings/profile`.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ProfileUpdateRequest {
    /// New display name.
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: Option<String>,
    /// New GitHub account.
    #[serde(default)]
    #[validate(length(max = 39, message = "GitHub username is too long"))]
    pub github_username: Option<String>,
    /// New avatar URL.
    #[serde(default)]
    #[validate(url(message = "avatar_url must be a valid URL"))]
    pub avatar_url: Option<String>,
}

impl ProfileUpdateRequest {
    /// Validates the fields and converts them into a [`UserUpdate`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for malformed fields.
    pub fn into_update(self) -> Result<UserUpdate, ApiError> {
        self.validate()?;
        Ok(UserUpdate {
            name: self.name,
            github_username: self.github_username,
            avatar_url: self.avatar_url,
            ..UserUpdate::default()
        })
    }
}

/// Profile section of a profile update response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileDto {
    /// Display name.
    pub name: String,
    /// GitHub account.
    pub github_username: Option<String>,
    /// Avatar URL.
    pub avatar_url: Option<String>,
}

/// Response body for `PATCH /api/settings/profile`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileUpdateResponse {
    /// Confirmation.
    pub message: String,
    /// Updated profile.
    pub user: ProfileDto,
}

impl From<User> for ProfileUpdateResponse {
    fn from(user: User) -> Self {
        Self {
            message: "Profile updated successfully".to_string(),
            user: ProfileDto {
                name: user.name,
                github_username: user.github_username,
                avatar_url: user.avatar_url,
            },
        }
    }
}

/// Request body for `PATCH /api/settings/password`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PasswordChangeRequest {
    /// Password in use.
    #[serde(default)]
    pub current_password: Option<String>,
    /// Replacement, at least six characters.
    #[serde(default)]
    pub new_password: Option<String>,
}

impl PasswordChangeRequest {
    /// Returns `(current, new)` when both are present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when either is missing.
    pub fn passwords(&self) -> Result<(&str, &str), ApiError> {
        match (
            self.current_password.as_deref().filter(|p| !p.is_empty()),
            self.new_password.as_deref().filter(|p| !p.is_empty()),
        ) {
            (Some(current), Some(new)) => Ok((current, new)),
            _ => Err(ApiError::invalid("Current and new password are required")),
        }
    }
}

/// Request body for `PATCH /api/settings/avatar`.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AvatarRequest {
    /// New avatar URL.
    #[serde(default)]
    #[validate(url(message = "avatar_url must be a valid URL"))]
    pub avatar_url: Option<String>,
}

impl AvatarRequest {
    /// The new avatar URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when missing or malformed.
    pub fn url(&self) -> Result<&str, ApiError> {
        let url = present(self.avatar_url.as_deref())
            .ok_or_else(|| ApiError::invalid("avatar_url is required"))?;
        self.validate()?;
        Ok(url)
    }
}

/// Response body for `PATCH /api/settings/avatar`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvatarResponse {
    /// Confirmation.
    pub message: String,
    /// Stored avatar URL.
    pub avatar_url: Option<String>,
}

/// Notification preference flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NotificationPreferences {
    /// Email notifications enabled.
    #[serde(default)]
    pub email_notifications: Option<bool>,
    /// Project notifications enabled.
    #[serde(default)]
    pub project_notifications: Option<bool>,
}

impl NotificationPreferences {
    /// Converts the flags into a [`UserUpdate`].
    #[must_use]
    pub fn to_update(&self) -> UserUpdate {
        UserUpdate {
            email_notifications: self.email_notifications,
            project_notifications: self.project_notifications,
            ..UserUpdate::default()
        }
    }
}

/// Response body for `PATCH /api/settings/notifications`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PreferencesResponse {
    /// Confirmation.
    pub message: String,
    /// Stored flags.
    pub preferences: NotificationPreferences,
}

impl From<User> for PreferencesResponse {
    fn from(user: User) -> Self {
        Self {
            message: "Notification preferences updated".to_string(),
            preferences: NotificationPreferences {
                email_notifications: Some(user.email_notifications),
                project_notifications: Some(user.project_notifications),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_profile_update_is_empty() {
        assert!(
            ProfileUpdateRequest::default()
                .into_update()
                .is_ok_and(|u| u.is_empty())
        );
    }

    #[test]
    fn avatar_must_be_a_url() {
        let req = AvatarRequest {
            avatar_url: Some("not a url".into()),
        };
        assert!(req.url().is_err());
        let req = AvatarRequest {
            avatar_url: Some("https://cdn.example.com/a.png".into()),
        };
        assert_eq!(req.url().ok(), Some("https://cdn.example.com/a.png"));
        assert!(AvatarRequest::default().url().is_err());
    }
}
