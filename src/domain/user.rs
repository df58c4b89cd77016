//! Registered users and profile updates.

use chrono::{DateTime, Utc};

use super::{PortfolioTemplate, UserId, ZorBits};

/// A registered account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Account identifier.
    pub id: UserId,
    /// Login email, unique.
    pub email: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Public handle used in portfolio URLs, unique.
    pub username: String,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// GitHub account name.
    pub github_username: Option<String>,
    /// Spendable ZorBits.
    pub token_balance: ZorBits,
    /// Portfolio layout chosen by the user.
    pub selected_template: PortfolioTemplate,
    /// Whether the account may review submissions.
    pub is_admin: bool,
    /// Email notification preference.
    pub email_notifications: bool,
    /// Project activity notification preference.
    pub project_notifications: bool,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a freshly registered user with default settings.
    #[must_use]
    pub fn register(
        email: String,
        password_hash: String,
        name: String,
        username: String,
        is_admin: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email,
            password_hash,
            name,
            username,
            avatar_url: None,
            github_username: None,
            token_balance: ZorBits::ZERO,
            selected_template: PortfolioTemplate::default(),
            is_admin,
            email_notifications: true,
            project_notifications: true,
            created_at: now,
        }
    }

    /// Name shown for the user's projects: display name, then username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

/// Partial update of a user's mutable fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New GitHub account name.
    pub github_username: Option<String>,
    /// New avatar URL.
    pub avatar_url: Option<String>,
    /// New portfolio template.
    pub selected_template: Option<PortfolioTemplate>,
    /// New email notification preference.
    pub email_notifications: Option<bool>,
    /// New project notification preference.
    pub project_notifications: Option<bool>,
    /// New bcrypt password hash.
    pub password_hash: Option<String>,
}

impl UserUpdate {
    /// Returns `true` when the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the update in place.
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name.clone_from(name);
        }
        if let Some(github) = &self.github_username {
            user.github_username = Some(github.clone());
        }
        if let Some(avatar) = &self.avatar_url {
            user.avatar_url = Some(avatar.clone());
        }
        if let Some(template) = self.selected_template {
            user.selected_template = template;
        }
        if let Some(flag) = self.email_notifications {
            user.email_notifications = flag;
        }
        if let Some(flag) = self.project_notifications {
            user.project_notifications = flag;
        }
        if let Some(hash) = &self.password_hash {
            user.password_hash.clone_from(hash);
        }
    }
}

/// Derives a username from the local part of an email address.
#[must_use]
pub fn username_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User::register(
            "ada@example.com".into(),
            "hash".into(),
            "Ada".into(),
            "ada".into(),
            false,
            Utc::now(),
        )
    }

    #[test]
    fn registration_defaults() {
        let user = sample();
        assert_eq!(user.token_balance, ZorBits::ZERO);
        assert_eq!(user.selected_template, PortfolioTemplate::Minimal);
        assert!(user.email_notifications && user.project_notifications);
    }

    #[test]
    fn update_applies_only_given_fields() {
        let mut user = sample();
        let update = UserUpdate {
            github_username: Some("ada-l".into()),
            project_notifications: Some(false),
            ..UserUpdate::default()
        };
        assert!(!update.is_empty());
        update.apply(&mut user);
        assert_eq!(user.name, "Ada");
        assert_eq!(user.github_username.as_deref(), Some("ada-l"));
        assert!(!user.project_notifications);
        assert!(user.email_notifications);
    }

    #[test]
    fn username_is_email_local_part() {
        assert_eq!(username_from_email("Grace.Hopper@navy.mil"), "grace.hopper");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let mut user = sample();
        user.name = " ".into();
        assert_eq!(user.display_name(), "ada");
    }
}
