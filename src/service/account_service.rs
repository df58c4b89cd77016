//! Account service: registration, login, token revocation, settings.

use std::sync::Arc;

use chrono::Utc;

use crate::auth::{
    IssuedToken, JwtManager, MIN_PASSWORD_LEN, VerifiedToken, hash_password, verify_password,
};
use crate::domain::user::username_from_email;
use crate::domain::{User, UserId, UserUpdate};
use crate::error::ApiError;
use crate::persistence::Store;

/// Registration and credential policy.
#[derive(Debug, Clone)]
pub struct AccountSettings {
    /// bcrypt work factor for new hashes.
    pub bcrypt_cost: u32,
    /// Lowercased emails that register as administrators.
    pub admin_emails: Vec<String>,
}

/// Input for [`AccountService::register`].
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Display name.
    pub name: String,
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct Session {
    /// Freshly issued access token.
    pub token: IssuedToken,
    /// The logged-in user.
    pub user: User,
}

/// Owns everything about who a caller is and what their account holds.
#[derive(Debug, Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    jwt: JwtManager,
    settings: AccountSettings,
}

impl AccountService {
    /// Creates a new `AccountService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, jwt: JwtManager, settings: AccountSettings) -> Self {
        Self {
            store,
            jwt,
            settings,
        }
    }

    /// Registers a new account.
    ///
    /// The email is stored lowercased; the username is its local part,
    /// suffixed with a number when already taken.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EmailTaken`] for a registered email and
    /// [`ApiError::InvalidRequest`] for a short password.
    pub async fn register(&self, account: NewAccount) -> Result<User, ApiError> {
        let email = account.email.trim().to_lowercase();
        if account.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::invalid(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.store.user_by_email(&email).await?.is_some() {
            return Err(ApiError::EmailTaken);
        }

        let username = self.available_username(&username_from_email(&email)).await?;
        let password_hash = hash_password(&account.password, self.settings.bcrypt_cost).await?;
        let is_admin = self.settings.admin_emails.contains(&email);

        let user = User::register(
            email,
            password_hash,
            account.name.trim().to_string(),
            username,
            is_admin,
            Utc::now(),
        );
        self.store.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, username = %user.username, is_admin, "user registered");
        Ok(user)
    }

    async fn available_username(&self, base: &str) -> Result<String, ApiError> {
        let mut candidate = base.to_string();
        let mut suffix: u32 = 1;
        while self.store.user_by_username(&candidate).await?.is_some() {
            suffix = suffix.saturating_add(1);
            candidate = format!("{base}{suffix}");
        }
        Ok(candidate)
    }

    /// Checks credentials and issues an access token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidCredentials`] for an unknown email or a
    /// wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.store.user_by_email(&email).await? else {
            tracing::debug!("login for unknown email");
            return Err(ApiError::InvalidCredentials);
        };
        if !verify_password(password, &user.password_hash).await? {
            tracing::warn!(user_id = %user.id, "login with wrong password");
            return Err(ApiError::InvalidCredentials);
        }

        let token = self.jwt.issue(user.id, &user.email)?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(Session { token, user })
    }

    /// Verifies a bearer token and rejects revoked ones.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for invalid, expired or revoked
    /// tokens.
    pub async fn authenticate(&self, raw_token: &str) -> Result<VerifiedToken, ApiError> {
        let token = self.jwt.verify(raw_token)?;
        if self.store.is_token_revoked(token.jti).await? {
            tracing::debug!(user_id = %token.user_id, "revoked token presented");
            return Err(ApiError::Unauthorized);
        }
        Ok(token)
    }

    /// Loads the caller and requires the administrator flag.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the user row is gone and
    /// [`ApiError::Forbidden`] for non-admins.
    pub async fn require_admin(&self, user_id: UserId) -> Result<User, ApiError> {
        let user = self
            .store
            .user_by_id(user_id)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        if !user.is_admin {
            tracing::warn!(%user_id, "non-admin hit an admin endpoint");
            return Err(ApiError::forbidden("Forbidden: Admin access required"));
        }
        Ok(user)
    }

    /// Revokes the presented token until it expires.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    pub async fn logout(&self, token: &VerifiedToken) -> Result<(), ApiError> {
        self.store.revoke_token(token.jti, token.expires_at).await?;
        tracing::info!(user_id = %token.user_id, "user logged out");
        Ok(())
    }

    /// Loads the caller's profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UserNotFound`] when the user row is gone.
    pub async fn profile(&self, user_id: UserId) -> Result<User, ApiError> {
        self.store
            .user_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }

    /// Applies a settings change.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an empty update and
    /// [`ApiError::UserNotFound`] when the user row is gone.
    pub async fn update(&self, user_id: UserId, update: UserUpdate) -> Result<User, ApiError> {
        if update.is_empty() {
            return Err(ApiError::invalid("No fields to update"));
        }
        let user = self
            .store
            .update_user(user_id, &update)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        tracing::info!(%user_id, "account settings updated");
        Ok(user)
    }

    /// Replaces the password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for a short new password and
    /// [`ApiError::IncorrectPassword`] when the current one does not match.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<(), ApiError> {
        if new.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::invalid(format!(
                "New password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let user = self.profile(user_id).await?;
        if !verify_password(current, &user.password_hash).await? {
            return Err(ApiError::IncorrectPassword);
        }
        let password_hash = hash_password(new, self.settings.bcrypt_cost).await?;
        self.update(
            user_id,
            UserUpdate {
                password_hash: Some(password_hash),
                ..UserUpdate::default()
            },
        )
        .await?;
        tracing::info!(%user_id, "password changed");
        Ok(())
    }

    /// Deletes the account with everything it owns and revokes the token
    /// used for the request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UserNotFound`] when the user row is already gone.
    pub async fn delete_account(&self, token: &VerifiedToken) -> Result<(), ApiError> {
        if !self.store.delete_user(token.user_id).await? {
            return Err(ApiError::UserNotFound);
        }
        self.store.revoke_token(token.jti, token.expires_at).await?;
        tracing::info!(user_id = %token.user_id, "account deleted");
        Ok(())
    }

    /// Drops revocation entries for tokens that have expired.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    pub async fn sweep_revocations(&self) -> Result<u64, ApiError> {
        let purged = self.store.purge_revoked_tokens(Utc::now()).await?;
        if purged > 0 {
            tracing::debug!(purged, "expired token revocations purged");
        }
        Ok(purged)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::service::fixtures;

    #[tokio::test]
    async fn register_assigns_unique_usernames() {
        let accounts = fixtures::accounts(fixtures::store());
        let first = fixtures::register(&accounts, "ada@example.com").await;
        let second = fixtures::register(&accounts, "ada@example.org").await;
        assert_eq!(first.username, "ada");
        assert_eq!(second.username, "ada2");
        assert!(!first.is_admin);
    }

    #[tokio::test]
    async fn admin_emails_register_as_admins() {
        let accounts = fixtures::accounts(fixtures::store());
        let admin = fixtures::register(&accounts, fixtures::ADMIN_EMAIL).await;
        assert!(admin.is_admin);
        assert!(accounts.require_admin(admin.id).await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let accounts = fixtures::accounts(fixtures::store());
        fixtures::register(&accounts, "ada@example.com").await;
        let result = accounts
            .register(NewAccount {
                email: "ADA@example.com".into(),
                password: "secret1".into(),
                name: "Ada".into(),
            })
            .await;
        assert!(matches!(result, Err(ApiError::EmailTaken)));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let accounts = fixtures::accounts(fixtures::store());
        fixtures::register(&accounts, "ada@example.com").await;
        assert!(matches!(
            accounts.login("ada@example.com", "nope-nope").await,
            Err(ApiError::InvalidCredentials)
        ));
        assert!(matches!(
            accounts.login("ghost@example.com", fixtures::PASSWORD).await,
            Err(ApiError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn logout_revokes_the_token() {
        let accounts = fixtures::accounts(fixtures::store());
        fixtures::register(&accounts, "ada@example.com").await;
        let Ok(session) = accounts.login("ada@example.com", fixtures::PASSWORD).await else {
            panic!("login failed");
        };
        let Ok(token) = accounts.authenticate(&session.token.token).await else {
            panic!("fresh token rejected");
        };
        assert!(accounts.logout(&token).await.is_ok());
        assert!(matches!(
            accounts.authenticate(&session.token.token).await,
            Err(ApiError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn non_admin_is_forbidden() {
        let accounts = fixtures::accounts(fixtures::store());
        let user = fixtures::register(&accounts, "ada@example.com").await;
        assert!(matches!(
            accounts.require_admin(user.id).await,
            Err(ApiError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn change_password_checks_current() {
        let accounts = fixtures::accounts(fixtures::store());
        let user = fixtures::register(&accounts, "ada@example.com").await;
        assert!(matches!(
            accounts.change_password(user.id, "wrong-one", "brand-new").await,
            Err(ApiError::IncorrectPassword)
        ));
        assert!(matches!(
            accounts.change_password(user.id, fixtures::PASSWORD, "short").await,
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(
            accounts
                .change_password(user.id, fixtures::PASSWORD, "brand-new")
                .await
                .is_ok()
        );
        assert!(accounts.login("ada@example.com", "brand-new").await.is_ok());
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let accounts = fixtures::accounts(fixtures::store());
        let user = fixtures::register(&accounts, "ada@example.com").await;
        assert!(matches!(
            accounts.update(user.id, UserUpdate::default()).await,
            Err(ApiError::InvalidRequest(msg)) if msg == "No fields to update"
        ));
    }
}
