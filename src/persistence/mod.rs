//! Persistence layer: the [`Store`] trait and its implementations.
//!
//! Services depend on `Arc<dyn Store>` only. [`PostgresStore`] is the
//! production backend (`sqlx::PgPool`, migrations in `migrations/`);
//! [`MemoryStore`] keeps every table in process memory for tests and
//! local development.
//!
//! Operations that move ZorBits ([`Store::purchase`], [`Store::apply_review`])
//! and the weekly-limited [`Store::insert_submission`] are atomic: each
//! runs in one transaction (or under one write lock) together with the
//! history and notification rows it produces.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Listing, Notification, PortfolioVisibility, PurchaseOrder, PurchaseReceipt, PurchaseRecord,
    Review, Submission, SubmissionId, SubmissionStatus, TokenHistoryEntry, User, UserId,
    UserUpdate, ZorBits,
};
use crate::error::ApiError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Durable storage for every Zorvexra table.
#[async_trait]
pub trait Store: Send + Sync + fmt::Debug {
    // Users

    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EmailTaken`] for a duplicate email and
    /// [`ApiError::InvalidRequest`] for a duplicate username.
    async fn insert_user(&self, user: &User) -> Result<(), ApiError>;

    /// Looks up a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, ApiError>;

    /// Looks up a user by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    /// Looks up a user by username.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;

    /// Applies a partial update and returns the updated user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn update_user(&self, id: UserId, update: &UserUpdate)
    -> Result<Option<User>, ApiError>;

    /// Deletes a user and everything they own. Returns whether a row existed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn delete_user(&self, id: UserId) -> Result<bool, ApiError>;

    // Submissions

    /// Inserts a submission unless its owner already submitted at or after
    /// `window_start`. Check and insert are atomic per user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::WeeklyLimitReached`] when the window is used and
    /// [`ApiError::UserNotFound`] when the owner does not exist.
    async fn insert_submission(
        &self,
        submission: &Submission,
        window_start: DateTime<Utc>,
    ) -> Result<(), ApiError>;

    /// Looks up a submission by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn submission(&self, id: SubmissionId) -> Result<Option<Submission>, ApiError>;

    /// A user's submissions, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn submissions_by_user(&self, user_id: UserId) -> Result<Vec<Submission>, ApiError>;

    /// All submissions with their owners, newest submission first,
    /// optionally restricted to one status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn submissions_with_owner(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<Listing>, ApiError>;

    /// Approved submissions with their owners, most recently approved first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn approved_listings(&self) -> Result<Vec<Listing>, ApiError>;

    /// Applies a review: status change, owner credit with its history row
    /// when the award is positive, and the owner's notification.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::SubmissionNotFound`] for an unknown submission
    /// and [`ApiError::InvalidRequest`] when approving an already approved
    /// submission.
    async fn apply_review(&self, review: &Review) -> Result<Submission, ApiError>;

    // Portfolio

    /// A user's visibility overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn visibility_overrides(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PortfolioVisibility>, ApiError>;

    /// Creates or replaces a visibility override.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn upsert_visibility(
        &self,
        visibility: &PortfolioVisibility,
    ) -> Result<PortfolioVisibility, ApiError>;

    // Marketplace

    /// Executes a purchase: duplicate and balance checks, purchase row,
    /// buyer debit, history row, owner notification.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AlreadyPurchased`], [`ApiError::InsufficientBalance`]
    /// or [`ApiError::UserNotFound`]; nothing is written in those cases.
    async fn purchase(&self, order: &PurchaseOrder) -> Result<PurchaseReceipt, ApiError>;

    /// Submission ids the buyer already owns.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn purchased_ids(&self, buyer_id: UserId) -> Result<Vec<SubmissionId>, ApiError>;

    /// A buyer's purchases with project names, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn purchases_by_buyer(&self, buyer_id: UserId) -> Result<Vec<PurchaseRecord>, ApiError>;

    // Ledger

    /// Credits a manual award with its `award` history row; returns the
    /// new balance.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UserNotFound`] for an unknown user.
    async fn award_tokens(
        &self,
        user_id: UserId,
        amount: ZorBits,
        now: DateTime<Utc>,
    ) -> Result<ZorBits, ApiError>;

    /// A user's balance history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn token_history(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<TokenHistoryEntry>, ApiError>;

    // Notifications

    /// Stores a notification.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn insert_notification(&self, notification: &Notification) -> Result<(), ApiError>;

    /// A user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn notifications(&self, user_id: UserId, limit: u32)
    -> Result<Vec<Notification>, ApiError>;

    /// Marks one of the user's notifications read and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn mark_notification_read(
        &self,
        user_id: UserId,
        id: Uuid,
    ) -> Result<Option<Notification>, ApiError>;

    /// Marks several of the user's notifications read; returns how many.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn mark_notifications_read(&self, user_id: UserId, ids: &[Uuid])
    -> Result<u64, ApiError>;

    /// Deletes one of the user's notifications. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn delete_notification(&self, user_id: UserId, id: Uuid) -> Result<bool, ApiError>;

    // Token revocation

    /// Revokes a token id until `expires_at`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), ApiError>;

    /// Whether a token id has been revoked.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, ApiError>;

    /// Drops revocations whose tokens have expired anyway; returns how many.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    async fn purge_revoked_tokens(&self, now: DateTime<Utc>) -> Result<u64, ApiError>;
}
