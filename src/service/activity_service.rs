//! Activity service: dashboard overview, notifications, ZorBit ledger.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::submission::{next_deadline, weekly_status};
use crate::domain::{
    Notification, Submission, SubmissionStatus, TokenHistoryEntry, User, UserId, WeeklyStatus,
    ZorBits,
};
use crate::error::ApiError;
use crate::persistence::Store;

/// Notifications returned when no limit is given.
pub const DEFAULT_NOTIFICATION_LIMIT: u32 = 20;
/// Largest accepted notification limit.
pub const MAX_NOTIFICATION_LIMIT: u32 = 100;
/// History rows returned when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;
/// Largest accepted history limit.
pub const MAX_HISTORY_LIMIT: u32 = 200;

const RECENT_SUBMISSIONS: usize = 5;
const RECENT_NOTIFICATIONS: u32 = 3;

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOverview {
    /// The caller.
    pub user: User,
    /// Approved submissions.
    pub approved: usize,
    /// Submissions waiting for review.
    pub pending: usize,
    /// Rejected submissions.
    pub rejected: usize,
    /// Sum of awards over approved submissions.
    pub total_earned: ZorBits,
    /// Newest submissions.
    pub recent_submissions: Vec<Submission>,
    /// The upcoming Sunday.
    pub next_deadline: NaiveDate,
    /// Whether the caller submitted within the last seven days.
    pub weekly_status: WeeklyStatus,
    /// Newest notifications.
    pub notifications: Vec<Notification>,
}

/// Read-mostly views over a user's activity.
#[derive(Debug, Clone)]
pub struct ActivityService {
    store: Arc<dyn Store>,
}

fn clamp_limit(limit: Option<u32>, default: u32, max: u32) -> u32 {
    limit.unwrap_or(default).clamp(1, max)
}

impl ActivityService {
    /// Creates a new `ActivityService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Builds the dashboard overview for the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UserNotFound`] when the user row is gone.
    pub async fn dashboard(&self, user_id: UserId) -> Result<DashboardOverview, ApiError> {
        let user = self
            .store
            .user_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        let submissions = self.store.submissions_by_user(user_id).await?;
        let count = |status: SubmissionStatus| {
            submissions.iter().filter(|s| s.status == status).count()
        };
        let now = Utc::now();

        Ok(DashboardOverview {
            approved: count(SubmissionStatus::Approved),
            pending: count(SubmissionStatus::Pending),
            rejected: count(SubmissionStatus::Rejected),
            total_earned: submissions.iter().map(Submission::earned).sum(),
            next_deadline: next_deadline(now.date_naive()),
            weekly_status: weekly_status(&submissions, now),
            recent_submissions: submissions.iter().take(RECENT_SUBMISSIONS).cloned().collect(),
            notifications: self
                .store
                .notifications(user_id, RECENT_NOTIFICATIONS)
                .await?,
            user,
        })
    }

    /// The caller's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    pub async fn notifications(
        &self,
        user_id: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<Notification>, ApiError> {
        let limit = clamp_limit(limit, DEFAULT_NOTIFICATION_LIMIT, MAX_NOTIFICATION_LIMIT);
        self.store.notifications(user_id, limit).await
    }

    /// Marks one of the caller's notifications read.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotificationNotFound`] when it is not the caller's.
    pub async fn mark_read(&self, user_id: UserId, id: Uuid) -> Result<Notification, ApiError> {
        self.store
            .mark_notification_read(user_id, id)
            .await?
            .ok_or(ApiError::NotificationNotFound(id))
    }

    /// Marks several of the caller's notifications read.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    pub async fn mark_all_read(&self, user_id: UserId, ids: &[Uuid]) -> Result<u64, ApiError> {
        let updated = self.store.mark_notifications_read(user_id, ids).await?;
        tracing::debug!(%user_id, requested = ids.len(), updated, "notifications marked read");
        Ok(updated)
    }

    /// Deletes one of the caller's notifications.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotificationNotFound`] when it is not the caller's.
    pub async fn delete_notification(&self, user_id: UserId, id: Uuid) -> Result<(), ApiError> {
        if self.store.delete_notification(user_id, id).await? {
            Ok(())
        } else {
            Err(ApiError::NotificationNotFound(id))
        }
    }

    /// The caller's ZorBit balance.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UserNotFound`] when the user row is gone.
    pub async fn balance(&self, user_id: UserId) -> Result<ZorBits, ApiError> {
        self.store
            .user_by_id(user_id)
            .await?
            .map(|u| u.token_balance)
            .ok_or(ApiError::UserNotFound)
    }

    /// The caller's balance history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    pub async fn history(
        &self,
        user_id: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<TokenHistoryEntry>, ApiError> {
        let limit = clamp_limit(limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT);
        self.store.token_history(user_id, limit).await
    }

    /// Credits a manual award to a user; returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for a non-positive amount or one
    /// above [`ZorBits::MAX_AWARD`], and [`ApiError::UserNotFound`] for an
    /// unknown user.
    pub async fn award(&self, user_id: UserId, amount: ZorBits) -> Result<ZorBits, ApiError> {
        if !amount.is_positive() {
            return Err(ApiError::invalid("amount must be positive"));
        }
        if amount > ZorBits::MAX_AWARD {
            return Err(ApiError::invalid(format!(
                "amount must not exceed {} ZorBits",
                ZorBits::MAX_AWARD
            )));
        }
        let balance = self.store.award_tokens(user_id, amount, Utc::now()).await?;
        tracing::info!(%user_id, %amount, %balance, "tokens awarded");
        Ok(balance)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::TokenAction;
    use crate::service::{SubmissionService, fixtures};

    #[test]
    fn limits_are_clamped() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
        assert_eq!(clamp_limit(Some(500), 20, 100), 100);
    }

    #[tokio::test]
    async fn dashboard_counts_by_status() {
        let store = fixtures::store();
        let accounts = fixtures::accounts(Arc::clone(&store));
        let submissions = SubmissionService::new(Arc::clone(&store));
        let activity = ActivityService::new(Arc::clone(&store));
        let ada = fixtures::register(&accounts, "ada@example.com").await;

        let Ok(empty) = activity.dashboard(ada.id).await else {
            panic!("dashboard failed");
        };
        assert_eq!(empty.weekly_status, WeeklyStatus::NotSubmitted);
        assert_eq!(empty.total_earned, ZorBits::ZERO);

        let Ok(sub) = submissions
            .submit(ada.id, "https://github.com/ada/engine", None)
            .await
        else {
            panic!("submission failed");
        };
        let _ = submissions
            .review(sub.id, SubmissionStatus::Approved, None)
            .await;

        let Ok(overview) = activity.dashboard(ada.id).await else {
            panic!("dashboard failed");
        };
        assert_eq!(overview.approved, 1);
        assert_eq!(overview.pending, 0);
        assert_eq!(overview.total_earned, ZorBits::whole(1));
        assert_eq!(overview.weekly_status, WeeklyStatus::OnTrack);
        assert_eq!(overview.recent_submissions.len(), 1);
        assert_eq!(overview.notifications.len(), 2);
    }

    #[tokio::test]
    async fn notifications_are_private() {
        let store = fixtures::store();
        let accounts = fixtures::accounts(Arc::clone(&store));
        let submissions = SubmissionService::new(Arc::clone(&store));
        let activity = ActivityService::new(Arc::clone(&store));
        let ada = fixtures::register(&accounts, "ada@example.com").await;
        let bob = fixtures::register(&accounts, "bob@example.com").await;
        let _ = submissions
            .submit(ada.id, "https://github.com/ada/engine", None)
            .await;

        let Ok(notes) = activity.notifications(ada.id, None).await else {
            panic!("notifications failed");
        };
        let Some(note) = notes.first() else {
            panic!("expected a notification");
        };
        assert!(matches!(
            activity.mark_read(bob.id, note.id).await,
            Err(ApiError::NotificationNotFound(_))
        ));
        assert!(activity.mark_read(ada.id, note.id).await.is_ok_and(|n| n.read));
        assert!(activity.delete_notification(ada.id, note.id).await.is_ok());
        assert!(matches!(
            activity.delete_notification(ada.id, note.id).await,
            Err(ApiError::NotificationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn award_is_recorded_in_history() {
        let store = fixtures::store();
        let accounts = fixtures::accounts(Arc::clone(&store));
        let activity = ActivityService::new(Arc::clone(&store));
        let ada = fixtures::register(&accounts, "ada@example.com").await;

        assert!(matches!(
            activity.award(ada.id, ZorBits::ZERO).await,
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(matches!(
            activity.award(ada.id, ZorBits::MAX_AWARD + ZorBits::from_hundredths(1)).await,
            Err(ApiError::InvalidRequest(msg)) if msg == "amount must not exceed 1000000 ZorBits"
        ));
        assert!(matches!(
            activity.award(ada.id, ZorBits::whole(25)).await,
            Ok(b) if b == ZorBits::whole(25)
        ));
        let Ok(history) = activity.history(ada.id, None).await else {
            panic!("history failed");
        };
        assert!(history.first().is_some_and(|h| h.action == TokenAction::Award));
        assert!(matches!(activity.balance(ada.id).await, Ok(b) if b == ZorBits::whole(25)));
    }
}
