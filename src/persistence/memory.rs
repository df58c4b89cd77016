//! In-memory implementation of the persistence layer.
//!
//! All tables live behind a single [`tokio::sync::RwLock`]. Reads share the
//! lock; every mutation holds the write lock for its whole duration, which
//! gives multi-row operations such as purchases the same all-or-nothing
//! behaviour the PostgreSQL store gets from transactions.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::domain::{
    Listing, Notification, PortfolioVisibility, Purchase, PurchaseOrder, PurchaseReceipt,
    PurchaseRecord, Review, Submission, SubmissionId, SubmissionStatus, TokenAction,
    TokenHistoryEntry, User, UserId, UserUpdate, ZorBits,
};
use crate::error::ApiError;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    submissions: HashMap<SubmissionId, Submission>,
    visibility: HashMap<(UserId, SubmissionId), bool>,
    purchases: Vec<Purchase>,
    token_history: Vec<TokenHistoryEntry>,
    notifications: Vec<Notification>,
    revoked_tokens: HashMap<Uuid, DateTime<Utc>>,
}

impl Tables {
    fn listing(&self, submission: &Submission) -> Listing {
        Listing {
            submission: submission.clone(),
            owner: self.users.get(&submission.user_id).cloned(),
        }
    }
}

/// Process-local store; state is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T, K: Ord>(rows: &mut [T], key: impl Fn(&T) -> K) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

fn take_limit<T>(rows: Vec<T>, limit: u32) -> Vec<T> {
    rows.into_iter().take(limit as usize).collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), ApiError> {
        let mut t = self.tables.write().await;
        if t.users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(ApiError::EmailTaken);
        }
        if t.users.values().any(|u| u.username == user.username) {
            return Err(ApiError::invalid("Username is already taken"));
        }
        t.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, ApiError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let t = self.tables.read().await;
        Ok(t.users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<Option<User>, ApiError> {
        let mut t = self.tables.write().await;
        Ok(t.users.get_mut(&id).map(|user| {
            update.apply(user);
            user.clone()
        }))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, ApiError> {
        let mut t = self.tables.write().await;
        if t.users.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: HashSet<SubmissionId> = t
            .submissions
            .values()
            .filter(|s| s.user_id == id)
            .map(|s| s.id)
            .collect();
        t.submissions.retain(|sid, _| !owned.contains(sid));
        t.visibility
            .retain(|(uid, sid), _| *uid != id && !owned.contains(sid));
        t.purchases
            .retain(|p| p.buyer_id != id && !owned.contains(&p.submission_id));
        t.token_history.retain(|h| h.user_id != id);
        t.notifications.retain(|n| n.user_id != id);
        Ok(true)
    }

    async fn insert_submission(
        &self,
        submission: &Submission,
        window_start: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&submission.user_id) {
            return Err(ApiError::UserNotFound);
        }
        let used = t
            .submissions
            .values()
            .any(|s| s.user_id == submission.user_id && s.submitted_at >= window_start);
        if used {
            return Err(ApiError::WeeklyLimitReached);
        }
        t.submissions.insert(submission.id, submission.clone());
        Ok(())
    }

    async fn submission(&self, id: SubmissionId) -> Result<Option<Submission>, ApiError> {
        Ok(self.tables.read().await.submissions.get(&id).cloned())
    }

    async fn submissions_by_user(&self, user_id: UserId) -> Result<Vec<Submission>, ApiError> {
        let t = self.tables.read().await;
        let mut rows: Vec<Submission> = t
            .submissions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut rows, |s| s.submitted_at);
        Ok(rows)
    }

    async fn submissions_with_owner(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<Listing>, ApiError> {
        let t = self.tables.read().await;
        let mut rows: Vec<Listing> = t
            .submissions
            .values()
            .filter(|s| status.is_none_or(|st| s.status == st))
            .map(|s| t.listing(s))
            .collect();
        newest_first(&mut rows, |l| l.submission.submitted_at);
        Ok(rows)
    }

    async fn approved_listings(&self) -> Result<Vec<Listing>, ApiError> {
        let t = self.tables.read().await;
        let mut rows: Vec<Listing> = t
            .submissions
            .values()
            .filter(|s| s.status == SubmissionStatus::Approved)
            .map(|s| t.listing(s))
            .collect();
        newest_first(&mut rows, |l| l.submission.approved_at);
        Ok(rows)
    }

    async fn apply_review(&self, review: &Review) -> Result<Submission, ApiError> {
        let mut t = self.tables.write().await;
        let mut submission = t
            .submissions
            .get(&review.submission_id)
            .cloned()
            .ok_or(ApiError::SubmissionNotFound(Some(review.submission_id)))?;
        review
            .apply_to(&mut submission)
            .map_err(|e| ApiError::invalid(e.to_string()))?;

        if submission.status == SubmissionStatus::Approved && review.award.is_positive() {
            let owner = t
                .users
                .get_mut(&submission.user_id)
                .ok_or(ApiError::UserNotFound)?;
            owner.token_balance = owner.token_balance + review.award;
            t.token_history.push(TokenHistoryEntry::new(
                submission.user_id,
                review.award,
                TokenAction::Approval,
                Some(*submission.id.as_uuid()),
                review.reviewed_at,
            ));
        }
        t.notifications.push(review.notification.clone());
        t.submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }

    async fn visibility_overrides(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PortfolioVisibility>, ApiError> {
        let t = self.tables.read().await;
        Ok(t.visibility
            .iter()
            .filter(|((uid, _), _)| *uid == user_id)
            .map(|(&(user_id, submission_id), &visible)| PortfolioVisibility {
                user_id,
                submission_id,
                visible,
            })
            .collect())
    }

    async fn upsert_visibility(
        &self,
        visibility: &PortfolioVisibility,
    ) -> Result<PortfolioVisibility, ApiError> {
        let mut t = self.tables.write().await;
        t.visibility.insert(
            (visibility.user_id, visibility.submission_id),
            visibility.visible,
        );
        Ok(*visibility)
    }

    async fn purchase(&self, order: &PurchaseOrder) -> Result<PurchaseReceipt, ApiError> {
        let mut t = self.tables.write().await;
        if t.purchases
            .iter()
            .any(|p| p.buyer_id == order.buyer_id && p.submission_id == order.submission_id)
        {
            return Err(ApiError::AlreadyPurchased);
        }
        let buyer = t
            .users
            .get_mut(&order.buyer_id)
            .ok_or(ApiError::UserNotFound)?;
        if buyer.token_balance < order.price {
            return Err(ApiError::InsufficientBalance {
                balance: buyer.token_balance,
                price: order.price,
            });
        }
        buyer.token_balance = buyer.token_balance - order.price;
        let new_balance = buyer.token_balance;

        let purchase = Purchase {
            id: Uuid::new_v4(),
            buyer_id: order.buyer_id,
            submission_id: order.submission_id,
            tokens_spent: order.price,
            created_at: order.now,
        };
        t.purchases.push(purchase.clone());
        t.token_history.push(TokenHistoryEntry::new(
            order.buyer_id,
            -order.price,
            TokenAction::Purchase,
            Some(*order.submission_id.as_uuid()),
            order.now,
        ));
        t.notifications.push(Notification::project_purchased(
            order.owner_id,
            &order.repo_name,
            order.price,
            order.now,
        ));

        Ok(PurchaseReceipt {
            purchase,
            new_balance,
        })
    }

    async fn purchased_ids(&self, buyer_id: UserId) -> Result<Vec<SubmissionId>, ApiError> {
        let t = self.tables.read().await;
        Ok(t.purchases
            .iter()
            .filter(|p| p.buyer_id == buyer_id)
            .map(|p| p.submission_id)
            .collect())
    }

    async fn purchases_by_buyer(&self, buyer_id: UserId) -> Result<Vec<PurchaseRecord>, ApiError> {
        let t = self.tables.read().await;
        let mut rows: Vec<PurchaseRecord> = t
            .purchases
            .iter()
            .filter(|p| p.buyer_id == buyer_id)
            .map(|p| PurchaseRecord {
                purchase: p.clone(),
                project_name: t
                    .submissions
                    .get(&p.submission_id)
                    .map(|s| s.repo_name.clone()),
            })
            .collect();
        newest_first(&mut rows, |r| r.purchase.created_at);
        Ok(rows)
    }

    async fn award_tokens(
        &self,
        user_id: UserId,
        amount: ZorBits,
        now: DateTime<Utc>,
    ) -> Result<ZorBits, ApiError> {
        let mut t = self.tables.write().await;
        let user = t.users.get_mut(&user_id).ok_or(ApiError::UserNotFound)?;
        user.token_balance = user.token_balance + amount;
        let balance = user.token_balance;
        t.token_history.push(TokenHistoryEntry::new(
            user_id,
            amount,
            TokenAction::Award,
            None,
            now,
        ));
        Ok(balance)
    }

    async fn token_history(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<TokenHistoryEntry>, ApiError> {
        let t = self.tables.read().await;
        let mut rows: Vec<TokenHistoryEntry> = t
            .token_history
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut rows, |h| h.created_at);
        Ok(take_limit(rows, limit))
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<(), ApiError> {
        self.tables
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(())
    }

    async fn notifications(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<Notification>, ApiError> {
        let t = self.tables.read().await;
        let mut rows: Vec<Notification> = t
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut rows, |n| n.created_at);
        Ok(take_limit(rows, limit))
    }

    async fn mark_notification_read(
        &self,
        user_id: UserId,
        id: Uuid,
    ) -> Result<Option<Notification>, ApiError> {
        let mut t = self.tables.write().await;
        Ok(t.notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .map(|n| {
                n.read = true;
                n.clone()
            }))
    }

    async fn mark_notifications_read(
        &self,
        user_id: UserId,
        ids: &[Uuid],
    ) -> Result<u64, ApiError> {
        let mut t = self.tables.write().await;
        let mut updated = 0;
        for n in t
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && ids.contains(&n.id))
        {
            n.read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_notification(&self, user_id: UserId, id: Uuid) -> Result<bool, ApiError> {
        let mut t = self.tables.write().await;
        let before = t.notifications.len();
        t.notifications
            .retain(|n| !(n.id == id && n.user_id == user_id));
        Ok(t.notifications.len() != before)
    }

    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), ApiError> {
        self.tables
            .write()
            .await
            .revoked_tokens
            .insert(jti, expires_at);
        Ok(())
    }

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, ApiError> {
        Ok(self.tables.read().await.revoked_tokens.contains_key(&jti))
    }

    async fn purge_revoked_tokens(&self, now: DateTime<Utc>) -> Result<u64, ApiError> {
        let mut t = self.tables.write().await;
        let before = t.revoked_tokens.len();
        t.revoked_tokens.retain(|_, expires_at| *expires_at > now);
        Ok((before - t.revoked_tokens.len()) as u64)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{GithubRepo, ZorBits};
    use chrono::Duration;

    fn user(email: &str, username: &str) -> User {
        User::register(
            email.into(),
            "hash".into(),
            username.into(),
            username.into(),
            false,
            Utc::now(),
        )
    }

    fn submission(owner: UserId, at: DateTime<Utc>) -> Submission {
        Submission::pending(
            owner,
            GithubRepo {
                owner: "acme".into(),
                name: "engine".into(),
            },
            "https://github.com/acme/engine".into(),
            "rust, cli".into(),
            at,
        )
    }

    async fn store_with(users: &[&User]) -> MemoryStore {
        let store = MemoryStore::new();
        for u in users {
            let Ok(()) = store.insert_user(u).await else {
                panic!("insert user failed");
            };
        }
        store
    }

    fn order(buyer: UserId, sub: &Submission, price: i64) -> PurchaseOrder {
        PurchaseOrder {
            buyer_id: buyer,
            submission_id: sub.id,
            owner_id: sub.user_id,
            repo_name: sub.repo_name.clone(),
            price: ZorBits::whole(price),
            now: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let ada = user("ada@example.com", "ada");
        let store = store_with(&[&ada]).await;
        let dup = user("ADA@example.com", "ada2");
        assert!(matches!(
            store.insert_user(&dup).await,
            Err(ApiError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn weekly_window_blocks_second_submission() {
        let ada = user("ada@example.com", "ada");
        let store = store_with(&[&ada]).await;
        let now = Utc::now();
        let window = now - Duration::days(7);

        assert!(store.insert_submission(&submission(ada.id, now), window).await.is_ok());
        assert!(matches!(
            store.insert_submission(&submission(ada.id, now), window).await,
            Err(ApiError::WeeklyLimitReached)
        ));
    }

    #[tokio::test]
    async fn submissions_outside_window_do_not_count() {
        let ada = user("ada@example.com", "ada");
        let store = store_with(&[&ada]).await;
        let now = Utc::now();
        let old = submission(ada.id, now - Duration::days(8));
        assert!(store.insert_submission(&old, old.submitted_at - Duration::days(7)).await.is_ok());
        assert!(
            store
                .insert_submission(&submission(ada.id, now), now - Duration::days(7))
                .await
                .is_ok()
        );
        let Ok(mine) = store.submissions_by_user(ada.id).await else {
            panic!("list failed");
        };
        assert_eq!(mine.len(), 2);
        assert!(mine.first().is_some_and(|s| s.submitted_at == now));
    }

    #[tokio::test]
    async fn purchase_debits_and_records_everything() {
        let owner = user("owner@example.com", "owner");
        let mut buyer = user("buyer@example.com", "buyer");
        buyer.token_balance = ZorBits::whole(250);
        let store = store_with(&[&owner, &buyer]).await;
        let sub = submission(owner.id, Utc::now());
        let _ = store.insert_submission(&sub, Utc::now() - Duration::days(7)).await;

        let Ok(receipt) = store.purchase(&order(buyer.id, &sub, 150)).await else {
            panic!("purchase failed");
        };
        assert_eq!(receipt.new_balance, ZorBits::whole(100));

        let Ok(history) = store.token_history(buyer.id, 10).await else {
            panic!("history failed");
        };
        assert_eq!(history.len(), 1);
        assert!(history.first().is_some_and(|h| h.amount == ZorBits::whole(-150)));

        let Ok(notes) = store.notifications(owner.id, 10).await else {
            panic!("notifications failed");
        };
        assert_eq!(notes.len(), 1);

        let Ok(records) = store.purchases_by_buyer(buyer.id).await else {
            panic!("purchases failed");
        };
        assert!(records.first().is_some_and(|r| r.project_name.as_deref() == Some("engine")));
    }

    #[tokio::test]
    async fn failed_purchase_writes_nothing() {
        let owner = user("owner@example.com", "owner");
        let mut buyer = user("buyer@example.com", "buyer");
        buyer.token_balance = ZorBits::whole(50);
        let store = store_with(&[&owner, &buyer]).await;
        let sub = submission(owner.id, Utc::now());

        assert!(matches!(
            store.purchase(&order(buyer.id, &sub, 150)).await,
            Err(ApiError::InsufficientBalance { .. })
        ));
        let Ok(Some(after)) = store.user_by_id(buyer.id).await else {
            panic!("buyer missing");
        };
        assert_eq!(after.token_balance, ZorBits::whole(50));
        assert!(store.purchased_ids(buyer.id).await.is_ok_and(|ids| ids.is_empty()));
    }

    #[tokio::test]
    async fn concurrent_purchases_cannot_overspend() {
        let owner = user("owner@example.com", "owner");
        let mut buyer = user("buyer@example.com", "buyer");
        buyer.token_balance = ZorBits::whole(150);
        let store = std::sync::Arc::new(store_with(&[&owner, &buyer]).await);
        let first = submission(owner.id, Utc::now());
        let second = submission(owner.id, Utc::now());

        let a = {
            let store = std::sync::Arc::clone(&store);
            let o = order(buyer.id, &first, 100);
            tokio::spawn(async move { store.purchase(&o).await })
        };
        let b = {
            let store = std::sync::Arc::clone(&store);
            let o = order(buyer.id, &second, 100);
            tokio::spawn(async move { store.purchase(&o).await })
        };
        let (Ok(a), Ok(b)) = (a.await, b.await) else {
            panic!("task panicked");
        };
        assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);

        let Ok(Some(after)) = store.user_by_id(buyer.id).await else {
            panic!("buyer missing");
        };
        assert_eq!(after.token_balance, ZorBits::whole(50));
    }

    #[tokio::test]
    async fn delete_user_cascades() {
        let ada = user("ada@example.com", "ada");
        let store = store_with(&[&ada]).await;
        let sub = submission(ada.id, Utc::now());
        let _ = store.insert_submission(&sub, Utc::now() - Duration::days(7)).await;
        let _ = store
            .insert_notification(&Notification::submission_received(ada.id, "engine", Utc::now()))
            .await;

        assert!(matches!(store.delete_user(ada.id).await, Ok(true)));
        assert!(matches!(store.submission(sub.id).await, Ok(None)));
        assert!(store.notifications(ada.id, 10).await.is_ok_and(|n| n.is_empty()));
        assert!(matches!(store.delete_user(ada.id).await, Ok(false)));
    }

    #[tokio::test]
    async fn notifications_are_scoped_to_owner() {
        let ada = user("ada@example.com", "ada");
        let bob = user("bob@example.com", "bob");
        let store = store_with(&[&ada, &bob]).await;
        let note = Notification::submission_received(ada.id, "engine", Utc::now());
        let _ = store.insert_notification(&note).await;

        assert!(matches!(store.mark_notification_read(bob.id, note.id).await, Ok(None)));
        assert!(matches!(store.delete_notification(bob.id, note.id).await, Ok(false)));
        assert!(matches!(store.mark_notifications_read(ada.id, &[note.id]).await, Ok(1)));
        assert!(matches!(store.delete_notification(ada.id, note.id).await, Ok(true)));
    }

    #[tokio::test]
    async fn revoked_tokens_expire() {
        let store = MemoryStore::new();
        let jti = Uuid::new_v4();
        let now = Utc::now();
        let _ = store.revoke_token(jti, now + Duration::minutes(5)).await;
        assert!(matches!(store.is_token_revoked(jti).await, Ok(true)));
        assert!(matches!(store.purge_revoked_tokens(now).await, Ok(0)));
        assert!(matches!(
            store.purge_revoked_tokens(now + Duration::minutes(10)).await,
            Ok(1)
        ));
        assert!(matches!(store.is_token_revoked(jti).await, Ok(false)));
    }
}
