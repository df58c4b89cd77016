//! PostgreSQL implementation of the persistence layer.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::Store;
use super::models::{
    NotificationRow, PurchaseRow, SUBMISSION_COLUMNS, SubmissionRow, TokenHistoryRow,
    USER_COLUMNS, UserRow,
};
use crate::domain::{
    Listing, Notification, PortfolioVisibility, Purchase, PurchaseOrder, PurchaseReceipt,
    PurchaseRecord, Review, Submission, SubmissionId, SubmissionStatus, TokenAction,
    TokenHistoryEntry, User, UserId, UserUpdate, ZorBits,
};
use crate::error::ApiError;

const NOTIFICATION_COLUMNS: &str = "id, user_id, message, type, read, created_at";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn users_by_ids(&self, ids: Vec<Uuid>) -> Result<HashMap<UserId, User>, ApiError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| User::try_from(row).map(|u| (u.id, u)))
            .collect()
    }

    async fn with_owners(&self, rows: Vec<SubmissionRow>) -> Result<Vec<Listing>, ApiError> {
        let submissions = rows
            .into_iter()
            .map(Submission::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let owner_ids: Vec<Uuid> = submissions.iter().map(|s| *s.user_id.as_uuid()).collect();
        let owners = self.users_by_ids(owner_ids).await?;
        Ok(submissions
            .into_iter()
            .map(|submission| Listing {
                owner: owners.get(&submission.user_id).cloned(),
                submission,
            })
            .collect())
    }
}

/// Maps a unique-constraint violation on `users` to the matching API error.
fn map_user_conflict(e: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            let constraint = db.constraint().unwrap_or_default();
            return if constraint.contains("email") {
                ApiError::EmailTaken
            } else {
                ApiError::invalid("Username is already taken")
            };
        }
    }
    ApiError::from(e)
}

async fn insert_notification_row<'e, E: PgExecutor<'e>>(
    executor: E,
    n: &Notification,
) -> Result<(), ApiError> {
    sqlx::query(
        "INSERT INTO notifications (id, user_id, message, type, read, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(n.id)
    .bind(n.user_id.as_uuid())
    .bind(&n.message)
    .bind(n.kind.as_str())
    .bind(n.read)
    .bind(n.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

async fn insert_history_row<'e, E: PgExecutor<'e>>(
    executor: E,
    entry: &TokenHistoryEntry,
) -> Result<(), ApiError> {
    sqlx::query(
        "INSERT INTO token_history (id, user_id, amount, action_type, related_id, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(entry.id)
    .bind(entry.user_id.as_uuid())
    .bind(entry.amount.hundredths())
    .bind(entry.action.as_str())
    .bind(entry.related_id)
    .bind(entry.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl Store for PostgresStore {
    async fn insert_user(&self, user: &User) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, name, username, avatar_url, \
             github_username, token_balance, selected_template, is_admin, email_notifications, \
             project_notifications, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.avatar_url)
        .bind(&user.github_username)
        .bind(user.token_balance.hundredths())
        .bind(user.selected_template.key())
        .bind(user.is_admin)
        .bind(user.email_notifications)
        .bind(user.project_notifications)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_user_conflict)?;
        Ok(())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<Option<User>, ApiError> {
        let mut tx = self.pool.begin().await?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE");
        let Some(row) = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        let mut user = User::try_from(row)?;
        update.apply(&mut user);

        sqlx::query(
            "UPDATE users SET name = $2, github_username = $3, avatar_url = $4, \
             selected_template = $5, email_notifications = $6, project_notifications = $7, \
             password_hash = $8 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(&user.name)
        .bind(&user.github_username)
        .bind(&user.avatar_url)
        .bind(user.selected_template.key())
        .bind(user.email_notifications)
        .bind(user.project_notifications)
        .bind(&user.password_hash)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(Some(user))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_submission(
        &self,
        submission: &Submission,
        window_start: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;

        // The owner row lock serializes concurrent submissions per user.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(submission.user_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(ApiError::UserNotFound);
        }

        let used: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM submissions WHERE user_id = $1 AND submitted_at >= $2)",
        )
        .bind(submission.user_id.as_uuid())
        .bind(window_start)
        .fetch_one(&mut *tx)
        .await?;
        if used {
            return Err(ApiError::WeeklyLimitReached);
        }

        sqlx::query(
            "INSERT INTO submissions (id, user_id, repo_url, repo_name, description, status, \
             tokens_awarded, submitted_at, approved_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(submission.id.as_uuid())
        .bind(submission.user_id.as_uuid())
        .bind(&submission.repo_url)
        .bind(&submission.repo_name)
        .bind(&submission.description)
        .bind(submission.status.as_str())
        .bind(submission.tokens_awarded.hundredths())
        .bind(submission.submitted_at)
        .bind(submission.approved_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn submission(&self, id: SubmissionId) -> Result<Option<Submission>, ApiError> {
        let sql = format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1");
        sqlx::query_as::<_, SubmissionRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(Submission::try_from)
            .transpose()
    }

    async fn submissions_by_user(&self, user_id: UserId) -> Result<Vec<Submission>, ApiError> {
        let sql = format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE user_id = $1 \
             ORDER BY submitted_at DESC"
        );
        sqlx::query_as::<_, SubmissionRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Submission::try_from)
            .collect()
    }

    async fn submissions_with_owner(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<Listing>, ApiError> {
        let rows = if let Some(status) = status {
            let sql = format!(
                "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE status = $1 \
                 ORDER BY submitted_at DESC"
            );
            sqlx::query_as::<_, SubmissionRow>(&sql)
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
        } else {
            let sql =
                format!("SELECT {SUBMISSION_COLUMNS} FROM submissions ORDER BY submitted_at DESC");
            sqlx::query_as::<_, SubmissionRow>(&sql)
                .fetch_all(&self.pool)
                .await?
        };
        self.with_owners(rows).await
    }

    async fn approved_listings(&self) -> Result<Vec<Listing>, ApiError> {
        let sql = format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE status = 'approved' \
             ORDER BY approved_at DESC NULLS LAST"
        );
        let rows = sqlx::query_as::<_, SubmissionRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        self.with_owners(rows).await
    }

    async fn apply_review(&self, review: &Review) -> Result<Submission, ApiError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1 FOR UPDATE");
        let row = sqlx::query_as::<_, SubmissionRow>(&sql)
            .bind(review.submission_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ApiError::SubmissionNotFound(Some(review.submission_id)))?;
        let mut submission = Submission::try_from(row)?;
        review
            .apply_to(&mut submission)
            .map_err(|e| ApiError::invalid(e.to_string()))?;

        sqlx::query(
            "UPDATE submissions SET status = $2, tokens_awarded = $3, approved_at = $4 \
             WHERE id = $1",
        )
        .bind(submission.id.as_uuid())
        .bind(submission.status.as_str())
        .bind(submission.tokens_awarded.hundredths())
        .bind(submission.approved_at)
        .execute(&mut *tx)
        .await?;

        if submission.status == SubmissionStatus::Approved && review.award.is_positive() {
            let credited = sqlx::query(
                "UPDATE users SET token_balance = token_balance + $2 WHERE id = $1",
            )
            .bind(submission.user_id.as_uuid())
            .bind(review.award.hundredths())
            .execute(&mut *tx)
            .await?;
            if credited.rows_affected() == 0 {
                return Err(ApiError::UserNotFound);
            }
            let entry = TokenHistoryEntry::new(
                submission.user_id,
                review.award,
                TokenAction::Approval,
                Some(*submission.id.as_uuid()),
                review.reviewed_at,
            );
            insert_history_row(&mut *tx, &entry).await?;
        }

        insert_notification_row(&mut *tx, &review.notification).await?;
        tx.commit().await?;
        Ok(submission)
    }

    async fn visibility_overrides(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PortfolioVisibility>, ApiError> {
        let rows = sqlx::query_as::<_, (Uuid, bool)>(
            "SELECT submission_id, visible FROM portfolio_visibility WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(submission_id, visible)| PortfolioVisibility {
                user_id,
                submission_id: SubmissionId::from_uuid(submission_id),
                visible,
            })
            .collect())
    }

    async fn upsert_visibility(
        &self,
        visibility: &PortfolioVisibility,
    ) -> Result<PortfolioVisibility, ApiError> {
        sqlx::query(
            "INSERT INTO portfolio_visibility (user_id, submission_id, visible) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, submission_id) DO UPDATE SET visible = EXCLUDED.visible",
        )
        .bind(visibility.user_id.as_uuid())
        .bind(visibility.submission_id.as_uuid())
        .bind(visibility.visible)
        .execute(&self.pool)
        .await?;
        Ok(*visibility)
    }

    async fn purchase(&self, order: &PurchaseOrder) -> Result<PurchaseReceipt, ApiError> {
        let mut tx = self.pool.begin().await?;

        // Locking the buyer row serializes concurrent purchases by one buyer.
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT token_balance FROM users WHERE id = $1 FOR UPDATE")
                .bind(order.buyer_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;
        let balance = ZorBits::from_hundredths(balance.ok_or(ApiError::UserNotFound)?);

        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM purchases WHERE buyer_id = $1 AND submission_id = $2)",
        )
        .bind(order.buyer_id.as_uuid())
        .bind(order.submission_id.as_uuid())
        .fetch_one(&mut *tx)
        .await?;
        if owned {
            return Err(ApiError::AlreadyPurchased);
        }
        if balance < order.price {
            return Err(ApiError::InsufficientBalance {
                balance,
                price: order.price,
            });
        }

        let purchase = Purchase {
            id: Uuid::new_v4(),
            buyer_id: order.buyer_id,
            submission_id: order.submission_id,
            tokens_spent: order.price,
            created_at: order.now,
        };
        sqlx::query(
            "INSERT INTO purchases (id, buyer_id, submission_id, tokens_spent, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(purchase.id)
        .bind(purchase.buyer_id.as_uuid())
        .bind(purchase.submission_id.as_uuid())
        .bind(purchase.tokens_spent.hundredths())
        .bind(purchase.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::AlreadyPurchased,
            _ => ApiError::from(e),
        })?;

        let new_balance: i64 = sqlx::query_scalar(
            "UPDATE users SET token_balance = token_balance - $2 WHERE id = $1 \
             RETURNING token_balance",
        )
        .bind(order.buyer_id.as_uuid())
        .bind(order.price.hundredths())
        .fetch_one(&mut *tx)
        .await?;

        let entry = TokenHistoryEntry::new(
            order.buyer_id,
            -order.price,
            TokenAction::Purchase,
            Some(*order.submission_id.as_uuid()),
            order.now,
        );
        insert_history_row(&mut *tx, &entry).await?;

        let notice = Notification::project_purchased(
            order.owner_id,
            &order.repo_name,
            order.price,
            order.now,
        );
        insert_notification_row(&mut *tx, &notice).await?;

        tx.commit().await?;
        Ok(PurchaseReceipt {
            purchase,
            new_balance: ZorBits::from_hundredths(new_balance),
        })
    }

    async fn purchased_ids(&self, buyer_id: UserId) -> Result<Vec<SubmissionId>, ApiError> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT submission_id FROM purchases WHERE buyer_id = $1")
                .bind(buyer_id.as_uuid())
                .fetch_all(&self.pool)
                .await?;
        Ok(ids.into_iter().map(SubmissionId::from_uuid).collect())
    }

    async fn purchases_by_buyer(&self, buyer_id: UserId) -> Result<Vec<PurchaseRecord>, ApiError> {
        let rows = sqlx::query_as::<_, PurchaseRow>(
            "SELECT p.id, p.buyer_id, p.submission_id, p.tokens_spent, p.created_at, s.repo_name \
             FROM purchases p LEFT JOIN submissions s ON s.id = p.submission_id \
             WHERE p.buyer_id = $1 ORDER BY p.created_at DESC",
        )
        .bind(buyer_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PurchaseRecord::from).collect())
    }

    async fn award_tokens(
        &self,
        user_id: UserId,
        amount: ZorBits,
        now: DateTime<Utc>,
    ) -> Result<ZorBits, ApiError> {
        let mut tx = self.pool.begin().await?;
        let balance: Option<i64> = sqlx::query_scalar(
            "UPDATE users SET token_balance = token_balance + $2 WHERE id = $1 \
             RETURNING token_balance",
        )
        .bind(user_id.as_uuid())
        .bind(amount.hundredths())
        .fetch_optional(&mut *tx)
        .await?;
        let balance = balance.ok_or(ApiError::UserNotFound)?;

        let entry = TokenHistoryEntry::new(user_id, amount, TokenAction::Award, None, now);
        insert_history_row(&mut *tx, &entry).await?;
        tx.commit().await?;
        Ok(ZorBits::from_hundredths(balance))
    }

    async fn token_history(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<TokenHistoryEntry>, ApiError> {
        let rows = sqlx::query_as::<_, TokenHistoryRow>(
            "SELECT id, user_id, amount, action_type, related_id, created_at FROM token_history \
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id.as_uuid())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(TokenHistoryEntry::from).collect())
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<(), ApiError> {
        insert_notification_row(&self.pool, notification).await
    }

    async fn notifications(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<Notification>, ApiError> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2"
        );
        sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(user_id.as_uuid())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Notification::try_from)
            .collect()
    }

    async fn mark_notification_read(
        &self,
        user_id: UserId,
        id: Uuid,
    ) -> Result<Option<Notification>, ApiError> {
        let sql = format!(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2 \
             RETURNING {NOTIFICATION_COLUMNS}"
        );
        sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(id)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(Notification::try_from)
            .transpose()
    }

    async fn mark_notifications_read(
        &self,
        user_id: UserId,
        ids: &[Uuid],
    ) -> Result<u64, ApiError> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE user_id = $1 AND id = ANY($2)",
        )
        .bind(user_id.as_uuid())
        .bind(ids.to_vec())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_notification(&self, user_id: UserId, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO revoked_tokens (jti, expires_at) VALUES ($1, $2) \
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, ApiError> {
        let revoked: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await?;
        Ok(revoked)
    }

    async fn purge_revoked_tokens(&self, now: DateTime<Utc>) -> Result<u64, ApiError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
