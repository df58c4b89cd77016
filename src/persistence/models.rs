//! Database row types and their conversion into domain types.
//!
//! Amounts are stored as `BIGINT` hundredths of a ZorBit; enum-like columns
//! are stored as their lowercase names and parsed back here. An unknown
//! stored value surfaces as [`ApiError::Persistence`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Notification, NotificationKind, PortfolioTemplate, Purchase, PurchaseRecord, Submission,
    SubmissionId, SubmissionStatus, TokenAction, TokenHistoryEntry, User, UserId, ZorBits,
};
use crate::error::ApiError;

/// Column list matching [`UserRow`].
pub const USER_COLUMNS: &str = "id, email, password_hash, name, username, avatar_url, \
     github_username, token_balance, selected_template, is_admin, email_notifications, \
     project_notifications, created_at";

/// Column list matching [`SubmissionRow`].
pub const SUBMISSION_COLUMNS: &str = "id, user_id, repo_url, repo_name, description, status, \
     tokens_awarded, submitted_at, approved_at";

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// Primary key.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// bcrypt hash.
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Public username.
    pub username: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// GitHub account name.
    pub github_username: Option<String>,
    /// Balance in hundredths.
    pub token_balance: i64,
    /// Template key.
    pub selected_template: String,
    /// Administrator flag.
    pub is_admin: bool,
    /// Email notification preference.
    pub email_notifications: bool,
    /// Project notification preference.
    pub project_notifications: bool,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = ApiError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let selected_template = row
            .selected_template
            .parse::<PortfolioTemplate>()
            .map_err(|e| ApiError::Persistence(e.to_string()))?;
        Ok(Self {
            id: UserId::from_uuid(row.id),
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            username: row.username,
            avatar_url: row.avatar_url,
            github_username: row.github_username,
            token_balance: ZorBits::from_hundredths(row.token_balance),
            selected_template,
            is_admin: row.is_admin,
            email_notifications: row.email_notifications,
            project_notifications: row.project_notifications,
            created_at: row.created_at,
        })
    }
}

/// A row from the `submissions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubmissionRow {
    /// Primary key.
    pub id: Uuid,
    /// Owner.
    pub user_id: Uuid,
    /// Repository URL.
    pub repo_url: String,
    /// Repository name.
    pub repo_name: String,
    /// Owner description.
    pub description: String,
    /// Status name.
    pub status: String,
    /// Award in hundredths.
    pub tokens_awarded: i64,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = ApiError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<SubmissionStatus>()
            .map_err(|e| ApiError::Persistence(e.to_string()))?;
        Ok(Self {
            id: SubmissionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            repo_url: row.repo_url,
            repo_name: row.repo_name,
            description: row.description,
            status,
            tokens_awarded: ZorBits::from_hundredths(row.tokens_awarded),
            submitted_at: row.submitted_at,
            approved_at: row.approved_at,
        })
    }
}

/// A row from the `notifications` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationRow {
    /// Primary key.
    pub id: Uuid,
    /// Recipient.
    pub user_id: Uuid,
    /// Message text.
    pub message: String,
    /// Kind name, stored in the `type` column.
    #[sqlx(rename = "type")]
    pub kind: String,
    /// Read flag.
    pub read: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = ApiError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let kind = NotificationKind::parse(&row.kind).ok_or_else(|| {
            ApiError::Persistence(format!("unknown notification type: {}", row.kind))
        })?;
        Ok(Self {
            id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            message: row.message,
            kind,
            read: row.read,
            created_at: row.created_at,
        })
    }
}

/// A row from the `token_history` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TokenHistoryRow {
    /// Primary key.
    pub id: Uuid,
    /// Account holder.
    pub user_id: Uuid,
    /// Signed amount in hundredths.
    pub amount: i64,
    /// Action name.
    pub action_type: String,
    /// Related submission, if any.
    pub related_id: Option<Uuid>,
    /// Entry time.
    pub created_at: DateTime<Utc>,
}

impl From<TokenHistoryRow> for TokenHistoryEntry {
    fn from(row: TokenHistoryRow) -> Self {
        Self {
            id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            amount: ZorBits::from_hundredths(row.amount),
            action: TokenAction::parse(&row.action_type),
            related_id: row.related_id,
            created_at: row.created_at,
        }
    }
}

/// A `purchases` row joined with the purchased submission's name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PurchaseRow {
    /// Primary key.
    pub id: Uuid,
    /// Buyer.
    pub buyer_id: Uuid,
    /// Purchased submission.
    pub submission_id: Uuid,
    /// Price paid in hundredths.
    pub tokens_spent: i64,
    /// Purchase time.
    pub created_at: DateTime<Utc>,
    /// Repository name from the joined submission.
    pub repo_name: Option<String>,
}

impl From<PurchaseRow> for PurchaseRecord {
    fn from(row: PurchaseRow) -> Self {
        Self {
            purchase: Purchase {
                id: row.id,
                buyer_id: UserId::from_uuid(row.buyer_id),
                submission_id: SubmissionId::from_uuid(row.submission_id),
                tokens_spent: ZorBits::from_hundredths(row.tokens_spent),
                created_at: row.created_at,
            },
            project_name: row.repo_name,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn submission_row(status: &str) -> SubmissionRow {
        SubmissionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            repo_url: "https://github.com/acme/engine".into(),
            repo_name: "engine".into(),
            description: String::new(),
            status: status.into(),
            tokens_awarded: 50,
            submitted_at: Utc::now(),
            approved_at: None,
        }
    }

    #[test]
    fn submission_row_converts() {
        let Ok(sub) = Submission::try_from(submission_row("approved")) else {
            panic!("conversion failed");
        };
        assert_eq!(sub.status, SubmissionStatus::Approved);
        assert_eq!(sub.tokens_awarded, ZorBits::from_hundredths(50));
    }

    #[test]
    fn unknown_status_is_a_persistence_error() {
        assert!(matches!(
            Submission::try_from(submission_row("archived")),
            Err(ApiError::Persistence(_))
        ));
    }

    #[test]
    fn unknown_template_is_a_persistence_error() {
        let row = UserRow {
            id: Uuid::new_v4(),
            email: "a@b.c".into(),
            password_hash: "h".into(),
            name: "A".into(),
            username: "a".into(),
            avatar_url: None,
            github_username: None,
            token_balance: 0,
            selected_template: "brutalist".into(),
            is_admin: false,
            email_notifications: true,
            project_notifications: true,
            created_at: Utc::now(),
        };
        assert!(matches!(User::try_from(row), Err(ApiError::Persistence(_))));
    }
}
