//! In-app notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{SubmissionStatus, UserId, ZorBits};

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Review progress of one of the user's submissions.
    Submission,
    /// One of the user's projects was bought.
    Purchase,
}

impl NotificationKind {
    /// Returns the storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submission => "submission",
            Self::Purchase => "purchase",
        }
    }

    /// Parses a storage name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "submission" => Some(Self::Submission),
            "purchase" => Some(Self::Purchase),
            _ => None,
        }
    }
}

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Notification {
    /// Notification identifier.
    pub id: uuid::Uuid,
    /// Recipient.
    #[schema(value_type = uuid::Uuid)]
    pub user_id: UserId,
    /// Message text.
    pub message: String,
    /// Category.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Whether the recipient has read it.
    pub read: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates an unread notification stamped `now`.
    #[must_use]
    pub fn new(
        user_id: UserId,
        kind: NotificationKind,
        message: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            user_id,
            message,
            kind,
            read: false,
            created_at: now,
        }
    }

    /// Sent when a new submission enters the review queue.
    #[must_use]
    pub fn submission_received(user_id: UserId, repo_name: &str, now: DateTime<Utc>) -> Self {
        Self::new(
            user_id,
            NotificationKind::Submission,
            format!("Your submission \"{repo_name}\" is pending review"),
            now,
        )
    }

    /// Sent when an administrator changes a submission's status.
    #[must_use]
    pub fn review_outcome(
        user_id: UserId,
        repo_name: &str,
        status: SubmissionStatus,
        awarded: ZorBits,
        now: DateTime<Utc>,
    ) -> Self {
        let message = match status {
            SubmissionStatus::Approved => format!(
                "Your project \"{repo_name}\" was approved! You earned {awarded} ZorBits."
            ),
            SubmissionStatus::Rejected => format!(
                "Your project \"{repo_name}\" was rejected. Please review the feedback and try again."
            ),
            SubmissionStatus::Pending => {
                format!("Your project \"{repo_name}\" is under review.")
            }
        };
        Self::new(user_id, NotificationKind::Submission, message, now)
    }

    /// Sent to a project owner when someone buys the project.
    #[must_use]
    pub fn project_purchased(
        owner_id: UserId,
        repo_name: &str,
        price: ZorBits,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(
            owner_id,
            NotificationKind::Purchase,
            format!("Your project \"{repo_name}\" was purchased for {price} ZorBits!"),
            now,
        )
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn approval_message_includes_award() {
        let n = Notification::review_outcome(
            UserId::new(),
            "engine",
            SubmissionStatus::Approved,
            ZorBits::from_hundredths(50),
            Utc::now(),
        );
        assert_eq!(
            n.message,
            "Your project \"engine\" was approved! You earned 0.5 ZorBits."
        );
        assert!(!n.read);
        assert_eq!(n.kind, NotificationKind::Submission);
    }

    #[test]
    fn kind_serializes_as_type() {
        let n = Notification::project_purchased(
            UserId::new(),
            "engine",
            ZorBits::whole(120),
            Utc::now(),
        );
        let Ok(json) = serde_json::to_value(&n) else {
            panic!("serialization failed");
        };
        assert_eq!(json["type"], "purchase");
    }
}
