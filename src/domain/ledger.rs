//! ZorBit balance history.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{UserId, ZorBits};

/// Why a balance changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenAction {
    /// Credit for an approved submission.
    Approval,
    /// Debit for a showcase purchase.
    Purchase,
    /// Marker for a rejected submission.
    Reject,
    /// Manual credit.
    Award,
    /// Any other action recorded by older data.
    Other(String),
}

impl TokenAction {
    /// Returns the storage name of the action.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Approval => "approval",
            Self::Purchase => "purchase",
            Self::Reject => "reject",
            Self::Award => "award",
            Self::Other(s) => s,
        }
    }

    /// Parses a storage name; unknown names are kept verbatim.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "approval" => Self::Approval,
            "purchase" => Self::Purchase,
            "reject" => Self::Reject,
            "award" => Self::Award,
            other => Self::Other(other.to_string()),
        }
    }

    /// Human-readable description of a history row.
    #[must_use]
    pub fn describe(&self, amount: ZorBits) -> String {
        let sign = if amount.hundredths() >= 0 { "+" } else { "" };
        match self {
            Self::Approval => format!("Submission approved: {sign}{amount} ZorBits"),
            Self::Purchase => format!("Project purchased: {sign}{amount} ZorBits"),
            Self::Reject => "Submission rejected".to_string(),
            Self::Award => format!("Tokens awarded: {sign}{amount} ZorBits"),
            Self::Other(action) => format!("{action}: {sign}{amount} ZorBits"),
        }
    }
}

impl fmt::Display for TokenAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TokenAction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One signed change to a user's balance.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenHistoryEntry {
    /// Row identifier.
    pub id: uuid::Uuid,
    /// Whose balance changed.
    pub user_id: UserId,
    /// Signed delta.
    pub amount: ZorBits,
    /// Reason for the change.
    pub action: TokenAction,
    /// Entity that caused the change (submission id).
    pub related_id: Option<uuid::Uuid>,
    /// When the change happened.
    pub created_at: DateTime<Utc>,
}

impl TokenHistoryEntry {
    /// Creates a new history row stamped `now`.
    #[must_use]
    pub fn new(
        user_id: UserId,
        amount: ZorBits,
        action: TokenAction,
        related_id: Option<uuid::Uuid>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            user_id,
            amount,
            action,
            related_id,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_known_actions() {
        assert_eq!(
            TokenAction::Approval.describe(ZorBits::whole(1)),
            "Submission approved: +1 ZorBits"
        );
        assert_eq!(
            TokenAction::Purchase.describe(ZorBits::whole(-150)),
            "Project purchased: -150 ZorBits"
        );
        assert_eq!(TokenAction::Reject.describe(ZorBits::ZERO), "Submission rejected");
    }

    #[test]
    fn unknown_actions_round_trip() {
        let action = TokenAction::parse("bonus");
        assert_eq!(action.as_str(), "bonus");
        assert_eq!(
            action.describe(ZorBits::from_hundredths(50)),
            "bonus: +0.5 ZorBits"
        );
    }
}
