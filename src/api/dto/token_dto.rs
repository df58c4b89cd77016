//! ZorBit balance and history DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{TokenHistoryEntry, ZorBits};

/// Response body for `GET /api/tokens/balance`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BalanceResponse {
    /// Current balance.
    #[schema(value_type = f64)]
    pub balance: ZorBits,
    /// Always `ZorBits`.
    pub currency: String,
}

impl From<ZorBits> for BalanceResponse {
    fn from(balance: ZorBits) -> Self {
        Self {
            balance,
            currency: "ZorBits".to_string(),
        }
    }
}

/// One balance change.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryEntryDto {
    /// Row id.
    pub id: Uuid,
    /// Signed delta.
    #[schema(value_type = f64)]
    pub amount: ZorBits,
    /// `approval`, `purchase`, `reject`, `award`, ...
    pub action_type: String,
    /// Human-readable summary.
    pub description: String,
    /// Change time.
    pub created_at: DateTime<Utc>,
    /// Submission that caused it.
    pub related_id: Option<Uuid>,
}

impl From<TokenHistoryEntry> for HistoryEntryDto {
    fn from(entry: TokenHistoryEntry) -> Self {
        Self {
            id: entry.id,
            amount: entry.amount,
            description: entry.action.describe(entry.amount),
            action_type: entry.action.as_str().to_string(),
            created_at: entry.created_at,
            related_id: entry.related_id,
        }
    }
}
