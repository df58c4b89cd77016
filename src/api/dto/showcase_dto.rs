//! Showcase marketplace DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::marketplace::tags_from_description;
use crate::domain::{PurchaseReceipt, PurchaseRecord, SubmissionId, ZorBits};
use crate::error::ApiError;
use crate::service::ShowcaseItem;

/// A project listed in the showcase.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShowcaseItemDto {
    /// Submission id.
    pub id: Uuid,
    /// Repository name.
    pub title: String,
    /// Owner's description.
    pub description: String,
    /// Owner's name, username, or `Unknown`.
    pub contributor: String,
    /// Up to three tags taken from the description.
    pub tags: Vec<String>,
    /// Listing price.
    #[schema(value_type = f64)]
    pub tokens: ZorBits,
    /// Repository URL.
    pub github_url: String,
    /// Viewer already bought it.
    pub purchased: bool,
    /// Viewer owns it.
    pub owned: bool,
}

impl From<ShowcaseItem> for ShowcaseItemDto {
    fn from(item: ShowcaseItem) -> Self {
        let contributor = item.listing.contributor();
        let s = item.listing.submission;
        Self {
            id: s.id.into(),
            tags: tags_from_description(&s.description),
            title: s.repo_name,
            description: s.description,
            contributor,
            tokens: item.price,
            github_url: s.repo_url,
            purchased: item.purchased,
            owned: item.owned,
        }
    }
}

/// Request body for `POST /api/showcase/buy`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BuyRequest {
    /// Project to buy.
    #[serde(default)]
    pub submission_id: Option<Uuid>,
    /// Expected price; must match the listing when given.
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub tokens_spent: Option<ZorBits>,
}

impl BuyRequest {
    /// The project to buy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when it is missing.
    pub fn submission_id(&self) -> Result<SubmissionId, ApiError> {
        self.submission_id
            .map(SubmissionId::from)
            .ok_or_else(|| ApiError::invalid("submission_id is required"))
    }
}

/// Response body for `POST /api/showcase/buy`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BuyResponse {
    /// Confirmation.
    pub message: String,
    /// Purchase id.
    pub purchase_id: Uuid,
    /// Buyer's balance after the debit.
    #[schema(value_type = f64)]
    pub new_balance: ZorBits,
}

impl From<PurchaseReceipt> for BuyResponse {
    fn from(receipt: PurchaseReceipt) -> Self {
        Self {
            message: "Purchase successful".to_string(),
            purchase_id: receipt.purchase.id,
            new_balance: receipt.new_balance,
        }
    }
}

/// One of the caller's purchases.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseDto {
    /// Purchase id.
    pub id: Uuid,
    /// Bought submission.
    pub submission_id: Uuid,
    /// Repository name, when the submission still exists.
    pub project_name: Option<String>,
    /// Price paid.
    #[schema(value_type = f64)]
    pub tokens_spent: ZorBits,
    /// Purchase time.
    pub purchased_at: DateTime<Utc>,
}

impl From<PurchaseRecord> for PurchaseDto {
    fn from(record: PurchaseRecord) -> Self {
        Self {
            id: record.purchase.id,
            submission_id: record.purchase.submission_id.into(),
            project_name: record.project_name,
            tokens_spent: record.purchase.tokens_spent,
            purchased_at: record.purchase.created_at,
        }
    }
}
