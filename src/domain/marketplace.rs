//! Showcase listings and purchases.

use chrono::{DateTime, Utc};

use super::{Submission, SubmissionId, User, UserId, ZorBits};

/// Cheapest listing price, in whole ZorBits.
pub const MIN_LISTING_PRICE: i64 = 100;

/// Width of the listing price range, in whole ZorBits.
pub const LISTING_PRICE_SPREAD: u128 = 200;

/// Maximum number of tags derived from a description.
pub const MAX_TAGS: usize = 3;

/// Price of an approved project in the showcase.
///
/// Derived from the submission id so every listing shows the same price
/// on every request, within `100..=299` ZorBits.
#[must_use]
pub fn listing_price(id: SubmissionId) -> ZorBits {
    let offset = (id.as_uuid().as_u128() % LISTING_PRICE_SPREAD) as i64;
    ZorBits::whole(MIN_LISTING_PRICE + offset)
}

/// Splits a comma-separated description into at most three tags.
#[must_use]
pub fn tags_from_description(description: &str) -> Vec<String> {
    description
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .take(MAX_TAGS)
        .map(str::to_string)
        .collect()
}

/// An approved submission joined with its owner, as listed in the showcase.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    /// The approved submission.
    pub submission: Submission,
    /// The submission's owner, if still registered.
    pub owner: Option<User>,
}

impl Listing {
    /// Name credited for the project.
    #[must_use]
    pub fn contributor(&self) -> String {
        self.owner
            .as_ref()
            .map_or_else(|| "Unknown".to_string(), |u| u.display_name().to_string())
    }
}

/// A completed purchase of a showcase project.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    /// Purchase identifier.
    pub id: uuid::Uuid,
    /// Buyer.
    pub buyer_id: UserId,
    /// Purchased submission.
    pub submission_id: SubmissionId,
    /// Price paid.
    pub tokens_spent: ZorBits,
    /// When the purchase happened.
    pub created_at: DateTime<Utc>,
}

/// Everything needed to execute a purchase atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseOrder {
    /// Buyer.
    pub buyer_id: UserId,
    /// Project being bought.
    pub submission_id: SubmissionId,
    /// Owner to notify.
    pub owner_id: UserId,
    /// Project name used in the owner's notification.
    pub repo_name: String,
    /// Price to debit.
    pub price: ZorBits,
    /// Time stamped on every row written.
    pub now: DateTime<Utc>,
}

/// Outcome of a successful purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseReceipt {
    /// The recorded purchase.
    pub purchase: Purchase,
    /// Buyer's balance after the debit.
    pub new_balance: ZorBits,
}

/// A purchase joined with the bought project's name.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRecord {
    /// The purchase.
    pub purchase: Purchase,
    /// Repository name, if the submission still exists.
    pub project_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_price_is_stable_and_in_range() {
        for _ in 0..64 {
            let id = SubmissionId::new();
            let price = listing_price(id);
            assert_eq!(price, listing_price(id));
            assert!(price >= ZorBits::whole(100));
            assert!(price <= ZorBits::whole(299));
        }
    }

    #[test]
    fn tags_are_trimmed_and_capped() {
        assert_eq!(
            tags_from_description("rust, cli ,, wasm, extra"),
            vec!["rust", "cli", "wasm"]
        );
        assert!(tags_from_description("").is_empty());
    }
}
