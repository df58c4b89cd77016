//! Marketplace service: the showcase of approved projects and purchases.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::marketplace::listing_price;
use crate::domain::{
    Listing, PurchaseOrder, PurchaseReceipt, PurchaseRecord, SubmissionId, SubmissionStatus,
    UserId, ZorBits,
};
use crate::error::ApiError;
use crate::persistence::Store;

/// A showcase entry as seen by one viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowcaseItem {
    /// The approved submission and its owner.
    pub listing: Listing,
    /// Price in ZorBits.
    pub price: ZorBits,
    /// Whether the viewer already bought it.
    pub purchased: bool,
    /// Whether the viewer owns it.
    pub owned: bool,
}

/// Lists approved projects and sells them for ZorBits.
#[derive(Debug, Clone)]
pub struct MarketplaceService {
    store: Arc<dyn Store>,
}

impl MarketplaceService {
    /// Creates a new `MarketplaceService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All approved projects, most recently approved first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    pub async fn showcase(&self, viewer: Option<UserId>) -> Result<Vec<ShowcaseItem>, ApiError> {
        let listings = self.store.approved_listings().await?;
        let purchased: HashSet<SubmissionId> = match viewer {
            Some(buyer) => self.store.purchased_ids(buyer).await?.into_iter().collect(),
            None => HashSet::new(),
        };
        Ok(listings
            .into_iter()
            .map(|listing| ShowcaseItem {
                price: listing_price(listing.submission.id),
                purchased: purchased.contains(&listing.submission.id),
                owned: viewer == Some(listing.submission.user_id),
                listing,
            })
            .collect())
    }

    /// Buys an approved project at its listing price.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::SubmissionNotFound`] unless the submission exists
    /// and is approved, [`ApiError::InvalidRequest`] for one's own project
    /// or a mismatched `offered` price, and the store's purchase errors.
    pub async fn buy(
        &self,
        buyer: UserId,
        submission_id: SubmissionId,
        offered: Option<ZorBits>,
    ) -> Result<PurchaseReceipt, ApiError> {
        let submission = self
            .store
            .submission(submission_id)
            .await?
            .filter(|s| s.status == SubmissionStatus::Approved)
            .ok_or(ApiError::SubmissionNotFound(Some(submission_id)))?;
        if submission.user_id == buyer {
            return Err(ApiError::invalid("You cannot purchase your own project"));
        }

        let price = listing_price(submission_id);
        if offered.is_some_and(|o| o != price) {
            return Err(ApiError::invalid(format!(
                "This project costs {price} ZorBits"
            )));
        }

        let order = PurchaseOrder {
            buyer_id: buyer,
            submission_id,
            owner_id: submission.user_id,
            repo_name: submission.repo_name,
            price,
            now: Utc::now(),
        };
        let receipt = self.store.purchase(&order).await.inspect_err(|e| {
            tracing::debug!(%buyer, %submission_id, error = %e, "purchase refused");
        })?;

        tracing::info!(
            purchase_id = %receipt.purchase.id,
            %buyer,
            %submission_id,
            %price,
            "project purchased"
        );
        Ok(receipt)
    }

    /// The buyer's purchases, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    pub async fn purchases(&self, buyer: UserId) -> Result<Vec<PurchaseRecord>, ApiError> {
        self.store.purchases_by_buyer(buyer).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Submission, User};
    use crate::service::{SubmissionService, fixtures};

    struct World {
        store: Arc<dyn Store>,
        market: MarketplaceService,
        owner: User,
        buyer: User,
        project: Submission,
    }

    async fn world(buyer_balance: i64) -> World {
        let store = fixtures::store();
        let accounts = fixtures::accounts(Arc::clone(&store));
        let submissions = SubmissionService::new(Arc::clone(&store));
        let owner = fixtures::register(&accounts, "owner@example.com").await;
        let buyer = fixtures::register(&accounts, "buyer@example.com").await;
        let Ok(project) = submissions
            .submit(owner.id, "https://github.com/owner/engine", Some("rust, cli".into()))
            .await
        else {
            panic!("submission failed");
        };
        let Ok(project) = submissions
            .review(project.id, SubmissionStatus::Approved, None)
            .await
        else {
            panic!("approval failed");
        };
        fixtures::fund(&store, buyer.id, ZorBits::whole(buyer_balance)).await;
        World {
            market: MarketplaceService::new(Arc::clone(&store)),
            store,
            owner,
            buyer,
            project,
        }
    }

    #[tokio::test]
    async fn showcase_marks_ownership_and_purchases() {
        let w = world(500).await;
        let Ok(items) = w.market.showcase(Some(w.owner.id)).await else {
            panic!("showcase failed");
        };
        assert_eq!(items.len(), 1);
        assert!(items.first().is_some_and(|i| i.owned && !i.purchased));

        let Ok(_) = w.market.buy(w.buyer.id, w.project.id, None).await else {
            panic!("purchase failed");
        };
        let Ok(items) = w.market.showcase(Some(w.buyer.id)).await else {
            panic!("showcase failed");
        };
        assert!(items.first().is_some_and(|i| !i.owned && i.purchased));

        let Ok(anonymous) = w.market.showcase(None).await else {
            panic!("showcase failed");
        };
        assert!(anonymous.first().is_some_and(|i| !i.owned && !i.purchased));
    }

    #[tokio::test]
    async fn purchase_debits_buyer_and_notifies_owner() {
        let w = world(500).await;
        let price = listing_price(w.project.id);
        let Ok(receipt) = w.market.buy(w.buyer.id, w.project.id, Some(price)).await else {
            panic!("purchase failed");
        };
        assert_eq!(receipt.new_balance, ZorBits::whole(500) - price);

        let Ok(notes) = w.store.notifications(w.owner.id, 10).await else {
            panic!("notifications failed");
        };
        assert!(notes.iter().any(|n| n.message.contains("was purchased for")));

        assert!(matches!(
            w.market.buy(w.buyer.id, w.project.id, None).await,
            Err(ApiError::AlreadyPurchased)
        ));
        let Ok(records) = w.market.purchases(w.buyer.id).await else {
            panic!("purchases failed");
        };
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn insufficient_balance_is_refused() {
        let w = world(10).await;
        assert!(matches!(
            w.market.buy(w.buyer.id, w.project.id, None).await,
            Err(ApiError::InsufficientBalance { .. })
        ));
    }

    #[tokio::test]
    async fn own_project_and_wrong_price_are_refused() {
        let w = world(500).await;
        assert!(matches!(
            w.market.buy(w.owner.id, w.project.id, None).await,
            Err(ApiError::InvalidRequest(_))
        ));
        let wrong = listing_price(w.project.id) + ZorBits::whole(1);
        assert!(matches!(
            w.market.buy(w.buyer.id, w.project.id, Some(wrong)).await,
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(matches!(
            w.market.buy(w.buyer.id, SubmissionId::new(), None).await,
            Err(ApiError::SubmissionNotFound(_))
        ));
    }
}
