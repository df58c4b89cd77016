//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::persistence::Store;
use crate::service::{
    AccountService, AccountSettings, ActivityService, MarketplaceService, PortfolioService,
    SubmissionService,
};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Registration, login, token checks, settings.
    pub accounts: Arc<AccountService>,
    /// Weekly submissions and reviews.
    pub submissions: Arc<SubmissionService>,
    /// Portfolios and templates.
    pub portfolio: Arc<PortfolioService>,
    /// Showcase listings and purchases.
    pub marketplace: Arc<MarketplaceService>,
    /// Dashboard, notifications, balance history.
    pub activity: Arc<ActivityService>,
}

impl AppState {
    /// Wires every service to one store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, jwt: JwtManager, settings: AccountSettings) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(Arc::clone(&store), jwt, settings)),
            submissions: Arc::new(SubmissionService::new(Arc::clone(&store))),
            portfolio: Arc::new(PortfolioService::new(Arc::clone(&store))),
            marketplace: Arc::new(MarketplaceService::new(Arc::clone(&store))),
            activity: Arc::new(ActivityService::new(store)),
        }
    }
}
