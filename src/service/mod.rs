//! Service layer: business logic orchestration.
//!
//! Each service holds an `Arc<dyn Store>` and turns a handler's request
//! into domain operations:
//!
//! | Service                | Owns                                          |
//! |------------------------|-----------------------------------------------|
//! | [`AccountService`]     | registration, login, tokens, settings         |
//! | [`SubmissionService`]  | weekly submissions, admin review              |
//! | [`PortfolioService`]   | approved projects, visibility, templates      |
//! | [`MarketplaceService`] | showcase listings, purchases                  |
//! | [`ActivityService`]    | dashboard, notifications, ZorBit ledger       |

pub mod account_service;
pub mod activity_service;
pub mod marketplace_service;
pub mod portfolio_service;
pub mod submission_service;

pub use account_service::{AccountService, AccountSettings, NewAccount, Session};
pub use activity_service::{ActivityService, DashboardOverview};
pub use marketplace_service::{MarketplaceService, ShowcaseItem};
pub use portfolio_service::{PortfolioProject, PortfolioService, PublicPortfolio};
pub use submission_service::SubmissionService;
