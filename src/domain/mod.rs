//! Domain layer: identifiers, ZorBit amounts, and the business rules.
//!
//! Everything here is plain data plus pure functions of `now`: the weekly
//! submission window, the review award tiers, the showcase price, and the
//! portfolio template catalog. Services combine these with a store.

pub mod ids;
pub mod ledger;
pub mod marketplace;
pub mod notification;
pub mod portfolio;
pub mod submission;
pub mod user;
pub mod zorbits;

pub use ids::{SubmissionId, UserId};
pub use ledger::{TokenAction, TokenHistoryEntry};
pub use marketplace::{Listing, Purchase, PurchaseOrder, PurchaseReceipt, PurchaseRecord};
pub use notification::{Notification, NotificationKind};
pub use portfolio::{PortfolioTemplate, PortfolioVisibility, TemplateInfo};
pub use submission::{
    GithubRepo, Review, ReviewConflict, Submission, SubmissionStatus, WeeklyStatus,
};
pub use user::{User, UserUpdate};
pub use zorbits::ZorBits;
