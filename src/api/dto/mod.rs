//! Data Transfer Objects for REST request/response serialization.
//!
//! ZorBit amounts are serialized as JSON numbers with at most two decimal
//! places. Request fields are optional at the serde level so that missing
//! fields produce the endpoint's own 400 message.

pub mod admin_dto;
pub mod auth_dto;
pub mod common_dto;
pub mod dashboard_dto;
pub mod notification_dto;
pub mod portfolio_dto;
pub mod settings_dto;
pub mod showcase_dto;
pub mod submission_dto;
pub mod token_dto;

pub use admin_dto::*;
pub use auth_dto::*;
pub use common_dto::*;
pub use dashboard_dto::*;
pub use notification_dto::*;
pub use portfolio_dto::*;
pub use settings_dto::*;
pub use showcase_dto::*;
pub use submission_dto::*;
pub use token_dto::*;
