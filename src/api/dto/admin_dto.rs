//! Administrator DTOs: review queue, review decisions, manual awards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::present;
use crate::domain::{Listing, Submission, SubmissionStatus, User, ZorBits};
use crate::error::ApiError;

const INVALID_STATUS: &str = "Invalid status. Must be approved, rejected, or pending";

fn parse_status(raw: &str) -> Result<SubmissionStatus, ApiError> {
    raw.parse().map_err(|_| ApiError::invalid(INVALID_STATUS))
}

/// Query for `GET /api/admin/submissions`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusQuery {
    /// `pending`, `approved` or `rejected`.
    pub status: Option<String>,
}

impl StatusQuery {
    /// The status filter, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an unknown status.
    pub fn filter(&self) -> Result<Option<SubmissionStatus>, ApiError> {
        present(self.status.as_deref()).map(parse_status).transpose()
    }
}

/// Owner summary in the review queue.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OwnerSummary {
    /// Display name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Public username.
    pub username: String,
}

/// A submission in the review queue.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminSubmissionDto {
    /// Submission id.
    pub id: Uuid,
    /// Owner id.
    pub user_id: Uuid,
    /// Owner, when still registered.
    pub user: Option<OwnerSummary>,
    /// Repository name.
    pub repo_name: String,
    /// Repository URL.
    pub repo_url: String,
    /// Owner's description.
    pub description: String,
    /// Review state.
    pub status: SubmissionStatus,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
}

impl From<Listing> for AdminSubmissionDto {
    fn from(listing: Listing) -> Self {
        let s = listing.submission;
        Self {
            id: s.id.into(),
            user_id: s.user_id.into(),
            user: listing.owner.map(|u| OwnerSummary {
                name: u.name,
                email: u.email,
                username: u.username,
            }),
            repo_name: s.repo_name,
            repo_url: s.repo_url,
            description: s.description,
            status: s.status,
            submitted_at: s.submitted_at,
            approved_at: s.approved_at,
        }
    }
}

/// Full owner profile on the review detail page.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OwnerProfile {
    /// User id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Public username.
    pub username: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// GitHub account.
    pub github_username: Option<String>,
    /// Current balance.
    #[schema(value_type = f64)]
    pub token_balance: ZorBits,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl From<User> for OwnerProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id.into(),
            name: u.name,
            email: u.email,
            username: u.username,
            avatar_url: u.avatar_url,
            github_username: u.github_username,
            token_balance: u.token_balance,
            created_at: u.created_at,
        }
    }
}

/// Response body for `GET /api/admin/submissions/{id}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminSubmissionDetail {
    /// The submission.
    #[serde(flatten)]
    pub submission: Submission,
    /// Owner profile, when still registered.
    pub user: Option<OwnerProfile>,
}

impl From<Listing> for AdminSubmissionDetail {
    fn from(listing: Listing) -> Self {
        Self {
            submission: listing.submission,
            user: listing.owner.map(Into::into),
        }
    }
}

/// Request body for `PATCH /api/admin/submissions/{id}/status`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ReviewRequest {
    /// `approved`, `rejected` or `pending`.
    #[serde(default)]
    pub status: Option<String>,
    /// Explicit award for an approval.
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub tokens_awarded: Option<ZorBits>,
}

impl ReviewRequest {
    /// The requested status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when missing or unknown.
    pub fn status(&self) -> Result<SubmissionStatus, ApiError> {
        present(self.status.as_deref())
            .ok_or_else(|| ApiError::invalid(INVALID_STATUS))
            .and_then(parse_status)
    }
}

/// Response body for `PATCH /api/admin/submissions/{id}/status`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewResponse {
    /// `Submission <status>`.
    pub message: String,
    /// The reviewed submission.
    pub submission: Submission,
}

impl From<Submission> for ReviewResponse {
    fn from(submission: Submission) -> Self {
        Self {
            message: format!("Submission {}", submission.status),
            submission,
        }
    }
}

/// Request body for `POST /api/admin/users/{id}/tokens`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AwardRequest {
    /// Positive amount to credit.
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub amount: Option<ZorBits>,
}

impl AwardRequest {
    /// The amount to credit.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when it is missing.
    pub fn amount(&self) -> Result<ZorBits, ApiError> {
        self.amount.ok_or_else(|| ApiError::invalid("amount is required"))
    }
}

/// Response body for `POST /api/admin/users/{id}/tokens`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AwardResponse {
    /// Confirmation.
    pub message: String,
    /// Credited user.
    pub user_id: Uuid,
    /// Balance after the credit.
    #[schema(value_type = f64)]
    pub new_balance: ZorBits,
}
