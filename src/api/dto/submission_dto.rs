//! Submission DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::present;
use crate::domain::{Submission, SubmissionStatus};
use crate::error::ApiError;

/// Request body for `POST /api/submissions`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateSubmissionRequest {
    /// GitHub repository URL.
    #[serde(default)]
    pub repo_url: Option<String>,
    /// Optional description; comma-separated parts become showcase tags.
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateSubmissionRequest {
    /// The repository URL, when present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when it is missing or blank.
    pub fn repo_url(&self) -> Result<&str, ApiError> {
        present(self.repo_url.as_deref())
            .ok_or_else(|| ApiError::invalid("Repository URL is required"))
    }
}

/// Response body for `POST /api/submissions`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionCreatedResponse {
    /// Submission id.
    pub id: Uuid,
    /// Repository URL.
    pub repo_url: String,
    /// Repository name.
    pub repo_name: String,
    /// Always `pending`.
    pub status: SubmissionStatus,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
}

impl From<Submission> for SubmissionCreatedResponse {
    fn from(s: Submission) -> Self {
        Self {
            id: s.id.into(),
            repo_url: s.repo_url,
            repo_name: s.repo_name,
            status: s.status,
            submitted_at: s.submitted_at,
        }
    }
}
