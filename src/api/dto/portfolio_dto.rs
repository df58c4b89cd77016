//! Portfolio DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::present;
use crate::domain::{PortfolioTemplate, Submission, SubmissionId, TemplateInfo, ZorBits};
use crate::error::ApiError;
use crate::service::{PortfolioProject, PublicPortfolio};

/// An approved project on the owner's portfolio page.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PortfolioProjectDto {
    /// Submission id.
    pub id: Uuid,
    /// Repository name.
    pub name: String,
    /// Owner's description.
    pub description: String,
    /// Repository URL.
    pub repo_url: String,
    /// ZorBits earned by the project.
    #[schema(value_type = f64)]
    pub tokens_awarded: ZorBits,
    /// Shown on the public page.
    pub visible: bool,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
}

impl From<PortfolioProject> for PortfolioProjectDto {
    fn from(p: PortfolioProject) -> Self {
        let s = p.submission;
        Self {
            id: s.id.into(),
            name: s.repo_name,
            description: s.description,
            repo_url: s.repo_url,
            tokens_awarded: s.tokens_awarded,
            visible: p.visible,
            approved_at: s.approved_at,
        }
    }
}

/// Request body for `PATCH /api/portfolio/visibility`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct VisibilityRequest {
    /// Submission to show or hide.
    #[serde(default)]
    pub submission_id: Option<Uuid>,
    /// New visibility.
    #[serde(default)]
    pub visible: Option<bool>,
}

impl VisibilityRequest {
    /// Returns `(submission_id, visible)` when both are present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when either is missing.
    pub fn parts(&self) -> Result<(SubmissionId, bool), ApiError> {
        match (self.submission_id, self.visible) {
            (Some(id), Some(visible)) => Ok((id.into(), visible)),
            _ => Err(ApiError::invalid("submission_id and visible are required")),
        }
    }
}

/// Request body for `PATCH /api/portfolio/template`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TemplateRequest {
    /// Catalog key.
    #[serde(default)]
    pub template_id: Option<String>,
}

impl TemplateRequest {
    /// The requested key.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when it is missing.
    pub fn key(&self) -> Result<&str, ApiError> {
        present(self.template_id.as_deref())
            .ok_or_else(|| ApiError::invalid("template_id is required"))
    }
}

/// Response body for `PATCH /api/portfolio/template`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TemplateResponse {
    /// The template now in use.
    pub selected_template: PortfolioTemplate,
}

/// Query for `GET /api/portfolio/public/{username}`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PublicPortfolioQuery {
    /// Template to render with; defaults to `minimal`.
    pub template: Option<String>,
}

/// Owner section of a public portfolio.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PortfolioOwnerDto {
    /// Public username.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
}

/// A project on a public portfolio.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicProjectDto {
    /// Submission id.
    pub id: Uuid,
    /// Repository name.
    pub name: String,
    /// Owner's description.
    pub description: String,
    /// Repository URL.
    pub repo_url: String,
    /// ZorBits earned by the project.
    #[schema(value_type = f64)]
    pub tokens_awarded: ZorBits,
}

impl From<Submission> for PublicProjectDto {
    fn from(s: Submission) -> Self {
        Self {
            id: s.id.into(),
            name: s.repo_name,
            description: s.description,
            repo_url: s.repo_url,
            tokens_awarded: s.tokens_awarded,
        }
    }
}

/// Response body for `GET /api/portfolio/public/{username}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicPortfolioResponse {
    /// Portfolio owner.
    pub user: PortfolioOwnerDto,
    /// Visible approved projects.
    pub projects: Vec<PublicProjectDto>,
    /// Template the page renders with.
    pub template: TemplateInfo,
}

impl From<PublicPortfolio> for PublicPortfolioResponse {
    fn from(page: PublicPortfolio) -> Self {
        Self {
            user: PortfolioOwnerDto {
                username: page.owner.username,
                name: page.owner.name,
                avatar_url: page.owner.avatar_url,
            },
            projects: page.projects.into_iter().map(Into::into).collect(),
            template: page.template,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_needs_both_fields() {
        let req = VisibilityRequest {
            submission_id: Some(Uuid::new_v4()),
            visible: None,
        };
        assert!(req.parts().is_err());
        let req = VisibilityRequest {
            visible: Some(false),
            ..req
        };
        assert!(matches!(req.parts(), Ok((_, false))));
    }

    #[test]
    fn template_key_is_required() {
        assert!(TemplateRequest::default().key().is_err());
    }
}
