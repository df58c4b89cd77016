//! Portfolio service: approved projects, visibility overrides, templates.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{
    PortfolioTemplate, PortfolioVisibility, Submission, SubmissionId, SubmissionStatus,
    TemplateInfo, User, UserId, UserUpdate,
};
use crate::error::ApiError;
use crate::persistence::Store;

/// An approved project with its portfolio visibility.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioProject {
    /// The approved submission.
    pub submission: Submission,
    /// Whether it shows on the public portfolio.
    pub visible: bool,
}

/// A public portfolio page.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicPortfolio {
    /// Portfolio owner.
    pub owner: User,
    /// Approved projects not hidden by the owner.
    pub projects: Vec<Submission>,
    /// Template the page is rendered with.
    pub template: TemplateInfo,
}

/// Builds portfolios from approved submissions.
#[derive(Debug, Clone)]
pub struct PortfolioService {
    store: Arc<dyn Store>,
}

impl PortfolioService {
    /// Creates a new `PortfolioService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The template catalog.
    #[must_use]
    pub fn templates(&self) -> Vec<TemplateInfo> {
        PortfolioTemplate::ALL.into_iter().map(PortfolioTemplate::info).collect()
    }

    async fn approved_with_visibility(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PortfolioProject>, ApiError> {
        let overrides: HashMap<SubmissionId, bool> = self
            .store
            .visibility_overrides(user_id)
            .await?
            .into_iter()
            .map(|v| (v.submission_id, v.visible))
            .collect();
        Ok(self
            .store
            .submissions_by_user(user_id)
            .await?
            .into_iter()
            .filter(|s| s.status == SubmissionStatus::Approved)
            .map(|submission| PortfolioProject {
                visible: overrides.get(&submission.id).copied().unwrap_or(true),
                submission,
            })
            .collect())
    }

    /// The caller's approved projects; visible unless overridden.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    pub async fn projects(&self, user_id: UserId) -> Result<Vec<PortfolioProject>, ApiError> {
        self.approved_with_visibility(user_id).await
    }

    /// Shows or hides one of the caller's submissions.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] when the submission is missing or
    /// belongs to someone else.
    pub async fn set_visibility(
        &self,
        user_id: UserId,
        submission_id: SubmissionId,
        visible: bool,
    ) -> Result<PortfolioVisibility, ApiError> {
        let owned = self
            .store
            .submission(submission_id)
            .await?
            .is_some_and(|s| s.user_id == user_id);
        if !owned {
            return Err(ApiError::forbidden(
                "Submission not found or does not belong to you",
            ));
        }
        let saved = self
            .store
            .upsert_visibility(&PortfolioVisibility {
                user_id,
                submission_id,
                visible,
            })
            .await?;
        tracing::debug!(%user_id, %submission_id, visible, "portfolio visibility changed");
        Ok(saved)
    }

    /// Selects the caller's portfolio template.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for a key outside the catalog.
    pub async fn select_template(
        &self,
        user_id: UserId,
        key: &str,
    ) -> Result<PortfolioTemplate, ApiError> {
        let template = key
            .parse::<PortfolioTemplate>()
            .map_err(|_| ApiError::invalid(format!("Unknown template: {key}")))?;
        let user = self
            .store
            .update_user(
                user_id,
                &UserUpdate {
                    selected_template: Some(template),
                    ..UserUpdate::default()
                },
            )
            .await?
            .ok_or(ApiError::UserNotFound)?;
        tracing::info!(%user_id, template = %template, "portfolio template selected");
        Ok(user.selected_template)
    }

    /// The public portfolio of `username`.
    ///
    /// `template` defaults to `minimal`; keys outside the catalog get a
    /// generated entry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PortfolioNotFound`] for an unknown username.
    pub async fn public(
        &self,
        username: &str,
        template: Option<&str>,
    ) -> Result<PublicPortfolio, ApiError> {
        let owner = self
            .store
            .user_by_username(username)
            .await?
            .ok_or_else(|| ApiError::PortfolioNotFound(username.to_string()))?;
        let projects = self
            .approved_with_visibility(owner.id)
            .await?
            .into_iter()
            .filter(|p| p.visible)
            .map(|p| p.submission)
            .collect();
        let key = template
            .filter(|t| !t.is_empty())
            .unwrap_or(PortfolioTemplate::default().key());
        Ok(PublicPortfolio {
            owner,
            projects,
            template: TemplateInfo::resolve(key),
        })
    }
}
