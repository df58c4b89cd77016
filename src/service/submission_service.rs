//! Submission service: the weekly submission flow and admin review.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::submission::{default_award, parse_github_repo, submission_window_start};
use crate::domain::{
    Listing, Notification, Review, Submission, SubmissionId, SubmissionStatus, UserId, ZorBits,
};
use crate::error::ApiError;
use crate::persistence::Store;

/// Coordinates submissions from creation through review.
#[derive(Debug, Clone)]
pub struct SubmissionService {
    store: Arc<dyn Store>,
}

impl SubmissionService {
    /// Creates a new `SubmissionService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Submits a GitHub repository for review.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for a URL that does not name a
    /// GitHub repository and [`ApiError::WeeklyLimitReached`] when the user
    /// already submitted within the last seven days.
    pub async fn submit(
        &self,
        user_id: UserId,
        repo_url: &str,
        description: Option<String>,
    ) -> Result<Submission, ApiError> {
        let repo_url = repo_url.trim();
        let repo = parse_github_repo(repo_url)
            .ok_or_else(|| ApiError::invalid("Invalid GitHub repository URL"))?;

        let now = Utc::now();
        let submission = Submission::pending(
            user_id,
            repo,
            repo_url.to_string(),
            description.unwrap_or_default(),
            now,
        );
        self.store
            .insert_submission(&submission, submission_window_start(now))
            .await?;
        self.store
            .insert_notification(&Notification::submission_received(
                user_id,
                &submission.repo_name,
                now,
            ))
            .await?;

        tracing::info!(
            submission_id = %submission.id,
            %user_id,
            repo = %submission.repo_name,
            "project submitted"
        );
        Ok(submission)
    }

    /// The caller's submissions, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    pub async fn mine(&self, user_id: UserId) -> Result<Vec<Submission>, ApiError> {
        self.store.submissions_by_user(user_id).await
    }

    /// A submission visible to its owner and to administrators.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::SubmissionNotFound`] when missing and
    /// [`ApiError::Forbidden`] when the caller is neither owner nor admin.
    pub async fn get_for(&self, caller: UserId, id: SubmissionId) -> Result<Submission, ApiError> {
        let submission = self
            .store
            .submission(id)
            .await?
            .ok_or(ApiError::SubmissionNotFound(Some(id)))?;
        if submission.user_id != caller {
            let is_admin = self
                .store
                .user_by_id(caller)
                .await?
                .is_some_and(|u| u.is_admin);
            if !is_admin {
                return Err(ApiError::forbidden("Forbidden"));
            }
        }
        Ok(submission)
    }

    /// Every submission with its owner, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    pub async fn review_queue(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<Listing>, ApiError> {
        self.store.submissions_with_owner(status).await
    }

    /// One submission with its owner's profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::SubmissionNotFound`] when missing.
    pub async fn review_detail(&self, id: SubmissionId) -> Result<Listing, ApiError> {
        let submission = self
            .store
            .submission(id)
            .await?
            .ok_or(ApiError::SubmissionNotFound(Some(id)))?;
        let owner = self.store.user_by_id(submission.user_id).await?;
        Ok(Listing { submission, owner })
    }

    /// Records an administrator's decision.
    ///
    /// Approvals without a positive explicit award earn the default award
    /// for how long the review took. The status change, the owner's credit
    /// and the owner's notification are stored together.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::SubmissionNotFound`] when missing and
    /// [`ApiError::InvalidRequest`] for a negative award, an award above
    /// [`ZorBits::MAX_AWARD`], or when approving an already approved
    /// submission.
    pub async fn review(
        &self,
        id: SubmissionId,
        status: SubmissionStatus,
        explicit_award: Option<ZorBits>,
    ) -> Result<Submission, ApiError> {
        if explicit_award.is_some_and(|a| a < ZorBits::ZERO) {
            return Err(ApiError::invalid("tokens_awarded must not be negative"));
        }
        if explicit_award.is_some_and(|a| a > ZorBits::MAX_AWARD) {
            return Err(ApiError::invalid(format!(
                "tokens_awarded must not exceed {} ZorBits",
                ZorBits::MAX_AWARD
            )));
        }
        let current = self
            .store
            .submission(id)
            .await?
            .ok_or(ApiError::SubmissionNotFound(Some(id)))?;

        let now = Utc::now();
        let award = match status {
            SubmissionStatus::Approved => explicit_award
                .filter(|a| a.is_positive())
                .unwrap_or_else(|| default_award(current.submitted_at, now)),
            SubmissionStatus::Pending | SubmissionStatus::Rejected => ZorBits::ZERO,
        };
        let review = Review {
            submission_id: id,
            status,
            award,
            reviewed_at: now,
            notification: Notification::review_outcome(
                current.user_id,
                &current.repo_name,
                status,
                award,
                now,
            ),
        };
        let updated = self.store.apply_review(&review).await?;

        tracing::info!(
            submission_id = %id,
            owner = %updated.user_id,
            %status,
            %award,
            "submission reviewed"
        );
        Ok(updated)
    }
}
