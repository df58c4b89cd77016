//! Project submissions and the weekly review cadence.
//!
//! A user may submit at most one GitHub repository per rolling seven-day
//! window. Approval credits ZorBits according to how long the review took.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{SubmissionId, UserId, ZorBits};

/// Length of the submission cadence window, in days.
pub const SUBMISSION_WINDOW_DAYS: i64 = 7;

/// Reviews completed within this many whole days earn the full award.
pub const PROMPT_REVIEW_DAYS: i64 = 7;

/// Review state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Waiting for an administrator.
    Pending,
    /// Accepted; visible on portfolios and in the showcase.
    Approved,
    /// Declined by an administrator.
    Rejected,
}

impl SubmissionStatus {
    /// Returns the lowercase wire/storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known [`SubmissionStatus`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown submission status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for SubmissionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A submitted repository and its review outcome.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Submission {
    /// Submission identifier.
    #[schema(value_type = uuid::Uuid)]
    pub id: SubmissionId,
    /// Owner of the submission.
    #[schema(value_type = uuid::Uuid)]
    pub user_id: UserId,
    /// Repository URL as submitted.
    pub repo_url: String,
    /// Repository name parsed from the URL.
    pub repo_name: String,
    /// Free-text description supplied by the owner.
    pub description: String,
    /// Current review state.
    pub status: SubmissionStatus,
    /// ZorBits credited on approval.
    #[schema(value_type = f64)]
    pub tokens_awarded: ZorBits,
    /// When the submission was made.
    pub submitted_at: DateTime<Utc>,
    /// When the submission was approved, if it was.
    pub approved_at: Option<DateTime<Utc>>,
}

impl Submission {
    /// Creates a fresh pending submission.
    #[must_use]
    pub fn pending(
        user_id: UserId,
        repo: GithubRepo,
        repo_url: String,
        description: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SubmissionId::new(),
            user_id,
            repo_url,
            repo_name: repo.name,
            description,
            status: SubmissionStatus::Pending,
            tokens_awarded: ZorBits::ZERO,
            submitted_at: now,
            approved_at: None,
        }
    }

    /// ZorBits this submission counts towards the owner's earnings.
    #[must_use]
    pub fn earned(&self) -> ZorBits {
        if self.status == SubmissionStatus::Approved {
            self.tokens_awarded
        } else {
            ZorBits::ZERO
        }
    }
}

/// An administrator's decision on a submission, applied atomically with
/// the owner's credit and notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    /// Submission under review.
    pub submission_id: SubmissionId,
    /// New status.
    pub status: SubmissionStatus,
    /// ZorBits to credit; only non-zero for approvals.
    pub award: ZorBits,
    /// Review time; becomes `approved_at` for approvals.
    pub reviewed_at: DateTime<Utc>,
    /// Message sent to the owner.
    pub notification: super::Notification,
}

impl Review {
    /// Applies the decision to a submission in place.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewConflict`] when approving a submission that is
    /// already approved; a credit is never paid twice. Rejecting or
    /// resetting an approved submission clears its award.
    pub fn apply_to(&self, submission: &mut Submission) -> Result<(), ReviewConflict> {
        if self.status == SubmissionStatus::Approved
            && submission.status == SubmissionStatus::Approved
        {
            return Err(ReviewConflict);
        }
        submission.status = self.status;
        if self.status == SubmissionStatus::Approved {
            submission.tokens_awarded = self.award;
            submission.approved_at = Some(self.reviewed_at);
        } else {
            submission.tokens_awarded = ZorBits::ZERO;
            submission.approved_at = None;
        }
        Ok(())
    }
}

/// Error returned when approving a submission that is already approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Submission is already approved")]
pub struct ReviewConflict;

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubRepo {
    /// Account or organisation owning the repository.
    pub owner: String,
    /// Repository name without a trailing `.git`.
    pub name: String,
}

/// Extracts `<owner>/<repo>` from anything containing `github.com/<owner>/<repo>`.
///
/// Returns `None` when either segment is missing or empty.
#[must_use]
pub fn parse_github_repo(url: &str) -> Option<GithubRepo> {
    let (_, rest) = url.split_once("github.com/")?;
    let mut segments = rest.split('/');
    let owner = segments.next().filter(|s| !s.is_empty())?;
    let raw_name = segments.next().filter(|s| !s.is_empty())?;
    let raw_name = raw_name
        .split(['?', '#'])
        .next()
        .filter(|s| !s.is_empty())?;
    let name = raw_name.strip_suffix(".git").unwrap_or(raw_name);
    if name.is_empty() {
        return None;
    }
    Some(GithubRepo {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}

/// Start of the rolling window that limits a user to one submission.
#[must_use]
pub fn submission_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(SUBMISSION_WINDOW_DAYS)
}

/// Default award for an approval reviewed at `reviewed_at`.
///
/// One ZorBit when the review lands within seven whole days of submission,
/// half a ZorBit afterwards.
#[must_use]
pub fn default_award(submitted_at: DateTime<Utc>, reviewed_at: DateTime<Utc>) -> ZorBits {
    let days = (reviewed_at - submitted_at).num_days();
    if days <= PROMPT_REVIEW_DAYS {
        ZorBits::whole(1)
    } else {
        ZorBits::from_hundredths(50)
    }
}

/// The upcoming Sunday; a full week ahead when `today` is already Sunday.
#[must_use]
pub fn next_deadline(today: NaiveDate) -> NaiveDate {
    let from_sunday = i64::from(today.weekday().num_days_from_sunday());
    let days_until = match (7 - from_sunday) % 7 {
        0 => 7,
        n => n,
    };
    today + Duration::days(days_until)
}

/// Whether the user is keeping up with the weekly cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum WeeklyStatus {
    /// A submission exists inside the current window.
    #[serde(rename = "On track")]
    OnTrack,
    /// Nothing submitted inside the current window.
    #[serde(rename = "Not submitted")]
    NotSubmitted,
}

/// Computes the weekly status from a user's submissions.
#[must_use]
pub fn weekly_status(submissions: &[Submission], now: DateTime<Utc>) -> WeeklyStatus {
    let window_start = submission_window_start(now);
    if submissions.iter().any(|s| s.submitted_at >= window_start) {
        WeeklyStatus::OnTrack
    } else {
        WeeklyStatus::NotSubmitted
    }
}
