//! Dashboard overview DTO.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Notification, Submission, SubmissionStatus, WeeklyStatus, ZorBits};
use crate::service::DashboardOverview;

/// Submission counts and earnings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    /// Approved submissions.
    pub total_approved_projects: usize,
    /// Submissions awaiting review.
    pub pending_reviews: usize,
    /// Rejected submissions.
    pub rejected_submissions: usize,
    /// ZorBits earned from approvals.
    #[schema(value_type = f64)]
    pub total_zorbits_earned: ZorBits,
}

/// A recent submission on the dashboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecentSubmissionDto {
    /// Submission id.
    pub id: Uuid,
    /// Repository name.
    pub project_name: String,
    /// Submission time.
    pub submission_date: DateTime<Utc>,
    /// Review state.
    pub status: SubmissionStatus,
    /// Award, zero unless approved.
    #[schema(value_type = f64)]
    pub tokens_earned: ZorBits,
}

impl From<Submission> for RecentSubmissionDto {
    fn from(s: Submission) -> Self {
        Self {
            id: s.id.into(),
            tokens_earned: s.earned(),
            project_name: s.repo_name,
            submission_date: s.submitted_at,
            status: s.status,
        }
    }
}

/// Where the caller stands against the weekly deadline.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeeklyDeadline {
    /// The upcoming Sunday.
    pub next_deadline: NaiveDate,
    /// `On track` or `Not submitted`.
    pub current_status: WeeklyStatus,
}

/// Name section of the dashboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardUser {
    /// Public username.
    pub username: String,
    /// Display name.
    pub name: String,
}

/// Response body for `GET /api/dashboard/overview`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardResponse {
    /// Counts and earnings.
    pub stats: DashboardStats,
    /// Five newest submissions.
    pub recent_submissions: Vec<RecentSubmissionDto>,
    /// Weekly deadline status.
    pub weekly_deadline: WeeklyDeadline,
    /// Three newest notifications.
    pub notifications: Vec<Notification>,
    /// The caller.
    pub user: DashboardUser,
}

impl From<DashboardOverview> for DashboardResponse {
    fn from(o: DashboardOverview) -> Self {
        Self {
            stats: DashboardStats {
                total_approved_projects: o.approved,
                pending_reviews: o.pending,
                rejected_submissions: o.rejected,
                total_zorbits_earned: o.total_earned,
            },
            recent_submissions: o.recent_submissions.into_iter().map(Into::into).collect(),
            weekly_deadline: WeeklyDeadline {
                next_deadline: o.next_deadline,
                current_status: o.weekly_status,
            },
            notifications: o.notifications,
            user: DashboardUser {
                username: o.user.username,
                name: o.user.name,
            },
        }
    }
}
