//! Administrator handlers: review queue, review decisions, manual awards.

use axum::extract::State;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{
    AdminSubmissionDetail, AdminSubmissionDto, AwardRequest, AwardResponse, ReviewRequest,
    ReviewResponse, StatusQuery,
};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::app_state::AppState;
use crate::auth::AdminUser;
use crate::domain::{SubmissionId, UserId};
use crate::error::{ApiError, ErrorResponse};

/// `GET /admin/submissions`: The review queue.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] for an unknown status filter.
#[utoipa::path(
    get,
    path = "/api/admin/submissions",
    tag = "Admin",
    summary = "List submissions",
    description = "All submissions with their owners, newest first, optionally filtered by status.",
    security(("bearer" = [])),
    params(StatusQuery),
    responses(
        (status = 200, description = "Submissions", body = Vec<AdminSubmissionDto>),
        (status = 400, description = "Invalid status", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
    )
)]
pub async fn list_submissions(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<StatusQuery>,
) -> Result<Json<Vec<AdminSubmissionDto>>, ApiError> {
    let listings = state.submissions.review_queue(query.filter()?).await?;
    Ok(Json(listings.into_iter().map(Into::into).collect()))
}

/// `GET /admin/submissions/{id}`: One submission with its owner.
///
/// # Errors
///
/// Returns [`ApiError::SubmissionNotFound`] when missing.
#[utoipa::path(
    get,
    path = "/api/admin/submissions/{id}",
    tag = "Admin",
    summary = "Get submission detail",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Submission UUID"),
    ),
    responses(
        (status = 200, description = "Submission detail", body = AdminSubmissionDetail),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse),
    )
)]
pub async fn get_submission(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<AdminSubmissionDetail>, ApiError> {
    let listing = state
        .submissions
        .review_detail(SubmissionId::from_uuid(id))
        .await?;
    Ok(Json(listing.into()))
}

/// `PATCH /admin/submissions/{id}/status`: Approve, reject or reset.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] for an unknown status, a negative
/// award or a repeated approval, and [`ApiError::SubmissionNotFound`].
#[utoipa::path(
    patch,
    path = "/api/admin/submissions/{id}/status",
    tag = "Admin",
    summary = "Review a submission",
    description = "Sets the review status. Approval credits the owner: the explicit award when positive, otherwise 1 ZorBit within seven days of submission and 0.5 after. Rejecting or resetting an approved submission clears its award without reversing the credit.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Submission UUID"),
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Submission reviewed", body = ReviewResponse),
        (status = 400, description = "Invalid status or submission already approved", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse),
    )
)]
pub async fn review_submission(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let status = req.status()?;
    let submission = state
        .submissions
        .review(SubmissionId::from_uuid(id), status, req.tokens_awarded)
        .await?;
    tracing::debug!(admin = %admin.id, submission_id = %id, %status, "review recorded");
    Ok(Json(submission.into()))
}

/// `POST /admin/users/{id}/tokens`: Credit ZorBits manually.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] for a missing or non-positive
/// amount and [`ApiError::UserNotFound`] for an unknown user.
#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/tokens",
    tag = "Admin",
    summary = "Award ZorBits",
    description = "Credits a positive amount to a user and records an `award` history row.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "User UUID"),
    ),
    request_body = AwardRequest,
    responses(
        (status = 200, description = "Tokens awarded", body = AwardResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn award_tokens(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AwardRequest>,
) -> Result<Json<AwardResponse>, ApiError> {
    let amount = req.amount()?;
    let new_balance = state.activity.award(UserId::from_uuid(id), amount).await?;
    tracing::debug!(admin = %admin.id, user_id = %id, %amount, "manual award");
    Ok(Json(AwardResponse {
        message: "Tokens awarded".to_string(),
        user_id: id,
        new_balance,
    }))
}

/// Administrator routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/submissions", get(list_submissions))
        .route("/admin/submissions/{id}", get(get_submission))
        .route("/admin/submissions/{id}/status", patch(review_submission))
        .route("/admin/users/{id}/tokens", post(award_tokens))
}
