//! Submission handlers: weekly submission, own list, single lookup.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CreateSubmissionRequest, SubmissionCreatedResponse};
use crate::api::extract::{ApiJson, ApiPath};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{Submission, SubmissionId};
use crate::error::{ApiError, ErrorResponse};

/// `POST /submissions`: Submit this week's project.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] for a missing or non-GitHub URL and
/// [`ApiError::WeeklyLimitReached`] for a second submission in seven days.
#[utoipa::path(
    post,
    path = "/api/submissions",
    tag = "Submissions",
    summary = "Submit a project",
    description = "Submits a GitHub repository for review. One submission per user per rolling seven days.",
    security(("bearer" = [])),
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submission created", body = SubmissionCreatedResponse),
        (status = 400, description = "Invalid URL or weekly limit reached", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    )
)]
pub async fn create_submission(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo_url = req.repo_url()?;
    let submission = state
        .submissions
        .submit(user.id, repo_url, req.description.clone())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmissionCreatedResponse::from(submission)),
    ))
}

/// `GET /submissions/me`: The caller's submissions.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/submissions/me",
    tag = "Submissions",
    summary = "List own submissions",
    description = "Returns the caller's submissions, newest first.",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Own submissions", body = Vec<Submission>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    )
)]
pub async fn my_submissions(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Submission>>, ApiError> {
    Ok(Json(state.submissions.mine(user.id).await?))
}

/// `GET /submissions/{id}`: One submission.
///
/// # Errors
///
/// Returns [`ApiError::SubmissionNotFound`] when missing and
/// [`ApiError::Forbidden`] for callers who are neither owner nor admin.
#[utoipa::path(
    get,
    path = "/api/submissions/{id}",
    tag = "Submissions",
    summary = "Get a submission",
    description = "Visible to the owner and to administrators.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Submission UUID"),
    ),
    responses(
        (status = 200, description = "Submission", body = Submission),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse),
    )
)]
pub async fn get_submission(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<uuid::Uuid>,
) -> Result<Json<Submission>, ApiError> {
    let submission = state
        .submissions
        .get_for(user.id, SubmissionId::from_uuid(id))
        .await?;
    Ok(Json(submission))
}

/// Submission routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/submissions", post(create_submission))
        .route("/submissions/me", get(my_submissions))
        .route("/submissions/{id}", get(get_submission))
}
