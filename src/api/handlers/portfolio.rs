//! Portfolio handlers: own projects, visibility, template, public page.

use axum::extract::State;
use axum::routing::{get, patch};
use axum::{Json, Router};

use crate::api::dto::{
    PortfolioProjectDto, PublicPortfolioQuery, PublicPortfolioResponse, TemplateRequest,
    TemplateResponse, VisibilityRequest,
};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::PortfolioVisibility;
use crate::error::{ApiError, ErrorResponse};

/// `GET /portfolio/projects`: The caller's approved projects.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/portfolio/projects",
    tag = "Portfolio",
    summary = "List own approved projects",
    description = "Approved submissions with their visibility; projects are visible unless hidden.",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Approved projects", body = Vec<PortfolioProjectDto>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    )
)]
pub async fn projects(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<PortfolioProjectDto>>, ApiError> {
    let projects = state.portfolio.projects(user.id).await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

/// `PATCH /portfolio/visibility`: Show or hide a project.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] for missing fields and
/// [`ApiError::Forbidden`] for someone else's submission.
#[utoipa::path(
    patch,
    path = "/api/portfolio/visibility",
    tag = "Portfolio",
    summary = "Set project visibility",
    description = "Stores a visibility override for one of the caller's submissions.",
    security(("bearer" = [])),
    request_body = VisibilityRequest,
    responses(
        (status = 200, description = "Override stored", body = PortfolioVisibility),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
    )
)]
pub async fn set_visibility(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<VisibilityRequest>,
) -> Result<Json<PortfolioVisibility>, ApiError> {
    let (submission_id, visible) = req.parts()?;
    let saved = state
        .portfolio
        .set_visibility(user.id, submission_id, visible)
        .await?;
    Ok(Json(saved))
}

/// `PATCH /portfolio/template`: Select the portfolio template.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] for a missing or unknown key.
#[utoipa::path(
    patch,
    path = "/api/portfolio/template",
    tag = "Portfolio",
    summary = "Select portfolio template",
    description = "Sets the template used for the caller's public portfolio.",
    security(("bearer" = [])),
    request_body = TemplateRequest,
    responses(
        (status = 200, description = "Template selected", body = TemplateResponse),
        (status = 400, description = "Missing or unknown template", body = ErrorResponse),
    )
)]
pub async fn select_template(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<TemplateRequest>,
) -> Result<Json<TemplateResponse>, ApiError> {
    let selected_template = state.portfolio.select_template(user.id, req.key()?).await?;
    Ok(Json(TemplateResponse { selected_template }))
}

/// `GET /portfolio/public/{username}`: A public portfolio page.
///
/// # Errors
///
/// Returns [`ApiError::PortfolioNotFound`] for an unknown username.
#[utoipa::path(
    get,
    path = "/api/portfolio/public/{username}",
    tag = "Portfolio",
    summary = "Public portfolio",
    description = "Visible approved projects of a user, rendered with the requested template (default `minimal`).",
    params(
        ("username" = String, Path, description = "Portfolio owner's username"),
        PublicPortfolioQuery,
    ),
    responses(
        (status = 200, description = "Portfolio page", body = PublicPortfolioResponse),
        (status = 404, description = "Portfolio not found", body = ErrorResponse),
    )
)]
pub async fn public_portfolio(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
    ApiQuery(query): ApiQuery<PublicPortfolioQuery>,
) -> Result<Json<PublicPortfolioResponse>, ApiError> {
    let page = state
        .portfolio
        .public(&username, query.template.as_deref())
        .await?;
    Ok(Json(page.into()))
}

/// Portfolio routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/portfolio/projects", get(projects))
        .route("/portfolio/visibility", patch(set_visibility))
        .route("/portfolio/template", patch(select_template))
        .route("/portfolio/public/{username}", get(public_portfolio))
}
