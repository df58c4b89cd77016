//! REST endpoint handlers organized by resource.

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod notifications;
pub mod portfolio;
pub mod settings;
pub mod showcase;
pub mod submissions;
pub mod system;
pub mod tokens;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(submissions::routes())
        .merge(portfolio::routes())
        .merge(showcase::routes())
        .merge(dashboard::routes())
        .merge(settings::routes())
        .merge(notifications::routes())
        .merge(tokens::routes())
        .merge(admin::routes())
}
