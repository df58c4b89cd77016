//! OpenAPI document for every REST endpoint.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    admin, auth, dashboard, notifications, portfolio, settings, showcase, submissions, system,
    tokens,
};
use crate::error::ErrorResponse;

/// OpenAPI description of the Zorvexra API.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Zorvexra API",
        description = "Weekly project submissions, ZorBits rewards, portfolios and the showcase marketplace."
    ),
    paths(
        system::health_handler,
        system::templates_handler,
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        submissions::create_submission,
        submissions::my_submissions,
        submissions::get_submission,
        portfolio::projects,
        portfolio::set_visibility,
        portfolio::select_template,
        portfolio::public_portfolio,
        showcase::showcase,
        showcase::buy,
        showcase::my_purchases,
        dashboard::overview,
        settings::get_settings,
        settings::update_profile,
        settings::change_password,
        settings::update_avatar,
        settings::update_notifications,
        settings::delete_account,
        notifications::list_notifications,
        notifications::mark_read,
        notifications::mark_all_read,
        notifications::delete_notification,
        tokens::balance,
        tokens::history,
        admin::list_submissions,
        admin::get_submission,
        admin::review_submission,
        admin::award_tokens,
    ),
    components(schemas(ErrorResponse)),
    modifiers(&BearerAuth),
    tags(
        (name = "System", description = "Health and catalogs"),
        (name = "Auth", description = "Registration and sessions"),
        (name = "Submissions", description = "Weekly project submissions"),
        (name = "Portfolio", description = "Approved projects and public pages"),
        (name = "Showcase", description = "Buying projects with ZorBits"),
        (name = "Dashboard", description = "Activity overview"),
        (name = "Settings", description = "Account settings"),
        (name = "Notifications", description = "In-app notifications"),
        (name = "Tokens", description = "ZorBit balance and history"),
        (name = "Admin", description = "Review queue and awards"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme referenced by protected paths.
#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/auth/login",
            "/api/showcase/buy",
            "/api/admin/submissions/{id}/status",
            "/api/admin/users/{id}/tokens",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("bearer"))
        );
    }
}
