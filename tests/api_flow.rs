//! End-to-end flows through the full router over the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use zorvexra_api::api;
use zorvexra_api::app_state::AppState;
use zorvexra_api::auth::{JwtConfig, JwtManager};
use zorvexra_api::persistence::{MemoryStore, Store};
use zorvexra_api::service::AccountSettings;

const ADMIN_EMAIL: &str = "admin@zorvexra.dev";
const PASSWORD: &str = "correct-horse";

struct TestApp {
    router: Router,
}

fn app() -> TestApp {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let state = AppState::new(
        store,
        JwtManager::new(JwtConfig {
            secret: "integration-secret".into(),
            expires_in_secs: 600,
            issuer: "zorvexra-test".into(),
        }),
        AccountSettings {
            bcrypt_cost: 4,
            admin_emails: vec![ADMIN_EMAIL.into()],
        },
    );
    TestApp {
        router: api::build_router().with_state(state),
    }
}

impl TestApp {
    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call("GET", uri, token, None).await
    }

    /// Registers and logs in; returns `(token, user_id)`.
    async fn signup(&self, email: &str) -> (String, String) {
        let name = email.split('@').next().unwrap();
        let (status, _) = self
            .call(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "email": email, "password": PASSWORD, "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        (
            body["session"]["access_token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    async fn submit(&self, token: &str, repo_url: &str, description: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/submissions",
                Some(token),
                Some(json!({ "repo_url": repo_url, "description": description })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    async fn review(&self, admin: &str, id: &str, status: &str) -> (StatusCode, Value) {
        self.call(
            "PATCH",
            &format!("/api/admin/submissions/{id}/status"),
            Some(admin),
            Some(json!({ "status": status })),
        )
        .await
    }

    async fn award(&self, admin: &str, user_id: &str, amount: i64) {
        let (status, body) = self
            .call(
                "POST",
                &format!("/api/admin/users/{user_id}/tokens"),
                Some(admin),
                Some(json!({ "amount": amount })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
}

fn error_of(body: &Value) -> &str {
    body["error"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn health_catalog_and_fallback() {
    let app = app();
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.get("/config/templates", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(4));

    let (status, body) = app.get("/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_of(&body), "Route not found");
}

#[tokio::test]
async fn registration_and_login() {
    let app = app();
    let (status, body) = app
        .call("POST", "/api/auth/register", None, Some(json!({ "email": "ada@example.com" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "Email, password, and name are required");

    let (token, _) = app.signup("ada@example.com").await;
    let (status, _) = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": "ADA@example.com", "password": PASSWORD, "name": "Ada" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, me) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "ada");
    assert_eq!(me["selected_template"], "minimal");
    assert_eq!(me["token_balance"].as_f64(), Some(0.0));

    let (status, body) = app.get("/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(&body), "Unauthorized");
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = app();
    let (token, _) = app.signup("ada@example.com").await;
    let (status, body) = app.call("POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");
    let (status, _) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn one_submission_per_week() {
    let app = app();
    let (token, _) = app.signup("ada@example.com").await;

    let (status, body) = app
        .call("POST", "/api/submissions", Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "Repository URL is required");

    let (status, body) = app
        .call(
            "POST",
            "/api/submissions",
            Some(&token),
            Some(json!({ "repo_url": "https://gitlab.com/ada/engine" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "Invalid GitHub repository URL");

    app.submit(&token, "https://github.com/ada/engine.git", "rust").await;
    let (status, body) = app
        .call(
            "POST",
            "/api/submissions",
            Some(&token),
            Some(json!({ "repo_url": "https://github.com/ada/other" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "You can only submit one project per week");

    let (_, mine) = app.get("/api/submissions/me", Some(&token)).await;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    assert_eq!(mine[0]["repo_name"], "engine");
    assert_eq!(mine[0]["status"], "pending");
}

#[tokio::test]
async fn submission_lookup_respects_ownership() {
    let app = app();
    let (ada, _) = app.signup("ada@example.com").await;
    let (bob, _) = app.signup("bob@example.com").await;
    let (admin, _) = app.signup(ADMIN_EMAIL).await;
    let id = app.submit(&ada, "https://github.com/ada/engine", "").await;

    let uri = format!("/api/submissions/{id}");
    assert_eq!(app.get(&uri, Some(&ada)).await.0, StatusCode::OK);
    assert_eq!(app.get(&uri, Some(&bob)).await.0, StatusCode::FORBIDDEN);
    assert_eq!(app.get(&uri, Some(&admin)).await.0, StatusCode::OK);

    let missing = format!("/api/submissions/{}", uuid::Uuid::new_v4());
    assert_eq!(app.get(&missing, Some(&ada)).await.0, StatusCode::NOT_FOUND);
    let (status, body) = app.get("/api/submissions/not-a-uuid", Some(&ada)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn approval_credits_the_owner_once() {
    let app = app();
    let (ada, _) = app.signup("ada@example.com").await;
    let (admin, _) = app.signup(ADMIN_EMAIL).await;
    let id = app.submit(&ada, "https://github.com/ada/engine", "").await;

    let (status, body) = app.review(&ada, &id, "approved").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_of(&body), "Forbidden: Admin access required");

    let (status, body) = app.review(&admin, &id, "archived").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_of(&body),
        "Invalid status. Must be approved, rejected, or pending"
    );

    let (_, queue) = app.get("/api/admin/submissions?status=pending", Some(&admin)).await;
    assert_eq!(queue.as_array().map(Vec::len), Some(1));
    assert_eq!(queue[0]["user"]["username"], "ada");

    let (status, body) = app.review(&admin, &id, "approved").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Submission approved");
    assert_eq!(body["submission"]["tokens_awarded"].as_f64(), Some(1.0));
    assert!(body["submission"]["approved_at"].is_string());

    let (status, _) = app.review(&admin, &id, "approved").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, balance) = app.get("/api/tokens/balance", Some(&ada)).await;
    assert_eq!(balance["balance"].as_f64(), Some(1.0));
    assert_eq!(balance["currency"], "ZorBits");

    let (_, history) = app.get("/api/tokens/history", Some(&ada)).await;
    assert_eq!(history[0]["action_type"], "approval");
    assert_eq!(history[0]["description"], "Submission approved: +1 ZorBits");

    let (_, dashboard) = app.get("/api/dashboard/overview", Some(&ada)).await;
    assert_eq!(dashboard["stats"]["total_approved_projects"], 1);
    assert_eq!(dashboard["stats"]["total_zorbits_earned"].as_f64(), Some(1.0));
    assert_eq!(dashboard["weekly_deadline"]["current_status"], "On track");
}

#[tokio::test]
async fn manual_award_is_capped() {
    let app = app();
    let (ada, ada_id) = app.signup("ada@example.com").await;
    let (admin, _) = app.signup(ADMIN_EMAIL).await;

    let (status, body) = app
        .call(
            "POST",
            &format!("/api/admin/users/{ada_id}/tokens"),
            Some(&admin),
            Some(json!({ "amount": 1e18 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "amount must not exceed 1000000 ZorBits");

    app.award(&admin, &ada_id, 1_000_000).await;
    let (_, balance) = app.get("/api/tokens/balance", Some(&ada)).await;
    assert_eq!(balance["balance"].as_f64(), Some(1_000_000.0));
}

#[tokio::test]
async fn approved_submission_can_be_rejected() {
    let app = app();
    let (ada, _) = app.signup("ada@example.com").await;
    let (admin, _) = app.signup(ADMIN_EMAIL).await;
    let id = app.submit(&ada, "https://github.com/ada/engine", "").await;

    let (status, _) = app.review(&admin, &id, "approved").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.review(&admin, &id, "approved").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "Submission is already approved");

    let (status, body) = app.review(&admin, &id, "rejected").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Submission rejected");
    assert_eq!(body["submission"]["status"], "rejected");
    assert_eq!(body["submission"]["tokens_awarded"].as_f64(), Some(0.0));
    assert!(body["submission"]["approved_at"].is_null());

    let (status, body) = app.review(&admin, &id, "pending").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["submission"]["status"], "pending");

    let (_, balance) = app.get("/api/tokens/balance", Some(&ada)).await;
    assert_eq!(balance["balance"].as_f64(), Some(1.0));

    let (_, listings) = app.get("/api/showcase", None).await;
    assert_eq!(listings.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn showcase_purchase_flow() {
    let app = app();
    let (owner, _) = app.signup("owner@example.com").await;
    let (buyer, buyer_id) = app.signup("buyer@example.com").await;
    let (poor, _) = app.signup("poor@example.com").await;
    let (admin, _) = app.signup(ADMIN_EMAIL).await;
    let id = app
        .submit(&owner, "https://github.com/owner/engine", "rust, cli, wasm, more")
        .await;
    app.review(&admin, &id, "approved").await;
    app.award(&admin, &buyer_id, 500).await;

    let (status, listings) = app.get("/api/showcase", None).await;
    assert_eq!(status, StatusCode::OK);
    let item = &listings[0];
    assert_eq!(item["contributor"], "owner");
    assert_eq!(item["tags"], json!(["rust", "cli", "wasm"]));
    let price = item["tokens"].as_f64().unwrap();
    assert!((100.0..300.0).contains(&price));

    let app_ref = &app;
    let buy = move |token: String| {
        let body = json!({ "submission_id": id });
        async move {
            app_ref
                .call("POST", "/api/showcase/buy", Some(&token), Some(body))
                .await
        }
    };

    let (status, body) = buy(owner.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "You cannot purchase your own project");

    let (status, body) = buy(poor.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "Insufficient tokens");

    let (status, body) = buy(buyer.clone()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Purchase successful");
    assert_eq!(body["new_balance"].as_f64(), Some(500.0 - price));

    let (status, body) = buy(buyer.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "You have already purchased this project");

    let (_, mine) = app.get("/api/showcase/purchases/me", Some(&buyer)).await;
    assert_eq!(mine[0]["project_name"], "engine");
    let (_, listings) = app.get("/api/showcase", Some(&buyer)).await;
    assert_eq!(listings[0]["purchased"], true);
    let (_, listings) = app.get("/api/showcase", Some(&owner)).await;
    assert_eq!(listings[0]["owned"], true);

    let (_, notes) = app.get("/api/notifications", Some(&owner)).await;
    assert!(
        notes
            .as_array()
            .unwrap()
            .iter()
            .any(|n| n["type"] == "purchase")
    );
}

#[tokio::test]
async fn portfolio_visibility_and_templates() {
    let app = app();
    let (ada, _) = app.signup("ada@example.com").await;
    let (bob, _) = app.signup("bob@example.com").await;
    let (admin, _) = app.signup(ADMIN_EMAIL).await;
    let id = app.submit(&ada, "https://github.com/ada/engine", "").await;
    app.review(&admin, &id, "approved").await;

    let (_, page) = app.get("/api/portfolio/public/ada", None).await;
    assert_eq!(page["projects"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["template"]["id"], "minimal");

    let hide = json!({ "submission_id": id, "visible": false });
    let (status, body) = app
        .call("PATCH", "/api/portfolio/visibility", Some(&bob), Some(hide.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_of(&body), "Submission not found or does not belong to you");

    let (status, _) = app
        .call("PATCH", "/api/portfolio/visibility", Some(&ada), Some(hide))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, page) = app.get("/api/portfolio/public/ada?template=neon", None).await;
    assert_eq!(page["projects"].as_array().map(Vec::len), Some(0));
    assert_eq!(page["template"]["name"], "Neon");

    let (_, projects) = app.get("/api/portfolio/projects", Some(&ada)).await;
    assert_eq!(projects[0]["visible"], false);

    let (status, body) = app
        .call(
            "PATCH",
            "/api/portfolio/template",
            Some(&ada),
            Some(json!({ "template_id": "grid" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected_template"], "grid");

    let (status, body) = app.get("/api/portfolio/public/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_of(&body), "Portfolio not found");
}

#[tokio::test]
async fn notifications_are_scoped_to_the_caller() {
    let app = app();
    let (ada, _) = app.signup("ada@example.com").await;
    let (bob, _) = app.signup("bob@example.com").await;
    app.submit(&ada, "https://github.com/ada/engine", "").await;

    let (_, notes) = app.get("/api/notifications?limit=5", Some(&ada)).await;
    let note_id = notes[0]["id"].as_str().unwrap().to_string();
    assert_eq!(notes[0]["read"], false);

    let read_uri = format!("/api/notifications/{note_id}/read");
    assert_eq!(
        app.call("PATCH", &read_uri, Some(&bob), None).await.0,
        StatusCode::NOT_FOUND
    );

    let (status, body) = app
        .call("PATCH", "/api/notifications/mark-read-all", Some(&ada), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "ids array is required");

    let (status, _) = app
        .call(
            "PATCH",
            "/api/notifications/mark-read-all",
            Some(&ada),
            Some(json!({ "ids": [note_id] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, notes) = app.get("/api/notifications", Some(&ada)).await;
    assert_eq!(notes[0]["read"], true);

    let delete_uri = format!("/api/notifications/{note_id}");
    assert_eq!(
        app.call("DELETE", &delete_uri, Some(&ada), None).await.0,
        StatusCode::OK
    );
    assert_eq!(
        app.call("DELETE", &delete_uri, Some(&ada), None).await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn settings_and_account_deletion() {
    let app = app();
    let (ada, _) = app.signup("ada@example.com").await;

    let (status, body) = app
        .call("PATCH", "/api/settings/profile", Some(&ada), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "No fields to update");

    let (status, body) = app
        .call(
            "PATCH",
            "/api/settings/profile",
            Some(&ada),
            Some(json!({ "name": "Ada L.", "github_username": "ada" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Ada L.");

    let (status, _) = app
        .call(
            "PATCH",
            "/api/settings/password",
            Some(&ada),
            Some(json!({ "current_password": "nope-nope", "new_password": "another-one" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .call(
            "PATCH",
            "/api/settings/notifications",
            Some(&ada),
            Some(json!({ "email_notifications": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["preferences"]["email_notifications"], false);
    assert_eq!(body["preferences"]["project_notifications"], true);

    let (_, settings) = app.get("/api/settings", Some(&ada)).await;
    assert_eq!(settings["github_username"], "ada");

    let (status, _) = app.call("DELETE", "/api/settings/account", Some(&ada), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.get("/api/settings", Some(&ada)).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_json_keeps_the_error_shape() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\":"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}
