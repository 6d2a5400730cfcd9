//! HTTP API tests
//!
//! Drives the router with `oneshot` over the in-memory store. Each endpoint
//! is checked for the happy path, the role gate and error classes.

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use pass_core::common::MembershipId;
use pass_core::domains::auth::JwtService;
use pass_core::domains::membership::{Membership, Role};
use pass_core::domains::pass::PassPolicy;
use pass_core::kernel::{BaseAccountStore, MemoryAccountStore};
use pass_core::server::{build_app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::common::{enroll_agent, enroll_member};

// ============================================================================
// Test Helpers
// ============================================================================

struct TestApp {
    router: Router,
    store: Arc<MemoryAccountStore>,
    jwt: Arc<JwtService>,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(MemoryAccountStore::new());
        let jwt = Arc::new(JwtService::new("test_secret_key", "test_issuer".to_string()));
        let state = AppState::new(store.clone(), PassPolicy::default(), jwt.clone());

        Self {
            router: build_app(state, &[]),
            store,
            jwt,
        }
    }

    fn bearer(&self, membership: &Membership) -> String {
        let token = self
            .jwt
            .create_token(membership.id, membership.role)
            .unwrap();
        format!("Bearer {}", token)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn poll(&self, auth: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri("/api/member/me");
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn scan(&self, auth: Option<&str>, pass_token: &str) -> (StatusCode, Value) {
        let body = json!({ "passToken": pass_token }).to_string();
        self.scan_raw(auth, &body).await
    }

    async fn scan_raw(&self, auth: Option<&str>, body: &str) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/agent/scan")
            .header("content-type", "application/json");
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }
}

// ============================================================================
// Member poll
// ============================================================================

#[tokio::test]
async fn member_poll_returns_stable_token() {
    let app = TestApp::new();
    let member = enroll_member(&*app.store, 24, Utc::now()).await;
    let auth = app.bearer(&member);

    let (status, first) = app.poll(Some(&auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["membershipId"], member.id.to_string());
    assert_eq!(first["balance"], 24);
    assert!(first["passToken"].as_str().is_some());
    assert!(first["expiresAt"].as_str().is_some());

    let (_, second) = app.poll(Some(&auth)).await;
    assert_eq!(first["passToken"], second["passToken"]);
}

#[tokio::test]
async fn member_poll_requires_auth() {
    let app = TestApp::new();

    let (status, body) = app.poll(None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthenticated");

    let (status, _) = app.poll(Some("Bearer not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn agent_poll_is_forbidden() {
    let app = TestApp::new();
    let agent = enroll_agent(&*app.store, Utc::now()).await;

    let (status, body) = app.poll(Some(&app.bearer(&agent))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[tokio::test]
async fn poll_for_unknown_membership_is_not_found() {
    let app = TestApp::new();
    let token = app.jwt.create_token(MembershipId::new(), Role::Member).unwrap();

    let (status, body) = app.poll(Some(&format!("Bearer {}", token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "unknown_membership");
}

// ============================================================================
// Agent scan
// ============================================================================

#[tokio::test]
async fn agent_scan_redeems_once() {
    let app = TestApp::new();
    let now = Utc::now();
    let member = enroll_member(&*app.store, 24, now).await;
    let agent = enroll_agent(&*app.store, now).await;
    let agent_auth = app.bearer(&agent);

    let (_, pass) = app.poll(Some(&app.bearer(&member))).await;
    let token = pass["passToken"].as_str().unwrap().to_string();

    let (status, body) = app.scan(Some(&agent_auth), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["membershipId"], member.id.to_string());
    assert_eq!(body["newBalance"], 23);

    let (status, body) = app.scan(Some(&agent_auth), &token).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "already_redeemed");

    assert_eq!(app.store.get_by_id(member.id).await.unwrap().balance, 23);
}

#[tokio::test]
async fn member_cannot_scan() {
    let app = TestApp::new();
    let member = enroll_member(&*app.store, 24, Utc::now()).await;
    let auth = app.bearer(&member);

    let (_, pass) = app.poll(Some(&auth)).await;
    let token = pass["passToken"].as_str().unwrap().to_string();

    let (status, _) = app.scan(Some(&auth), &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Rejected before the engine runs: the token is untouched
    assert_eq!(app.store.get_by_id(member.id).await.unwrap().balance, 24);
}

#[tokio::test]
async fn scan_requires_auth() {
    let app = TestApp::new();
    let (status, _) = app.scan(None, "anything").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_scan_body_still_checks_caller_first() {
    let app = TestApp::new();
    let now = Utc::now();
    let member = enroll_member(&*app.store, 24, now).await;
    let agent = enroll_agent(&*app.store, now).await;

    let (status, body) = app.scan_raw(None, "{not json").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthenticated");

    let (status, body) = app.scan_raw(Some(&app.bearer(&member)), "{not json").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = app
        .scan_raw(Some(&app.bearer(&agent)), r#"{"token": "abc"}"#)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn scan_of_unknown_token_is_invalid_credential() {
    let app = TestApp::new();
    let agent = enroll_agent(&*app.store, Utc::now()).await;

    let (status, body) = app.scan(Some(&app.bearer(&agent)), "garbage").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "invalid_or_expired");
}

#[tokio::test]
async fn scan_with_no_remaining_uses() {
    let app = TestApp::new();
    let now = Utc::now();
    let member = enroll_member(&*app.store, 0, now).await;
    let agent = enroll_agent(&*app.store, now).await;

    let (_, pass) = app.poll(Some(&app.bearer(&member))).await;
    let token = pass["passToken"].as_str().unwrap().to_string();

    let (status, body) = app.scan(Some(&app.bearer(&agent)), &token).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "no_remaining_uses");
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn health_reports_store() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"]["status"], "ok");
}
