//! HTTP-level integration tests for the REST API.
//!
//! Ignored by default; run with `DATABASE_URL` set and `--test-threads=1`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use policy_ledger::auth::{
    ApiKeyRecord, ApiKeyValidator, AuthMiddlewareState, Authenticator, Permissions,
};
use policy_ledger::server::{app, AppState};

const ADMIN_KEY: &str = "pk_test_admin_key_0000000000000000";

async fn connect_db() -> Option<sqlx::PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .ok()?;
    Some(pool)
}

fn build_app(pool: sqlx::PgPool) -> (axum::Router, Arc<ApiKeyValidator>) {
    let validator = Arc::new(ApiKeyValidator::new());
    validator.register_key(ApiKeyRecord {
        key_hash: ApiKeyValidator::hash_key(ADMIN_KEY),
        user_id: Uuid::nil(),
        permissions: Permissions::admin(),
        active: true,
    });

    let auth_state = AuthMiddlewareState {
        authenticator: Arc::new(Authenticator::new(validator.clone())),
        require_auth: true,
        rate_limiter: None,
    };
    let state = AppState::new(pool, validator.clone());
    (app(state, auth_state), validator)
}

fn request(method: Method, uri: &str, key: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {key}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
#[ignore]
async fn rest_policy_acknowledgment_flow() {
    let Some(pool) = connect_db().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    policy_ledger::migrations::run_postgres(&pool).await.unwrap();

    let (app, _validator) = build_app(pool);

    // Unauthenticated requests are rejected before any handler runs.
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/v1/policies", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Health needs no credentials.
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Mint a member key through the admin API.
    let member_id = Uuid::new_v4();
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/auth/keys",
            Some(ADMIN_KEY),
            Some(serde_json::json!({ "user_id": member_id })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let minted = json_body(response).await;
    let member_key = minted["api_key"].as_str().unwrap().to_string();

    // Members cannot publish.
    let publish_body = serde_json::json!({
        "title": "Trust & Safety",
        "content": "Report anything unsafe.",
        "requires_acknowledgment": true,
    });
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/policies/trust_safety/publish",
            Some(&member_key),
            Some(publish_body.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin publish succeeds and fans out to the member minted above.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/policies/trust_safety/publish",
            Some(ADMIN_KEY),
            Some(publish_body),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let published = json_body(response).await;
    let version = published["policy"]["version"].as_str().unwrap().to_string();
    assert!(published["notified_users"].as_u64().unwrap() >= 1);

    // An unknown kind is a validation error.
    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/api/v1/policies/shipping/history",
            Some(ADMIN_KEY),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The member is now blocked on trust_safety.
    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/api/v1/acknowledgments/required",
            Some(&member_key),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let required = json_body(response).await;
    assert_eq!(required["has_pending"], serde_json::json!(true));
    assert!(required["required"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("trust_safety")));

    // Acknowledging a stale version conflicts.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/acknowledgments",
            Some(&member_key),
            Some(serde_json::json!({ "policy_kind": "trust_safety", "version": "99.9" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Acknowledging the active version opens the gate.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/acknowledgments",
            Some(&member_key),
            Some(serde_json::json!({ "policy_kind": "trust_safety", "version": version })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/api/v1/acknowledgments/required",
            Some(&member_key),
            None,
        ))
        .await
        .unwrap();
    let required = json_body(response).await;
    assert!(!required["required"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("trust_safety")));

    // The bootstrap admin has no user identity to acknowledge with.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/acknowledgments",
            Some(ADMIN_KEY),
            Some(serde_json::json!({ "policy_kind": "trust_safety", "version": version })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Stats endpoints are admin-only.
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/v1/stats", Some(&member_key), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/stats/recalculate",
            Some(ADMIN_KEY),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
