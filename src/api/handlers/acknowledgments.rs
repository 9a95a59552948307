//! Acknowledgment ledger handlers.

use axum::extract::{Extension, State};
use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use axum::Json;

use crate::api::auth_helpers::{ensure_read, ensure_write, require_user};
use crate::api::error::ApiError;
use crate::api::types::{AcknowledgeRequest, RequiredResponse};
use crate::auth::AuthContextExt;
use crate::domain::AckMeta;
use crate::infra::{AcknowledgmentLedger, PolicyStore};
use crate::server::AppState;
use crate::session::SessionState;

/// GET /api/v1/acknowledgments - The caller's ledger rows.
pub async fn list_acknowledgments(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ensure_read(&auth)?;
    let user = require_user(&auth)?;

    let acknowledgments = state.ledger.for_user(user).await?;
    Ok(Json(serde_json::json!({
        "acknowledgments": acknowledgments,
        "count": acknowledgments.len(),
    })))
}

/// GET /api/v1/acknowledgments/required - Kinds the caller must still accept.
pub async fn required_policies(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
) -> Result<Json<RequiredResponse>, ApiError> {
    ensure_read(&auth)?;
    let user = require_user(&auth)?;

    let policies = state.policy_store.load_current().await?;
    let acknowledgments = state.ledger.for_user(user).await?;

    let snapshot = SessionState::from_parts(policies, acknowledgments, Vec::new());
    Ok(Json(RequiredResponse {
        required: snapshot.required_kinds(),
        has_pending: snapshot.has_pending_policies(),
    }))
}

/// POST /api/v1/acknowledgments - Accept the active version of a policy.
///
/// Captures the client IP (X-Forwarded-For) and User-Agent into the ledger
/// row.
pub async fn acknowledge(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
    headers: HeaderMap,
    Json(request): Json<AcknowledgeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ensure_write(&auth)?;
    let user = require_user(&auth)?;

    let meta = AckMeta::new(
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').next().unwrap_or(v).trim().to_string()),
        headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    let flipped = state
        .ledger
        .acknowledge(user, request.policy_kind, request.version, meta)
        .await?;

    let count = flipped.len();
    state.hub.publish_updated(flipped);

    Ok(Json(serde_json::json!({
        "policy_kind": request.policy_kind,
        "acknowledged_version": request.version,
        "notifications_acknowledged": count,
    })))
}
