//! Policy read and publish handlers.

use axum::extract::{Extension, Path, State};
use axum::Json;

use crate::api::auth_helpers::{ensure_admin, ensure_read};
use crate::api::error::{validation_error, ApiError};
use crate::api::types::PublishRequest;
use crate::auth::AuthContextExt;
use crate::domain::{PolicyDraft, PolicyKind};
use crate::infra::PolicyStore;
use crate::server::AppState;

fn parse_kind(raw: &str) -> Result<PolicyKind, ApiError> {
    raw.parse()
        .map_err(|_| validation_error("kind", format!("Invalid policy kind: {raw}")))
}

/// GET /api/v1/policies - Current active policy per kind.
pub async fn list_policies(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ensure_read(&auth)?;

    let policies = state.policy_store.load_current().await?;
    Ok(Json(serde_json::json!({
        "policies": policies,
        "count": policies.len(),
    })))
}

/// GET /api/v1/policies/:kind/history - All versions of one kind, newest first.
pub async fn policy_history(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
    Path(kind): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ensure_admin(&auth)?;
    let kind = parse_kind(&kind)?;

    let versions = state.policy_store.history(kind).await?;
    Ok(Json(serde_json::json!({
        "policy_kind": kind,
        "versions": versions,
        "count": versions.len(),
    })))
}

/// POST /api/v1/policies/:kind/publish - Publish a new version.
pub async fn publish_policy(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
    Path(kind): Path<String>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ensure_admin(&auth)?;
    let kind = parse_kind(&kind)?;

    let draft = PolicyDraft::new(
        kind,
        request.title,
        request.content,
        request.requires_acknowledgment,
    );

    let outcome = state.policy_store.publish(draft, auth.user()).await?;

    // Fan-out rows are committed; push them to connected clients.
    let notified = outcome.notifications.len();
    state.hub.publish_created(outcome.notifications);

    Ok(Json(serde_json::json!({
        "policy": outcome.policy,
        "notified_users": notified,
    })))
}
