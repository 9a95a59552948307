//! Admin stats handlers.

use axum::extract::{Extension, State};
use axum::Json;

use crate::api::auth_helpers::ensure_admin;
use crate::api::error::ApiError;
use crate::auth::AuthContextExt;
use crate::infra::StatsStore;
use crate::server::AppState;

/// GET /api/v1/stats - Stored acknowledgment rollups.
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ensure_admin(&auth)?;

    let stats = state.stats.current().await?;
    Ok(Json(serde_json::json!({
        "stats": stats,
        "count": stats.len(),
    })))
}

/// POST /api/v1/stats/recalculate - Recompute rollups for all active
/// policies. Full scan; on-demand only.
pub async fn recalculate_stats(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ensure_admin(&auth)?;

    let stats = state.stats.recalculate().await?;
    Ok(Json(serde_json::json!({
        "stats": stats,
        "count": stats.len(),
    })))
}
