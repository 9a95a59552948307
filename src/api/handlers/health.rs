//! Health check handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::server::AppState;

/// Response for the basic health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// Basic health check endpoint.
///
/// No deep checks; use for liveness probes.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "policy-ledger",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Readiness check endpoint.
///
/// Checks database connectivity; use for readiness probes.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => Ok(Json(serde_json::json!({
            "status": "ready",
            "database": {
                "connected": true,
                "response_time_ms": start.elapsed().as_millis() as u64,
            },
        }))),
        Err(e) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Database unavailable: {}", e),
        )),
    }
}
