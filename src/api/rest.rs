//! REST API routes.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::server::AppState;

use super::handlers::{acknowledgments, keys, notifications, policies, stats};

/// Build the `/api` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/policies", get(policies::list_policies))
        .route("/v1/policies/:kind/history", get(policies::policy_history))
        .route("/v1/policies/:kind/publish", post(policies::publish_policy))
        .route(
            "/v1/acknowledgments",
            get(acknowledgments::list_acknowledgments).post(acknowledgments::acknowledge),
        )
        .route(
            "/v1/acknowledgments/required",
            get(acknowledgments::required_policies),
        )
        .route("/v1/notifications", get(notifications::list_notifications))
        .route(
            "/v1/notifications/stream",
            get(notifications::notification_stream),
        )
        .route(
            "/v1/notifications/:id/read",
            post(notifications::mark_notification_read),
        )
        .route(
            "/v1/notifications/:id",
            delete(notifications::dismiss_notification),
        )
        .route("/v1/stats", get(stats::get_stats))
        .route("/v1/stats/recalculate", post(stats::recalculate_stats))
        .route("/v1/auth/keys", post(keys::create_api_key))
}
