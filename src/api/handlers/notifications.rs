//! Notification handlers, including the realtime SSE stream.

use std::convert::Infallible;

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

use crate::api::auth_helpers::{ensure_read, ensure_write, require_user};
use crate::api::error::ApiError;
use crate::auth::AuthContextExt;
use crate::domain::{NotificationEvent, NotificationId};
use crate::infra::NotificationStore;
use crate::server::AppState;

/// GET /api/v1/notifications - The caller's pending notifications, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ensure_read(&auth)?;
    let user = require_user(&auth)?;

    let notifications = state.notifications.pending(user).await?;
    Ok(Json(serde_json::json!({
        "notifications": notifications,
        "count": notifications.len(),
    })))
}

/// POST /api/v1/notifications/:id/read - Mark one notification read.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ensure_write(&auth)?;
    let user = require_user(&auth)?;

    let row = state
        .notifications
        .mark_read(user, NotificationId::from_uuid(id))
        .await?;

    state.hub.publish_updated([row.clone()]);
    Ok(Json(serde_json::json!({ "notification": row })))
}

/// DELETE /api/v1/notifications/:id - Dismiss one notification.
pub async fn dismiss_notification(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ensure_write(&auth)?;
    let user = require_user(&auth)?;

    let id = NotificationId::from_uuid(id);
    state.notifications.dismiss(user, id).await?;

    state.hub.publish(crate::dispatch::NotificationUpdate {
        user_id: user,
        event: NotificationEvent::Deleted { id },
    });
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/notifications/stream - SSE feed of the caller's notification
/// changes.
///
/// Events are filtered server-side by user id. A lagged subscriber receives
/// a `lagged` event and should reload `/api/v1/notifications`.
pub async fn notification_stream(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    ensure_read(&auth)?;
    let user = require_user(&auth)?;

    let rx = state.hub.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |item| match item {
        Ok(update) if update.user_id == user => Event::default()
            .event("notification")
            .json_data(&update.event)
            .ok()
            .map(Ok),
        Ok(_) => None,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => Some(Ok(Event::default()
            .event("lagged")
            .data(skipped.to_string()))),
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
