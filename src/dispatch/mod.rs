//! Realtime notification dispatch.
//!
//! One broadcast channel carries every notification change; subscribers
//! filter by user id. Senders never block: a send with no receivers is a
//! no-op, and a slow receiver that lags is expected to fall back to a full
//! reload (see the session layer).

use tokio::sync::broadcast;

use crate::domain::{NotificationEvent, UserId};

/// One change to one user's notification list.
#[derive(Debug, Clone)]
pub struct NotificationUpdate {
    pub user_id: UserId,
    pub event: NotificationEvent,
}

/// Broadcast hub for notification changes.
pub struct NotificationHub {
    tx: broadcast::Sender<NotificationUpdate>,
}

impl NotificationHub {
    /// Default channel capacity; a receiver further behind than this lags.
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish one update. Returns the number of receivers it reached.
    pub fn publish(&self, update: NotificationUpdate) -> usize {
        // An Err means no active receivers, which is fine.
        self.tx.send(update).unwrap_or(0)
    }

    /// Publish a batch of created rows (publish fan-out).
    pub fn publish_created(&self, rows: impl IntoIterator<Item = crate::domain::PolicyNotification>) {
        for row in rows {
            self.publish(NotificationUpdate {
                user_id: row.user_id,
                event: NotificationEvent::Created { row },
            });
        }
    }

    /// Publish a batch of updated rows (acknowledge flips, mark-read).
    pub fn publish_updated(&self, rows: impl IntoIterator<Item = crate::domain::PolicyNotification>) {
        for row in rows {
            self.publish(NotificationUpdate {
                user_id: row.user_id,
                event: NotificationEvent::Updated { row },
            });
        }
    }

    /// Subscribe to the raw stream; callers filter by `user_id`.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationUpdate> {
        self.tx.subscribe()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
