//! Policy-update notification rows and the realtime event envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NotificationId, PolicyKind, PolicyVersion, UserId};

/// One row per `(user, policy-version-change)` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyNotification {
    pub notification_id: NotificationId,
    pub user_id: UserId,
    pub policy_kind: PolicyKind,
    pub old_version: Option<PolicyVersion>,
    pub new_version: PolicyVersion,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub is_acknowledged: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

/// A change to one notification row, as pushed over the realtime channel.
///
/// `Created` and `Updated` carry the full row so consumers can merge by id
/// without a read-back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum NotificationEvent {
    Created { row: PolicyNotification },
    Updated { row: PolicyNotification },
    Deleted { id: NotificationId },
}

impl NotificationEvent {
    /// The id of the row this event concerns.
    pub fn notification_id(&self) -> NotificationId {
        match self {
            NotificationEvent::Created { row } | NotificationEvent::Updated { row } => {
                row.notification_id
            }
            NotificationEvent::Deleted { id } => *id,
        }
    }
}
