//! Raw table rows and their decoders.
//!
//! Rows are decoded into domain types at this boundary; an unknown kind
//! string stored in the database surfaces as `InvalidPolicyKind` instead of
//! leaking into the domain layer.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{
    NotificationId, PolicyKind, PolicyNotification, PolicyText, PolicyVersion, UserId,
};
use crate::infra::{LedgerError, Result};

fn decode_kind(raw: &str) -> Result<PolicyKind> {
    raw.parse()
        .map_err(|_| LedgerError::InvalidPolicyKind(raw.to_string()))
}

/// Raw row from the `policy_texts` table
#[derive(Debug, FromRow)]
pub(crate) struct PolicyRow {
    pub policy_id: Uuid,
    pub policy_kind: String,
    pub version: i32,
    pub title: String,
    pub content: String,
    pub requires_acknowledgment: bool,
    pub is_active: bool,
    pub last_updated: DateTime<Utc>,
    pub updated_by: Uuid,
}

impl PolicyRow {
    pub(crate) fn decode(self) -> Result<PolicyText> {
        Ok(PolicyText {
            policy_id: self.policy_id,
            policy_kind: decode_kind(&self.policy_kind)?,
            version: PolicyVersion::from_tenths(self.version as u32),
            title: self.title,
            content: self.content,
            requires_acknowledgment: self.requires_acknowledgment,
            is_active: self.is_active,
            last_updated: self.last_updated,
            updated_by: UserId::from_uuid(self.updated_by),
        })
    }
}

/// Raw row from the `policy_update_notifications` table
#[derive(Debug, FromRow)]
pub(crate) struct NotificationRow {
    pub notification_id: Uuid,
    pub user_id: Uuid,
    pub policy_kind: String,
    pub old_version: Option<i32>,
    pub new_version: i32,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub is_acknowledged: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

/// Column list matching [`NotificationRow`], for `SELECT`/`RETURNING`.
pub(crate) const NOTIFICATION_COLUMNS: &str = "notification_id, user_id, policy_kind, \
     old_version, new_version, title, message, link, \
     is_read, is_acknowledged, created_at, read_at, acknowledged_at";

impl NotificationRow {
    pub(crate) fn decode(self) -> Result<PolicyNotification> {
        Ok(PolicyNotification {
            notification_id: NotificationId::from_uuid(self.notification_id),
            user_id: UserId::from_uuid(self.user_id),
            policy_kind: decode_kind(&self.policy_kind)?,
            old_version: self.old_version.map(|v| PolicyVersion::from_tenths(v as u32)),
            new_version: PolicyVersion::from_tenths(self.new_version as u32),
            title: self.title,
            message: self.message,
            link: self.link,
            is_read: self.is_read,
            is_acknowledged: self.is_acknowledged,
            created_at: self.created_at,
            read_at: self.read_at,
            acknowledged_at: self.acknowledged_at,
        })
    }
}

pub(crate) fn decode_notifications(rows: Vec<NotificationRow>) -> Result<Vec<PolicyNotification>> {
    rows.into_iter().map(NotificationRow::decode).collect()
}

pub(crate) fn decode_policies(rows: Vec<PolicyRow>) -> Result<Vec<PolicyText>> {
    rows.into_iter().map(PolicyRow::decode).collect()
}
