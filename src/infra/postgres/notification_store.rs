//! PostgreSQL notification store.
//!
//! Reads and targeted mutations are scoped to the owning user; a row id
//! belonging to someone else is indistinguishable from a missing row.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPool;

use crate::domain::{NotificationId, PolicyNotification, UserId};
use crate::infra::{LedgerError, NotificationStore, Result};

use super::rows::{decode_notifications, NotificationRow, NOTIFICATION_COLUMNS};

/// PostgreSQL-based notification store
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn pending(&self, user: UserId) -> Result<Vec<PolicyNotification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM policy_update_notifications
            WHERE user_id = $1 AND NOT is_acknowledged
            ORDER BY created_at DESC
            "#
        ))
        .bind(user.0)
        .fetch_all(&self.pool)
        .await?;

        decode_notifications(rows)
    }

    async fn mark_read(&self, user: UserId, id: NotificationId) -> Result<PolicyNotification> {
        // read_at keeps the first read time on repeated calls.
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            UPDATE policy_update_notifications
            SET is_read = TRUE, read_at = COALESCE(read_at, $3)
            WHERE notification_id = $1 AND user_id = $2
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(id.0)
        .bind(user.0)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.decode(),
            None => Err(LedgerError::NotificationNotFound(id.0)),
        }
    }

    async fn dismiss(&self, user: UserId, id: NotificationId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM policy_update_notifications WHERE notification_id = $1 AND user_id = $2",
        )
        .bind(id.0)
        .bind(user.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::NotificationNotFound(id.0));
        }
        Ok(())
    }
}
