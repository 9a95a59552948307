//! PostgreSQL acknowledgment ledger.
//!
//! The ledger upsert and the notification flip share one transaction, so an
//! acknowledgment can never land without its notifications following.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{
    Acknowledgment, AckMeta, PolicyKind, PolicyNotification, PolicyVersion, UserId,
};
use crate::infra::retry::{self, RetryConfig};
use crate::infra::{AcknowledgmentLedger, LedgerError, Result};

use super::rows::{decode_notifications, NotificationRow, NOTIFICATION_COLUMNS};

/// PostgreSQL-based acknowledgment ledger
pub struct PgAcknowledgmentLedger {
    pool: PgPool,
    retry: RetryConfig,
}

impl PgAcknowledgmentLedger {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            retry: RetryConfig::database(),
        }
    }

    async fn try_acknowledge(
        &self,
        user: UserId,
        kind: PolicyKind,
        version: PolicyVersion,
        meta: &AckMeta,
    ) -> Result<Vec<PolicyNotification>> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        // Only the current active version is acceptable.
        let active: Option<(i32,)> = sqlx::query_as(
            "SELECT version FROM policy_texts WHERE policy_kind = $1 AND is_active",
        )
        .bind(kind.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let active = match active {
            Some((v,)) => PolicyVersion::from_tenths(v as u32),
            None => return Err(LedgerError::PolicyNotFound(kind)),
        };
        if active != version {
            return Err(LedgerError::VersionMismatch {
                kind,
                active,
                given: version,
            });
        }

        sqlx::query(
            r#"
            INSERT INTO user_policy_acknowledgments (
                user_id, policy_kind, acknowledged_version,
                acknowledged_at, ip_address, user_agent
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, policy_kind) DO UPDATE SET
                acknowledged_version = EXCLUDED.acknowledged_version,
                acknowledged_at = EXCLUDED.acknowledged_at,
                ip_address = EXCLUDED.ip_address,
                user_agent = EXCLUDED.user_agent
            "#,
        )
        .bind(user.0)
        .bind(kind.as_str())
        .bind(version.as_tenths() as i32)
        .bind(now)
        .bind(meta.ip_address.as_deref())
        .bind(meta.user_agent.as_deref())
        .execute(&mut *tx)
        .await?;

        let flipped = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            UPDATE policy_update_notifications
            SET is_acknowledged = TRUE, acknowledged_at = $3
            WHERE user_id = $1 AND policy_kind = $2 AND NOT is_acknowledged
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(user.0)
        .bind(kind.as_str())
        .bind(now)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        decode_notifications(flipped)
    }
}

#[async_trait]
impl AcknowledgmentLedger for PgAcknowledgmentLedger {
    async fn for_user(&self, user: UserId) -> Result<Vec<Acknowledgment>> {
        let rows = sqlx::query_as::<_, AckRow>(
            r#"
            SELECT user_id, policy_kind, acknowledged_version,
                   acknowledged_at, ip_address, user_agent
            FROM user_policy_acknowledgments
            WHERE user_id = $1
            ORDER BY policy_kind ASC
            "#,
        )
        .bind(user.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AckRow::decode).collect()
    }

    async fn acknowledge(
        &self,
        user: UserId,
        kind: PolicyKind,
        version: PolicyVersion,
        meta: AckMeta,
    ) -> Result<Vec<PolicyNotification>> {
        retry::execute(&self.retry, || {
            self.try_acknowledge(user, kind, version, &meta)
        })
        .await
    }
}

/// Raw row from the `user_policy_acknowledgments` table
#[derive(Debug, FromRow)]
struct AckRow {
    user_id: Uuid,
    policy_kind: String,
    acknowledged_version: i32,
    acknowledged_at: DateTime<Utc>,
    ip_address: Option<String>,
    user_agent: Option<String>,
}

impl AckRow {
    fn decode(self) -> Result<Acknowledgment> {
        let policy_kind = self
            .policy_kind
            .parse()
            .map_err(|_| LedgerError::InvalidPolicyKind(self.policy_kind.clone()))?;
        Ok(Acknowledgment {
            user_id: UserId::from_uuid(self.user_id),
            policy_kind,
            acknowledged_version: PolicyVersion::from_tenths(self.acknowledged_version as u32),
            acknowledged_at: self.acknowledged_at,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
        })
    }
}
