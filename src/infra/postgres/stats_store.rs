//! PostgreSQL stats store.
//!
//! Recalculation scans the ledger once per active policy and divides by the
//! platform user count. O(policies × users), strictly on demand; displayed
//! values are stale until the next manual trigger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::FromRow;

use crate::domain::{AcknowledgmentStats, PolicyVersion};
use crate::infra::{LedgerError, Result, StatsStore};

/// PostgreSQL-based stats store
pub struct PgStatsStore {
    pool: PgPool,
}

impl PgStatsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsStore for PgStatsStore {
    async fn recalculate(&self) -> Result<Vec<AcknowledgmentStats>> {
        let (total_users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let active: Vec<(String, i32)> = sqlx::query_as(
            "SELECT policy_kind, version FROM policy_texts WHERE is_active",
        )
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();
        let mut rollups = Vec::with_capacity(active.len());

        for (kind_raw, version) in active {
            let policy_kind = kind_raw
                .parse()
                .map_err(|_| LedgerError::InvalidPolicyKind(kind_raw.clone()))?;

            let (acknowledged,): (i64,) = sqlx::query_as(
                r#"
                SELECT COUNT(*) FROM user_policy_acknowledgments
                WHERE policy_kind = $1 AND acknowledged_version >= $2
                "#,
            )
            .bind(&kind_raw)
            .bind(version)
            .fetch_one(&self.pool)
            .await?;

            let stats = AcknowledgmentStats {
                policy_kind,
                version: PolicyVersion::from_tenths(version as u32),
                total_users: total_users as u64,
                acknowledged_count: acknowledged as u64,
                pending_count: (total_users - acknowledged).max(0) as u64,
                last_updated: now,
            };

            sqlx::query(
                r#"
                INSERT INTO policy_acknowledgment_stats (
                    policy_kind, version, total_users,
                    acknowledged_count, pending_count, last_updated
                ) VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (policy_kind, version) DO UPDATE SET
                    total_users = EXCLUDED.total_users,
                    acknowledged_count = EXCLUDED.acknowledged_count,
                    pending_count = EXCLUDED.pending_count,
                    last_updated = EXCLUDED.last_updated
                "#,
            )
            .bind(&kind_raw)
            .bind(version)
            .bind(stats.total_users as i64)
            .bind(stats.acknowledged_count as i64)
            .bind(stats.pending_count as i64)
            .bind(stats.last_updated)
            .execute(&self.pool)
            .await?;

            rollups.push(stats);
        }

        Ok(rollups)
    }

    async fn current(&self) -> Result<Vec<AcknowledgmentStats>> {
        let rows = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT policy_kind, version, total_users,
                   acknowledged_count, pending_count, last_updated
            FROM policy_acknowledgment_stats
            ORDER BY last_updated DESC, policy_kind ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StatsRow::decode).collect()
    }
}

/// Raw row from the `policy_acknowledgment_stats` table
#[derive(Debug, FromRow)]
struct StatsRow {
    policy_kind: String,
    version: i32,
    total_users: i64,
    acknowledged_count: i64,
    pending_count: i64,
    last_updated: DateTime<Utc>,
}

impl StatsRow {
    fn decode(self) -> Result<AcknowledgmentStats> {
        let policy_kind = self
            .policy_kind
            .parse()
            .map_err(|_| LedgerError::InvalidPolicyKind(self.policy_kind.clone()))?;
        Ok(AcknowledgmentStats {
            policy_kind,
            version: PolicyVersion::from_tenths(self.version as u32),
            total_users: self.total_users as u64,
            acknowledged_count: self.acknowledged_count as u64,
            pending_count: self.pending_count as u64,
            last_updated: self.last_updated,
        })
    }
}
