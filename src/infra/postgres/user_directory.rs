//! PostgreSQL user directory.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::domain::UserId;
use crate::infra::{Result, UserDirectory};

/// PostgreSQL-backed view of the platform user table.
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn count_users(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn list_user_ids(&self) -> Result<Vec<UserId>> {
        let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT user_id FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id,)| UserId::from_uuid(id)).collect())
    }

    async fn ensure_user(&self, user: UserId) -> Result<()> {
        sqlx::query("INSERT INTO users (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
