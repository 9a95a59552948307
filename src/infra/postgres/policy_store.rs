//! PostgreSQL policy store.
//!
//! Publish is the one write path: deactivate the prior active row, insert
//! the successor, and fan out notifications, all in a single transaction.
//! A failure at any step rolls back the whole publish, so a kind can never
//! be left without an active version.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::domain::{
    NotificationId, PolicyDraft, PolicyKind, PolicyNotification, PolicyText, PolicyVersion,
    PublishOutcome, UserId,
};
use crate::infra::retry::{self, RetryConfig};
use crate::infra::{LedgerError, PolicyStore, Result};

use super::rows::{decode_policies, PolicyRow};

/// PostgreSQL-based policy store
pub struct PgPolicyStore {
    pool: PgPool,
    retry: RetryConfig,
}

impl PgPolicyStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            retry: RetryConfig::database(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn try_publish(&self, draft: &PolicyDraft, published_by: UserId) -> Result<PublishOutcome> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        // Lock the active row so concurrent publishes of the same kind
        // serialize instead of both deactivating and double-inserting.
        let prior: Option<(i32,)> = sqlx::query_as(
            r#"
            SELECT version FROM policy_texts
            WHERE policy_kind = $1 AND is_active
            FOR UPDATE
            "#,
        )
        .bind(draft.policy_kind.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let old_version = prior.map(|(v,)| PolicyVersion::from_tenths(v as u32));
        let version = old_version
            .map(|v| v.bump())
            .unwrap_or(PolicyVersion::INITIAL);

        sqlx::query(
            "UPDATE policy_texts SET is_active = FALSE WHERE policy_kind = $1 AND is_active",
        )
        .bind(draft.policy_kind.as_str())
        .execute(&mut *tx)
        .await?;

        let policy = PolicyText {
            policy_id: Uuid::new_v4(),
            policy_kind: draft.policy_kind,
            version,
            title: draft.title.clone(),
            content: draft.content.clone(),
            requires_acknowledgment: draft.requires_acknowledgment,
            is_active: true,
            last_updated: now,
            updated_by: published_by,
        };

        sqlx::query(
            r#"
            INSERT INTO policy_texts (
                policy_id, policy_kind, version, title, content,
                requires_acknowledgment, is_active, last_updated, updated_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(policy.policy_id)
        .bind(policy.policy_kind.as_str())
        .bind(policy.version.as_tenths() as i32)
        .bind(&policy.title)
        .bind(&policy.content)
        .bind(policy.requires_acknowledgment)
        .bind(policy.is_active)
        .bind(policy.last_updated)
        .bind(policy.updated_by.0)
        .execute(&mut *tx)
        .await?;

        // Fan-out: one notification row per user, same transaction.
        let user_ids: Vec<(Uuid,)> = sqlx::query_as("SELECT user_id FROM users")
            .fetch_all(&mut *tx)
            .await?;

        let mut notifications = Vec::with_capacity(user_ids.len());
        for (user_id,) in user_ids {
            let notification = PolicyNotification {
                notification_id: NotificationId::new(),
                user_id: UserId::from_uuid(user_id),
                policy_kind: policy.policy_kind,
                old_version,
                new_version: version,
                title: format!("{} updated", policy.title),
                message: format!(
                    "{} was updated to version {}. Please review the changes.",
                    policy.title, version
                ),
                link: Some(format!("/policies/{}", policy.policy_kind)),
                is_read: false,
                is_acknowledged: false,
                created_at: now,
                read_at: None,
                acknowledged_at: None,
            };

            sqlx::query(
                r#"
                INSERT INTO policy_update_notifications (
                    notification_id, user_id, policy_kind,
                    old_version, new_version, title, message, link,
                    is_read, is_acknowledged, created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(notification.notification_id.0)
            .bind(notification.user_id.0)
            .bind(notification.policy_kind.as_str())
            .bind(notification.old_version.map(|v| v.as_tenths() as i32))
            .bind(notification.new_version.as_tenths() as i32)
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(notification.link.as_deref())
            .bind(notification.is_read)
            .bind(notification.is_acknowledged)
            .bind(notification.created_at)
            .execute(&mut *tx)
            .await?;

            notifications.push(notification);
        }

        tx.commit().await?;

        Ok(PublishOutcome {
            policy,
            notifications,
        })
    }
}

#[async_trait]
impl PolicyStore for PgPolicyStore {
    async fn load_current(&self) -> Result<Vec<PolicyText>> {
        let rows = sqlx::query_as::<_, PolicyRow>(
            r#"
            SELECT policy_id, policy_kind, version, title, content,
                   requires_acknowledgment, is_active, last_updated, updated_by
            FROM policy_texts
            WHERE is_active
            ORDER BY policy_kind ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        decode_policies(rows)
    }

    async fn history(&self, kind: PolicyKind) -> Result<Vec<PolicyText>> {
        let rows = sqlx::query_as::<_, PolicyRow>(
            r#"
            SELECT policy_id, policy_kind, version, title, content,
                   requires_acknowledgment, is_active, last_updated, updated_by
            FROM policy_texts
            WHERE policy_kind = $1
            ORDER BY version DESC
            "#,
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        decode_policies(rows)
    }

    async fn publish(&self, draft: PolicyDraft, published_by: UserId) -> Result<PublishOutcome> {
        draft.validate().map_err(LedgerError::Validation)?;
        retry::execute(&self.retry, || self.try_publish(&draft, published_by)).await
    }
}
