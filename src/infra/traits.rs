//! Trait definitions for the policy ledger core services.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{
    Acknowledgment, AckMeta, AcknowledgmentStats, NotificationId, PolicyDraft, PolicyKind,
    PolicyNotification, PolicyText, PublishOutcome, UserId,
};

use super::Result;

/// Policy store holds the versioned policy documents.
///
/// Invariant: at most one row per kind is active at any time.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Fetch the active row for each kind that has one.
    async fn load_current(&self) -> Result<Vec<PolicyText>>;

    /// Fetch all versions of one kind, newest first.
    async fn history(&self, kind: PolicyKind) -> Result<Vec<PolicyText>>;

    /// Publish a new version of a policy.
    ///
    /// Single transaction: deactivates the prior active row, inserts the new
    /// row one tenth above it (or `1.0` for the first publish), and fans out
    /// one notification row per user. The caller broadcasts the returned
    /// notifications after commit.
    async fn publish(&self, draft: PolicyDraft, published_by: UserId) -> Result<PublishOutcome>;
}

/// Acknowledgment ledger records which policy versions each user accepted.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AcknowledgmentLedger: Send + Sync {
    /// Fetch all ledger rows for one user.
    async fn for_user(&self, user: UserId) -> Result<Vec<Acknowledgment>>;

    /// Record acceptance of the active version of a policy.
    ///
    /// Single transaction: upserts the ledger row (conflict key
    /// `(user_id, policy_kind)`) and marks the user's unacknowledged
    /// notifications for the kind acknowledged. Rejects versions that do not
    /// match the active policy. Idempotent. Returns the notification rows
    /// flipped by this call, for realtime broadcast.
    async fn acknowledge(
        &self,
        user: UserId,
        kind: PolicyKind,
        version: crate::domain::PolicyVersion,
        meta: AckMeta,
    ) -> Result<Vec<PolicyNotification>>;
}

/// Notification store owns the per-user policy-update notifications.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Unacknowledged notifications for one user, newest first.
    async fn pending(&self, user: UserId) -> Result<Vec<PolicyNotification>>;

    /// Mark one of the user's notifications read. Returns the updated row.
    async fn mark_read(&self, user: UserId, id: NotificationId) -> Result<PolicyNotification>;

    /// Delete one of the user's notifications.
    async fn dismiss(&self, user: UserId, id: NotificationId) -> Result<()>;
}

/// Stats store owns the denormalized acknowledgment rollups.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Recompute rollups for every active policy and upsert them.
    ///
    /// Full scan per policy kind; acceptable only at small scale and
    /// strictly on demand.
    async fn recalculate(&self) -> Result<Vec<AcknowledgmentStats>>;

    /// Read back the stored rollups, newest first.
    async fn current(&self) -> Result<Vec<AcknowledgmentStats>>;
}

/// Minimal view of the platform user directory.
///
/// Stands in for the external identity listing; only counting and
/// enumeration are needed here (fan-out and stats).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn count_users(&self) -> Result<u64>;

    async fn list_user_ids(&self) -> Result<Vec<UserId>>;

    /// Insert a user row if absent (local development seeding).
    async fn ensure_user(&self, user: UserId) -> Result<()>;
}
