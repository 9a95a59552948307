//! Per-user session state.
//!
//! The session replaces the source platform's process-wide provider with an
//! explicit per-user object: an in-memory snapshot of policies, the user's
//! ledger, and the pending-notification feed, plus handles to the stores.
//! `needs_acknowledgment` and friends are pure lookups against the
//! snapshot; only `refresh` and the mutations touch the network.

mod feed;
mod manager;

pub use feed::NotificationFeed;
pub use manager::SessionManager;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::domain::{
    Acknowledgment, AckMeta, NotificationEvent, NotificationId, PolicyKind, PolicyNotification,
    PolicyText, PolicyVersion, UserId,
};
use crate::infra::{AcknowledgmentLedger, NotificationStore, PolicyStore, Result};

/// Pure in-memory snapshot of everything the acknowledgment gate needs.
#[derive(Debug, Default, Clone)]
pub struct SessionState {
    policies: HashMap<PolicyKind, PolicyText>,
    acknowledgments: HashMap<PolicyKind, Acknowledgment>,
    pub feed: NotificationFeed,
}

impl SessionState {
    /// Build a snapshot from freshly loaded rows.
    ///
    /// Policies are reduced to one row per kind, most recently updated
    /// first, so a degraded fetch that returns superseded rows still yields
    /// a usable snapshot.
    pub fn from_parts(
        mut policies: Vec<PolicyText>,
        acknowledgments: Vec<Acknowledgment>,
        pending: Vec<PolicyNotification>,
    ) -> Self {
        policies.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        let mut by_kind = HashMap::new();
        for policy in policies {
            by_kind.entry(policy.policy_kind).or_insert(policy);
        }

        let acknowledgments = acknowledgments
            .into_iter()
            .map(|a| (a.policy_kind, a))
            .collect();

        let mut feed = NotificationFeed::new();
        feed.replace_all(pending);

        Self {
            policies: by_kind,
            acknowledgments,
            feed,
        }
    }

    pub fn policy(&self, kind: PolicyKind) -> Option<&PolicyText> {
        self.policies.get(&kind)
    }

    pub fn acknowledged_version(&self, kind: PolicyKind) -> Option<PolicyVersion> {
        self.acknowledgments.get(&kind).map(|a| a.acknowledged_version)
    }

    /// True iff an active policy of this kind exists, requires
    /// acknowledgment, and the user's ledger entry is absent or
    /// lower-versioned.
    pub fn needs_acknowledgment(&self, kind: PolicyKind) -> bool {
        let Some(policy) = self.policies.get(&kind) else {
            return false;
        };
        if !policy.requires_acknowledgment {
            return false;
        }
        match self.acknowledgments.get(&kind) {
            None => true,
            Some(ack) => ack.acknowledged_version < policy.version,
        }
    }

    /// Kinds the user must still acknowledge, in display order.
    pub fn required_kinds(&self) -> Vec<PolicyKind> {
        PolicyKind::ALL
            .into_iter()
            .filter(|kind| self.needs_acknowledgment(*kind))
            .collect()
    }

    /// True if any loaded policy still needs acknowledgment.
    pub fn has_pending_policies(&self) -> bool {
        PolicyKind::ALL
            .into_iter()
            .any(|kind| self.needs_acknowledgment(kind))
    }
}

/// A live per-user session over the stores.
pub struct PolicySession {
    user: UserId,
    policies: Arc<dyn PolicyStore>,
    ledger: Arc<dyn AcknowledgmentLedger>,
    notifications: Arc<dyn NotificationStore>,
    state: RwLock<SessionState>,
}

impl PolicySession {
    pub fn new(
        user: UserId,
        policies: Arc<dyn PolicyStore>,
        ledger: Arc<dyn AcknowledgmentLedger>,
        notifications: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            user,
            policies,
            ledger,
            notifications,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    /// Reload the snapshot from the stores.
    ///
    /// Fetch errors degrade to empty lists: "zero policies" is a valid if
    /// degraded state, and the UI must not crash on it.
    pub async fn refresh(&self) {
        let policies = match self.policies.load_current().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(user = %self.user, error = %e, "policy fetch failed, degrading to empty");
                Vec::new()
            }
        };
        let acknowledgments = match self.ledger.for_user(self.user).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(user = %self.user, error = %e, "ledger fetch failed, degrading to empty");
                Vec::new()
            }
        };
        let pending = match self.notifications.pending(self.user).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(user = %self.user, error = %e, "notification fetch failed, degrading to empty");
                Vec::new()
            }
        };

        let mut state = self.state.write().await;
        *state = SessionState::from_parts(policies, acknowledgments, pending);
    }

    pub async fn needs_acknowledgment(&self, kind: PolicyKind) -> bool {
        self.state.read().await.needs_acknowledgment(kind)
    }

    pub async fn has_pending_policies(&self) -> bool {
        self.state.read().await.has_pending_policies()
    }

    pub async fn required_kinds(&self) -> Vec<PolicyKind> {
        self.state.read().await.required_kinds()
    }

    pub async fn acknowledged_version(&self, kind: PolicyKind) -> Option<PolicyVersion> {
        self.state.read().await.acknowledged_version(kind)
    }

    pub async fn pending_notifications(&self) -> Vec<PolicyNotification> {
        self.state.read().await.feed.items().to_vec()
    }

    /// Record acceptance of `version` of `kind`, then reload the snapshot.
    ///
    /// Returns the notification rows the ledger flipped, so the caller can
    /// broadcast them.
    pub async fn acknowledge(
        &self,
        kind: PolicyKind,
        version: PolicyVersion,
        meta: AckMeta,
    ) -> Result<Vec<PolicyNotification>> {
        let flipped = self.ledger.acknowledge(self.user, kind, version, meta).await?;
        self.refresh().await;
        Ok(flipped)
    }

    pub async fn mark_read(&self, id: NotificationId) -> Result<PolicyNotification> {
        let row = self.notifications.mark_read(self.user, id).await?;
        self.state
            .write()
            .await
            .feed
            .apply(&NotificationEvent::Updated { row: row.clone() });
        Ok(row)
    }

    pub async fn dismiss(&self, id: NotificationId) -> Result<()> {
        self.notifications.dismiss(self.user, id).await?;
        self.state
            .write()
            .await
            .feed
            .apply(&NotificationEvent::Deleted { id });
        Ok(())
    }

    /// Apply one realtime event to the local feed.
    pub async fn apply_event(&self, event: &NotificationEvent) {
        self.state.write().await.feed.apply(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        LedgerError, MockAcknowledgmentLedger, MockNotificationStore, MockPolicyStore,
    };
    use chrono::Utc;

    fn policy(kind: PolicyKind, version: PolicyVersion, requires: bool) -> PolicyText {
        PolicyText {
            policy_id: uuid::Uuid::new_v4(),
            policy_kind: kind,
            version,
            title: format!("{kind} policy"),
            content: "text".to_string(),
            requires_acknowledgment: requires,
            is_active: true,
            last_updated: Utc::now(),
            updated_by: UserId::new(),
        }
    }

    fn ack(user: UserId, kind: PolicyKind, version: PolicyVersion) -> Acknowledgment {
        Acknowledgment {
            user_id: user,
            policy_kind: kind,
            acknowledged_version: version,
            acknowledged_at: Utc::now(),
            ip_address: None,
            user_agent: None,
        }
    }

    #[test]
    fn needs_acknowledgment_truth_table() {
        let user = UserId::new();
        let terms = policy(PolicyKind::Terms, PolicyVersion(11), true);
        let privacy = policy(PolicyKind::Privacy, PolicyVersion(10), false);

        // No ledger entry for terms: required.
        let state = SessionState::from_parts(
            vec![terms.clone(), privacy.clone()],
            vec![],
            vec![],
        );
        assert!(state.needs_acknowledgment(PolicyKind::Terms));
        // Policy does not require acknowledgment: never required.
        assert!(!state.needs_acknowledgment(PolicyKind::Privacy));
        // No active policy loaded for the kind: not required.
        assert!(!state.needs_acknowledgment(PolicyKind::CodeOfConduct));
        assert_eq!(state.required_kinds(), vec![PolicyKind::Terms]);
        assert!(state.has_pending_policies());

        // Lower acknowledged version: still required.
        let state = SessionState::from_parts(
            vec![terms.clone()],
            vec![ack(user, PolicyKind::Terms, PolicyVersion(10))],
            vec![],
        );
        assert!(state.needs_acknowledgment(PolicyKind::Terms));

        // Matching version: satisfied.
        let state = SessionState::from_parts(
            vec![terms],
            vec![ack(user, PolicyKind::Terms, PolicyVersion(11))],
            vec![],
        );
        assert!(!state.needs_acknowledgment(PolicyKind::Terms));
        assert!(!state.has_pending_policies());
    }

    #[test]
    fn snapshot_reduces_to_most_recent_row_per_kind() {
        let mut old = policy(PolicyKind::Terms, PolicyVersion(10), true);
        old.last_updated = Utc::now() - chrono::Duration::days(1);
        let new = policy(PolicyKind::Terms, PolicyVersion(11), true);

        let state = SessionState::from_parts(vec![old, new.clone()], vec![], vec![]);
        assert_eq!(state.policy(PolicyKind::Terms).unwrap().version, new.version);
    }

    #[tokio::test]
    async fn refresh_degrades_to_empty_on_fetch_error() {
        let mut policies = MockPolicyStore::new();
        policies
            .expect_load_current()
            .returning(|| Err(LedgerError::Internal("backend down".to_string())));
        let mut ledger = MockAcknowledgmentLedger::new();
        ledger
            .expect_for_user()
            .returning(|_| Err(LedgerError::Internal("backend down".to_string())));
        let mut notifications = MockNotificationStore::new();
        notifications
            .expect_pending()
            .returning(|_| Err(LedgerError::Internal("backend down".to_string())));

        let session = PolicySession::new(
            UserId::new(),
            Arc::new(policies),
            Arc::new(ledger),
            Arc::new(notifications),
        );
        session.refresh().await;

        assert!(!session.has_pending_policies().await);
        assert!(session.pending_notifications().await.is_empty());
    }

    #[tokio::test]
    async fn acknowledge_reloads_snapshot() {
        let user = UserId::new();
        let kind = PolicyKind::Terms;
        let version = PolicyVersion(11);

        let mut policies = MockPolicyStore::new();
        policies
            .expect_load_current()
            .returning(move || Ok(vec![policy(kind, version, true)]));
        let mut ledger = MockAcknowledgmentLedger::new();
        ledger
            .expect_for_user()
            .returning(move |_| Ok(vec![ack(user, kind, version)]));
        ledger
            .expect_acknowledge()
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));
        let mut notifications = MockNotificationStore::new();
        notifications.expect_pending().returning(|_| Ok(vec![]));

        let session = PolicySession::new(
            user,
            Arc::new(policies),
            Arc::new(ledger),
            Arc::new(notifications),
        );

        session
            .acknowledge(kind, version, AckMeta::default())
            .await
            .unwrap();
        assert!(!session.needs_acknowledgment(kind).await);
        assert_eq!(session.acknowledged_version(kind).await, Some(version));
    }
}
