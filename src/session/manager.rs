//! Session lifecycle tied to the current identity.
//!
//! The hub subscription is the one long-lived shared resource in the flow.
//! It is owned by the active session and torn down whenever the identity
//! changes or becomes unknown, then re-established for the new identity.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::dispatch::NotificationHub;
use crate::domain::{AckMeta, PolicyKind, PolicyNotification, PolicyVersion, UserId};
use crate::infra::{
    AcknowledgmentLedger, LedgerError, NotificationStore, PolicyStore, Result,
};

use super::PolicySession;

struct ActiveSession {
    session: Arc<PolicySession>,
    pump: JoinHandle<()>,
}

/// Owns the active session, if any, and its hub subscription.
pub struct SessionManager {
    policies: Arc<dyn PolicyStore>,
    ledger: Arc<dyn AcknowledgmentLedger>,
    notifications: Arc<dyn NotificationStore>,
    hub: Arc<NotificationHub>,
    active: Mutex<Option<ActiveSession>>,
}

impl SessionManager {
    pub fn new(
        policies: Arc<dyn PolicyStore>,
        ledger: Arc<dyn AcknowledgmentLedger>,
        notifications: Arc<dyn NotificationStore>,
        hub: Arc<NotificationHub>,
    ) -> Self {
        Self {
            policies,
            ledger,
            notifications,
            hub,
            active: Mutex::new(None),
        }
    }

    /// React to a sign-in/sign-out transition.
    ///
    /// Always tears down the previous subscription. For `Some(user)`, loads
    /// a fresh session and spawns a pump task that applies this user's hub
    /// events to the feed; a lagged receiver falls back to a full reload.
    pub async fn set_identity(&self, user: Option<UserId>) -> Option<Arc<PolicySession>> {
        let mut active = self.active.lock().await;
        if let Some(prev) = active.take() {
            debug!(user = %prev.session.user(), "tearing down session subscription");
            prev.pump.abort();
        }

        let user = user?;
        let session = Arc::new(PolicySession::new(
            user,
            self.policies.clone(),
            self.ledger.clone(),
            self.notifications.clone(),
        ));
        session.refresh().await;

        let mut rx = self.hub.subscribe();
        let pump = tokio::spawn({
            let session = session.clone();
            async move {
                loop {
                    match rx.recv().await {
                        Ok(update) => {
                            if update.user_id == session.user() {
                                session.apply_event(&update.event).await;
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(user = %session.user(), skipped, "subscription lagged, reloading");
                            session.refresh().await;
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        });

        *active = Some(ActiveSession {
            session: session.clone(),
            pump,
        });
        Some(session)
    }

    /// The active session, if an identity is set.
    pub async fn current(&self) -> Option<Arc<PolicySession>> {
        self.active.lock().await.as_ref().map(|a| a.session.clone())
    }

    /// Acknowledge on behalf of the active session.
    ///
    /// Short-circuits with a typed error before any I/O when no identity is
    /// set. Broadcasts the flipped notification rows after the write.
    pub async fn acknowledge(
        &self,
        kind: PolicyKind,
        version: PolicyVersion,
        meta: AckMeta,
    ) -> Result<Vec<PolicyNotification>> {
        let session = self.current().await.ok_or(LedgerError::Unauthenticated)?;
        let flipped = session.acknowledge(kind, version, meta).await?;
        self.hub.publish_updated(flipped.clone());
        Ok(flipped)
    }
}
