//! Acknowledgment ledger rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PolicyKind, PolicyVersion, UserId};

/// One ledger row per `(user, policy_kind)`: the version of that policy the
/// user most recently accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgment {
    pub user_id: UserId,
    pub policy_kind: PolicyKind,
    pub acknowledged_version: PolicyVersion,
    pub acknowledged_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Client metadata captured alongside an acknowledgment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AckMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl AckMeta {
    pub fn new(ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            ip_address,
            user_agent,
        }
    }
}
