//! Denormalized acknowledgment completion rollups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PolicyKind, PolicyVersion};

/// One rollup row per `(policy_kind, version)`.
///
/// Derived data: recomputed in full by an admin-triggered recalculation,
/// never updated incrementally. Displayed values can be arbitrarily stale
/// between recalculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcknowledgmentStats {
    pub policy_kind: PolicyKind,
    pub version: PolicyVersion,
    pub total_users: u64,
    pub acknowledged_count: u64,
    pub pending_count: u64,
    pub last_updated: DateTime<Utc>,
}

impl AcknowledgmentStats {
    /// Completion ratio in `[0, 1]`, or `None` when there are no users.
    pub fn completion_rate(&self) -> Option<f64> {
        if self.total_users == 0 {
            None
        } else {
            Some(self.acknowledged_count as f64 / self.total_users as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn completion_rate_handles_empty_platform() {
        let stats = AcknowledgmentStats {
            policy_kind: PolicyKind::Terms,
            version: PolicyVersion::INITIAL,
            total_users: 0,
            acknowledged_count: 0,
            pending_count: 0,
            last_updated: Utc::now(),
        };
        assert_eq!(stats.completion_rate(), None);

        let stats = AcknowledgmentStats {
            total_users: 10,
            acknowledged_count: 6,
            pending_count: 4,
            ..stats
        };
        assert_eq!(stats.completion_rate(), Some(0.6));
    }
}
