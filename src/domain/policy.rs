//! Policy document rows and publish inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PolicyKind, PolicyVersion, UserId};

/// One published version of a policy document.
///
/// Rows are deactivated when superseded, never deleted, so the full version
/// history of each kind stays queryable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyText {
    pub policy_id: Uuid,
    pub policy_kind: PolicyKind,
    pub version: PolicyVersion,
    pub title: String,
    pub content: String,
    pub requires_acknowledgment: bool,
    pub is_active: bool,
    pub last_updated: DateTime<Utc>,
    pub updated_by: UserId,
}

/// Input for publishing a new policy version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDraft {
    pub policy_kind: PolicyKind,
    pub title: String,
    pub content: String,
    pub requires_acknowledgment: bool,
}

impl PolicyDraft {
    pub fn new(
        policy_kind: PolicyKind,
        title: impl Into<String>,
        content: impl Into<String>,
        requires_acknowledgment: bool,
    ) -> Self {
        Self {
            policy_kind,
            title: title.into(),
            content: content.into(),
            requires_acknowledgment,
        }
    }

    /// Validate draft fields before they reach the store.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.content.trim().is_empty() {
            return Err("content must not be empty".to_string());
        }
        Ok(())
    }
}

/// Result of a successful publish: the new policy row plus the notification
/// fan-out performed in the same transaction.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub policy: PolicyText,
    pub notifications: Vec<super::PolicyNotification>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_validation() {
        let ok = PolicyDraft::new(PolicyKind::Terms, "Terms", "Be nice.", true);
        assert!(ok.validate().is_ok());

        let no_title = PolicyDraft::new(PolicyKind::Terms, "  ", "Be nice.", true);
        assert!(no_title.validate().is_err());

        let no_content = PolicyDraft::new(PolicyKind::Terms, "Terms", "", true);
        assert!(no_content.validate().is_err());
    }
}
