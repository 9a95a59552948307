//! Error types for the policy ledger infrastructure.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::{PolicyKind, PolicyVersion};

/// Errors that can occur in the policy ledger infrastructure
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No active policy for the requested kind
    #[error("no active policy for kind: {0}")]
    PolicyNotFound(PolicyKind),

    /// Notification not found (or not owned by the caller)
    #[error("notification not found: {0}")]
    NotificationNotFound(Uuid),

    /// Acknowledged version does not match the active policy version
    #[error("version mismatch for {kind}: active is {active}, got {given}")]
    VersionMismatch {
        kind: PolicyKind,
        active: PolicyVersion,
        given: PolicyVersion,
    },

    /// Unknown policy kind string from the wire or a stored row
    #[error("invalid policy kind: {0}")]
    InvalidPolicyKind(String),

    /// No authenticated user for a user-scoped operation
    #[error("no authenticated user")]
    Unauthenticated,

    /// Authorization error
    #[error("authorization error: {0}")]
    Unauthorized(String),

    /// Input validation error
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Whether a retry of the same idempotent operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LedgerError::Database(
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
            )
        )
    }
}

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;
