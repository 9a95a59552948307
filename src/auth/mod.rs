//! Authentication and authorization for the policy ledger.
//!
//! The platform's identity provider is external; this service only needs to
//! know *which* user a request acts for and whether the key grants admin
//! operations.
//!
//! # Authentication
//!
//! API keys: SHA-256 hashed, `pk_` prefixed, scoped to one user. The
//! bootstrap admin key comes from `BOOTSTRAP_ADMIN_API_KEY`; further keys
//! are minted through the admin API.
//!
//! # Authorization model
//!
//! - `read`: load policies, own ledger, own notifications
//! - `write`: acknowledge, mark read, dismiss
//! - `admin`: publish policies, read history, stats, mint keys
//!
//! # Configuration
//!
//! - `AUTH_MODE`: `required` (default) or `disabled` for development
//! - `BOOTSTRAP_ADMIN_API_KEY`: initial admin key
//! - `RATE_LIMIT_PER_MINUTE`: optional per-key rate limit

mod api_key;
mod middleware;

pub use api_key::*;
pub use middleware::*;

use uuid::Uuid;

use crate::domain::UserId;

/// Authentication context extracted from a request
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User this request acts for
    pub user_id: Uuid,

    /// Allowed operations
    pub permissions: Permissions,
}

/// Permission flags for operations
#[derive(Debug, Clone, Default)]
pub struct Permissions {
    pub read: bool,
    pub write: bool,
    pub admin: bool,
}

impl Permissions {
    pub fn read_only() -> Self {
        Self {
            read: true,
            write: false,
            admin: false,
        }
    }

    pub fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            admin: false,
        }
    }

    pub fn admin() -> Self {
        Self {
            read: true,
            write: true,
            admin: true,
        }
    }
}

impl AuthContext {
    pub fn user(&self) -> UserId {
        UserId::from_uuid(self.user_id)
    }

    pub fn can_read(&self) -> bool {
        self.permissions.read
    }

    pub fn can_write(&self) -> bool {
        self.permissions.write
    }

    pub fn is_admin(&self) -> bool {
        self.permissions.admin
    }
}

/// Authentication error
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing authentication")]
    MissingAuth,

    #[error("invalid API key")]
    InvalidApiKey,

    #[error("insufficient permissions")]
    InsufficientPermissions,

    #[error("rate limit exceeded")]
    RateLimited,
}
