//! Policy Ledger Library
//!
//! Service for the policy acknowledgment and notification versioning flow:
//! versioned policy documents, per-user acknowledgment records, and
//! realtime update notifications.
//!
//! ## Modules
//!
//! - [`domain`] - Core domain types (policies, acknowledgments, notifications, stats)
//! - [`infra`] - Infrastructure implementations (PostgreSQL stores, retry)
//! - [`auth`] - Authentication (API keys)
//! - [`dispatch`] - Realtime notification broadcast hub
//! - [`session`] - Per-user session state and subscription lifecycle
//! - [`api`] - REST API routes
//! - [`server`] - Server bootstrap

pub mod api;
pub mod auth;
pub mod dispatch;
pub mod domain;
pub mod infra;
pub mod migrations;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use domain::{
    Acknowledgment, AckMeta, AcknowledgmentStats, NotificationEvent, NotificationId, PolicyDraft,
    PolicyKind, PolicyNotification, PolicyText, PolicyVersion, PublishOutcome, UserId,
};

pub use infra::{
    AcknowledgmentLedger, LedgerError, NotificationStore, PolicyStore, Result, StatsStore,
    UserDirectory,
};
