//! Infrastructure layer for the policy ledger.
//!
//! Contains trait definitions and implementations for:
//! - Policy storage (versioned documents, atomic publish + fan-out)
//! - Acknowledgment ledger (per-user acceptance records)
//! - Notification storage (per-user update notifications)
//! - Stats rollups (admin completion reporting)
//! - Retry (transient database failures)

mod error;
pub mod postgres;
pub mod retry;
mod traits;

pub use error::*;
pub use postgres::{
    PgAcknowledgmentLedger, PgNotificationStore, PgPolicyStore, PgStatsStore, PgUserDirectory,
};
pub use traits::*;
