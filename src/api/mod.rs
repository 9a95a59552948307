//! REST API for the policy ledger.

pub mod auth_helpers;
pub mod error;
pub mod handlers;
pub mod rest;
pub mod types;

pub use error::{ApiError, ErrorCode};
pub use rest::router;
