//! Authorization guards shared by the handlers.

use crate::auth::AuthContext;
use crate::domain::UserId;

use super::error::{forbidden, ApiError, ErrorCode};

pub fn ensure_read(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.can_read() {
        Ok(())
    } else {
        Err(forbidden("Read permission required"))
    }
}

pub fn ensure_write(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.can_write() {
        Ok(())
    } else {
        Err(forbidden("Write permission required"))
    }
}

pub fn ensure_admin(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(forbidden("Admin permission required"))
    }
}

/// The user this request acts for.
///
/// The nil user (bootstrap admin, dev mode without credentials) owns no
/// ledger rows; user-scoped operations reject it before any I/O.
pub fn require_user(auth: &AuthContext) -> Result<UserId, ApiError> {
    if auth.user_id.is_nil() {
        Err(ApiError::new(
            ErrorCode::AuthRequired,
            "No authenticated user",
        ))
    } else {
        Ok(auth.user())
    }
}
