//! API key management handlers.

use axum::extract::{Extension, State};
use axum::Json;

use crate::api::auth_helpers::ensure_admin;
use crate::api::error::ApiError;
use crate::api::types::{CreateKeyRequest, CreateKeyResponse};
use crate::auth::{ApiKeyRecord, ApiKeyValidator, AuthContextExt, Permissions};
use crate::domain::UserId;
use crate::infra::UserDirectory;
use crate::server::AppState;

/// POST /api/v1/auth/keys - Mint an API key for a user.
///
/// Also ensures the user exists in the directory so publish fan-out and
/// stats see them.
pub async fn create_api_key(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
    Json(request): Json<CreateKeyRequest>,
) -> Result<Json<CreateKeyResponse>, ApiError> {
    ensure_admin(&auth)?;

    state
        .users
        .ensure_user(UserId::from_uuid(request.user_id))
        .await?;

    let (plaintext, key_hash) = ApiKeyValidator::generate_key(&request.user_id);
    let permissions = if request.admin {
        Permissions::admin()
    } else {
        Permissions::read_write()
    };

    state.api_keys.register_key(ApiKeyRecord {
        key_hash,
        user_id: request.user_id,
        permissions,
        active: true,
    });

    Ok(Json(CreateKeyResponse {
        api_key: plaintext,
        user_id: request.user_id,
        admin: request.admin,
    }))
}
