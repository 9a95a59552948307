//! Request and response types for the REST API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{PolicyKind, PolicyVersion};

/// Body for `POST /api/v1/policies/:kind/publish`.
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub title: String,
    pub content: String,
    #[serde(default = "default_true")]
    pub requires_acknowledgment: bool,
}

fn default_true() -> bool {
    true
}

/// Body for `POST /api/v1/acknowledgments`.
#[derive(Debug, Deserialize)]
pub struct AcknowledgeRequest {
    pub policy_kind: PolicyKind,
    pub version: PolicyVersion,
}

/// Response for `GET /api/v1/acknowledgments/required`.
#[derive(Debug, Serialize)]
pub struct RequiredResponse {
    pub required: Vec<PolicyKind>,
    pub has_pending: bool,
}

/// Body for `POST /api/v1/auth/keys`.
#[derive(Debug, Deserialize)]
pub struct CreateKeyRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub admin: bool,
}

/// Response for `POST /api/v1/auth/keys`: the plaintext key is returned
/// exactly once, only its hash is retained.
#[derive(Debug, Serialize)]
pub struct CreateKeyResponse {
    pub api_key: String,
    pub user_id: Uuid,
    pub admin: bool,
}
