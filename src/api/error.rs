//! Structured API error responses with error codes.
//!
//! Consistent error handling across all endpoints with machine-readable
//! error codes and human-readable messages.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Error codes for API responses
///
/// These codes are stable and can be used by clients for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication errors (1xxx)
    /// No authentication credentials provided
    AuthRequired,
    /// Invalid API key format or value
    InvalidApiKey,
    /// Insufficient permissions for this operation
    InsufficientPermissions,

    // Rate limiting errors (2xxx)
    /// Too many requests, rate limit exceeded
    RateLimitExceeded,

    // Validation errors (3xxx)
    /// Request body is malformed
    InvalidRequestBody,
    /// Field value is invalid
    InvalidFieldValue,

    // Resource errors (4xxx)
    /// Requested resource not found
    ResourceNotFound,
    /// No active policy for the requested kind
    PolicyNotFound,
    /// Notification not found
    NotificationNotFound,

    // Conflict errors (5xxx)
    /// Acknowledged version does not match the active policy version
    VersionMismatch,

    // Infrastructure errors (8xxx)
    /// Database operation failed
    DatabaseError,
    /// External service unavailable
    ServiceUnavailable,
    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn numeric_code(&self) -> u32 {
        match self {
            ErrorCode::AuthRequired => 1001,
            ErrorCode::InvalidApiKey => 1002,
            ErrorCode::InsufficientPermissions => 1003,

            ErrorCode::RateLimitExceeded => 2001,

            ErrorCode::InvalidRequestBody => 3001,
            ErrorCode::InvalidFieldValue => 3002,

            ErrorCode::ResourceNotFound => 4001,
            ErrorCode::PolicyNotFound => 4002,
            ErrorCode::NotificationNotFound => 4003,

            ErrorCode::VersionMismatch => 5001,

            ErrorCode::DatabaseError => 8001,
            ErrorCode::ServiceUnavailable => 8002,
            ErrorCode::InternalError => 8999,
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::AuthRequired => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidApiKey => StatusCode::UNAUTHORIZED,
            ErrorCode::InsufficientPermissions => StatusCode::FORBIDDEN,

            ErrorCode::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,

            ErrorCode::InvalidRequestBody => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidFieldValue => StatusCode::BAD_REQUEST,

            ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorCode::PolicyNotFound => StatusCode::NOT_FOUND,
            ErrorCode::NotificationNotFound => StatusCode::NOT_FOUND,

            ErrorCode::VersionMismatch => StatusCode::CONFLICT,

            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code_str = match self {
            ErrorCode::AuthRequired => "AUTH_REQUIRED",
            ErrorCode::InvalidApiKey => "INVALID_API_KEY",
            ErrorCode::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::InvalidRequestBody => "INVALID_REQUEST_BODY",
            ErrorCode::InvalidFieldValue => "INVALID_FIELD_VALUE",
            ErrorCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorCode::PolicyNotFound => "POLICY_NOT_FOUND",
            ErrorCode::NotificationNotFound => "NOTIFICATION_NOT_FOUND",
            ErrorCode::VersionMismatch => "VERSION_MISMATCH",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", code_str)
    }
}

/// Structured error response for API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error details
    pub error: ErrorDetails,
}

/// Detailed error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Numeric error code for easy categorization
    pub numeric_code: u32,

    /// Human-readable error message
    pub message: String,

    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Related resource ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetails {
                code,
                numeric_code: code.numeric_code(),
                message: message.into(),
                details: None,
                resource_id: None,
            },
        }
    }

    /// Set additional details
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }

    /// Set related resource ID
    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.error.resource_id = Some(id.into());
        self
    }

    /// Get the HTTP status code
    pub fn status(&self) -> StatusCode {
        self.error.code.http_status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code_str = self.error.code.to_string();
        let mut response = (status, Json(self)).into_response();

        // Error code header for easier debugging
        if let Ok(code_value) = axum::http::HeaderValue::from_str(&code_str) {
            response.headers_mut().insert(
                axum::http::header::HeaderName::from_static("x-error-code"),
                code_value,
            );
        }

        response
    }
}

impl From<crate::infra::LedgerError> for ApiError {
    fn from(err: crate::infra::LedgerError) -> Self {
        use crate::infra::LedgerError;

        match err {
            LedgerError::Database(e) => {
                ApiError::new(ErrorCode::DatabaseError, format!("Database error: {}", e))
            }
            LedgerError::PolicyNotFound(kind) => ApiError::new(
                ErrorCode::PolicyNotFound,
                format!("No active policy for kind: {}", kind),
            )
            .with_resource_id(kind.to_string()),
            LedgerError::NotificationNotFound(id) => ApiError::new(
                ErrorCode::NotificationNotFound,
                format!("Notification not found: {}", id),
            )
            .with_resource_id(id.to_string()),
            LedgerError::VersionMismatch {
                kind,
                active,
                given,
            } => ApiError::new(
                ErrorCode::VersionMismatch,
                format!(
                    "Version mismatch for {}: active is {}, got {}",
                    kind, active, given
                ),
            )
            .with_details(serde_json::json!({
                "policy_kind": kind,
                "active_version": active,
                "given_version": given
            })),
            LedgerError::InvalidPolicyKind(k) => ApiError::new(
                ErrorCode::InvalidFieldValue,
                format!("Invalid policy kind: {}", k),
            ),
            LedgerError::Unauthenticated => {
                ApiError::new(ErrorCode::AuthRequired, "No authenticated user")
            }
            LedgerError::Unauthorized(msg) => {
                ApiError::new(ErrorCode::InsufficientPermissions, msg)
            }
            LedgerError::Validation(msg) => ApiError::new(ErrorCode::InvalidFieldValue, msg),
            LedgerError::Internal(msg) => ApiError::new(ErrorCode::InternalError, msg),
        }
    }
}

/// Create a validation error with field details
pub fn validation_error(field: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(ErrorCode::InvalidFieldValue, message.into()).with_details(serde_json::json!({
        "field": field
    }))
}

/// Create a forbidden error
pub fn forbidden(message: impl Into<String>) -> ApiError {
    ApiError::new(ErrorCode::InsufficientPermissions, message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PolicyKind, PolicyVersion};
    use crate::infra::LedgerError;

    #[test]
    fn test_error_code_numeric() {
        assert_eq!(ErrorCode::AuthRequired.numeric_code(), 1001);
        assert_eq!(ErrorCode::RateLimitExceeded.numeric_code(), 2001);
        assert_eq!(ErrorCode::InvalidRequestBody.numeric_code(), 3001);
        assert_eq!(ErrorCode::PolicyNotFound.numeric_code(), 4002);
        assert_eq!(ErrorCode::VersionMismatch.numeric_code(), 5001);
        assert_eq!(ErrorCode::InternalError.numeric_code(), 8999);
    }

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::AuthRequired.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ErrorCode::InsufficientPermissions.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ErrorCode::PolicyNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::VersionMismatch.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_version_mismatch_conversion() {
        let err = LedgerError::VersionMismatch {
            kind: PolicyKind::Terms,
            active: PolicyVersion(11),
            given: PolicyVersion(10),
        };
        let api: ApiError = err.into();
        assert_eq!(api.error.code, ErrorCode::VersionMismatch);
        assert!(api.error.details.is_some());
    }

    #[test]
    fn test_error_serialization() {
        let error = ApiError::new(ErrorCode::PolicyNotFound, "No active policy");
        let json = serde_json::to_string(&error).unwrap();

        assert!(json.contains("POLICY_NOT_FOUND"));
        assert!(json.contains("No active policy"));
        assert!(json.contains("4002"));
    }
}
