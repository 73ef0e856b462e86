//! Session error types.

use thiserror::Error;
use ytkit_core::ApiError;

// ============================================================================
// Session Error
// ============================================================================

/// Error type for session and API operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// API-level failure (non-2xx response, validation, payload shape).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// OAuth flow failure (authorization, exchange, refresh).
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// The redirect's `state` parameter did not match the one we issued.
    #[error("OAuth state mismatch in authorization redirect")]
    StateMismatch,

    /// No cached token and no refresh capability.
    #[error("not authenticated; run the login flow first")]
    NotAuthenticated,

    /// Credential file missing or malformed.
    #[error("credential error: {0}")]
    Credentials(String),

    /// Service-account assertion signing failed.
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Token cache I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    /// Returns the underlying [`ApiError`], if this is an API failure.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}
