//! Shared error hierarchy and HTTP status classification.
//!
//! Every wrapper surfaces failures through [`ApiError`] so that callers can
//! handle them uniformly:
//!
//! ```ignore
//! match client.reports_query(&query).await {
//!     Err(e) if e.is_quota_exceeded() => sleep_until_midnight(),
//!     Err(e) => tracing::warn!(error = %e, "query failed"),
//!     Ok(table) => process(table),
//! }
//! ```

use thiserror::Error;

// ============================================================================
// Reason vocabularies
// ============================================================================

/// Error-payload reasons that indicate an exhausted daily or per-user quota.
const QUOTA_REASONS: &[&str] = &[
    "quotaExceeded",
    "dailyLimitExceeded",
    "userRateLimitExceeded",
    "rateLimitExceeded",
];

/// Error-payload reasons that indicate a short-term rate limit.
const RATE_REASONS: &[&str] = &["userRateLimitExceeded", "rateLimitExceeded"];

// ============================================================================
// Error type
// ============================================================================

/// Error type for YouTube API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 - invalid credentials or OAuth scope revoked.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// 403 - caller authenticated but not allowed to access the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Daily project quota or per-user quota exhausted (HTTP 403).
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Short-term rate limit hit (HTTP 429 or 403 with a rate reason).
    ///
    /// Carries `retry_after` seconds when the API provided one so callers
    /// can back off.
    #[error("rate limited (retry after {retry_after:?} seconds): {message}")]
    RateLimited {
        /// Upstream error message.
        message: String,
        /// Seconds to wait before retrying, from the `Retry-After` header.
        retry_after: Option<u64>,
    },

    /// 400 / 404 - malformed query parameters or unknown resource ID.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A wrapper argument failed local validation before any request was made.
    #[error("{0}")]
    InvalidArgument(String),

    /// A response body did not have the shape the wrapper expected.
    #[error("invalid response data: {0}")]
    InvalidData(String),

    /// Any other non-2xx response.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Upstream error message.
        message: String,
    },

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV decode error (report downloads).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ApiError {
    /// Classify a non-2xx response into the matching error variant.
    ///
    /// Returns `None` when the status code is below 400. The `body` is the
    /// raw response text; the Google error payload's
    /// `error.errors[0].reason` field decides between quota and plain
    /// forbidden errors on 403.
    pub fn from_response(status: u16, body: &str, retry_after: Option<u64>) -> Option<Self> {
        if status < 400 {
            return None;
        }

        let reason = payload_reason(body).unwrap_or_else(|| "unknown".to_string());
        let message = format!("YouTube API error {status}: {body}");

        let err = match status {
            401 => Self::NotAuthorized(message),
            403 => {
                if QUOTA_REASONS.contains(&reason.as_str()) {
                    if RATE_REASONS.contains(&reason.as_str()) {
                        Self::RateLimited { message, retry_after }
                    } else {
                        Self::QuotaExceeded(message)
                    }
                } else {
                    Self::Forbidden(message)
                }
            }
            429 => Self::RateLimited { message, retry_after },
            400 | 404 => Self::InvalidRequest(message),
            _ => Self::Api { status, message },
        };

        Some(err)
    }

    /// Returns true for quota and rate-limit errors.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded(_) | Self::RateLimited { .. })
    }
}

/// Extract the `reason` field from Google's error payload.
fn payload_reason(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("errors")?
        .get(0)?
        .get("reason")?
        .as_str()
        .map(ToString::to_string)
}

// ============================================================================
// Tests
// ============================================================================
