//! OAuth token types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// OAuth scopes requested for every session.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/yt-analytics.readonly",
    "https://www.googleapis.com/auth/youtube.readonly",
];

/// Skew window: tokens this close to expiry count as expired so a refresh
/// lands before the API starts rejecting them.
const EXPIRY_SKEW_SECS: i64 = 60;

// ============================================================================
// Token Info
// ============================================================================

/// An OAuth token with its refresh capability and expiry.
///
/// This is what the token cache persists between runs; the file content is
/// an opaque blob as far as callers are concerned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Bearer access token.
    pub access_token: String,
    /// Refresh token, when the grant produced one.
    pub refresh_token: Option<String>,
    /// Expiry instant, when the grant reported one.
    pub expires_at: Option<DateTime<Utc>>,
    /// Granted scopes.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl TokenInfo {
    /// Creates a token expiring `expires_in_secs` from now.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: i64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: Some(Utc::now() + Duration::seconds(expires_in_secs)),
            scopes: Vec::new(),
        }
    }

    /// Creates a token with no expiry (treated as always valid).
    pub fn non_expiring(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
            scopes: Vec::new(),
        }
    }

    /// True when the token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|exp| exp <= Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS))
    }

    /// Build a token from a token-endpoint response.
    ///
    /// Refresh responses usually omit the refresh token; `previous_refresh`
    /// carries it forward so the session keeps its refresh capability.
    pub(crate) fn from_response(
        response: TokenResponse,
        previous_refresh: Option<String>,
    ) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: response
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
            scopes: response
                .scope
                .map(|s| s.split_whitespace().map(ToString::to_string).collect())
                .unwrap_or_default(),
        }
    }
}

/// Response body from the Google token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_expired_future() {
        let token = TokenInfo::new("t", None, 3600);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_is_expired_past() {
        let token = TokenInfo::new("t", None, -10);
        assert!(token.is_expired());
    }

    #[test]
    fn test_is_expired_within_skew() {
        // Expires in 30s, inside the 60s skew window.
        let token = TokenInfo::new("t", None, 30);
        assert!(token.is_expired());
    }

    #[test]
    fn test_is_expired_none() {
        let token = TokenInfo::non_expiring("t");
        assert!(!token.is_expired());
    }

    #[test]
    fn test_from_response_parses_scopes() {
        let response: TokenResponse = serde_json::from_str(
            r#"{
                "access_token": "abc",
                "expires_in": 3599,
                "refresh_token": "rrr",
                "scope": "https://a https://b",
                "token_type": "Bearer"
            }"#,
        )
        .unwrap();

        let token = TokenInfo::from_response(response, None);
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.refresh_token.as_deref(), Some("rrr"));
        assert_eq!(token.scopes, vec!["https://a", "https://b"]);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_from_response_keeps_previous_refresh() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "new", "expires_in": 3600}"#).unwrap();

        let token = TokenInfo::from_response(response, Some("old-refresh".into()));
        assert_eq!(token.refresh_token.as_deref(), Some("old-refresh"));
    }

    #[test]
    fn test_round_trips_through_json() {
        let token = TokenInfo::new("access", Some("refresh".into()), 3600);
        let json = serde_json::to_string(&token).unwrap();
        let back: TokenInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back.access_token, "access");
        assert_eq!(back.refresh_token.as_deref(), Some("refresh"));
    }
}
