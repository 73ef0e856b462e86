//! The authenticated session.
//!
//! A [`Session`] is created once per process and shared by every client.
//! It owns the HTTP client, the token cache, and the retry policy, and it
//! refreshes the access token transparently whenever it expires.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Method, Response};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use ytkit_core::ApiError;

use crate::error::SessionError;
use crate::oauth::{self, ClientSecrets, ServiceAccountKey};
use crate::retry::RetryPolicy;
use crate::store::{FileTokenStore, MemoryTokenStore, TokenStore};
use crate::token::{TokenInfo, SCOPES};

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// Session
// ============================================================================

/// How the session obtains a fresh access token.
enum Refresher {
    /// Refresh-token grant against the user's OAuth client.
    UserOAuth(ClientSecrets),
    /// Re-mint via the service-account JWT-bearer grant.
    ServiceAccount(ServiceAccountKey),
    /// A fixed token that cannot be refreshed.
    Static,
}

/// An authenticated, token-refreshing handle to the YouTube APIs.
pub struct Session {
    http: reqwest::Client,
    store: Arc<dyn TokenStore>,
    refresher: Refresher,
    retry: RetryPolicy,
    /// In-memory copy of the cached token; avoids a disk read per request.
    token: RwLock<Option<TokenInfo>>,
}

impl Session {
    /// Create a session via the OAuth installed-app flow.
    ///
    /// Loads the cached token from `token_cache` (default:
    /// `<config dir>/ytkit/token.json`) and refreshes it silently when
    /// expired. When there is no usable cached token the interactive
    /// browser flow runs and the result is cached.
    ///
    /// # Errors
    ///
    /// Fails when the client secrets cannot be read, the authorization
    /// flow is denied, or the token cache cannot be written.
    #[instrument(skip_all)]
    pub async fn user_session(
        client_secrets: impl AsRef<Path>,
        token_cache: Option<PathBuf>,
    ) -> Result<Self, SessionError> {
        let secrets = ClientSecrets::from_file(client_secrets)?;
        let store: Arc<dyn TokenStore> = match token_cache {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => Arc::new(FileTokenStore::at_default()?),
        };
        let http = build_http()?;

        let token = match store.load().await? {
            Some(cached) if !cached.is_expired() => {
                debug!("using cached token");
                cached
            }
            Some(cached) => match cached.refresh_token.clone() {
                Some(refresh) => match oauth::refresh_token(&http, &secrets, &refresh).await {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        warn!(error = %e, "token refresh failed; rerunning authorization");
                        oauth::run_installed_flow(&http, &secrets, SCOPES).await?
                    }
                },
                None => oauth::run_installed_flow(&http, &secrets, SCOPES).await?,
            },
            None => oauth::run_installed_flow(&http, &secrets, SCOPES).await?,
        };
        store.save(&token).await?;

        Ok(Self {
            http,
            store,
            refresher: Refresher::UserOAuth(secrets),
            retry: RetryPolicy::default(),
            token: RwLock::new(Some(token)),
        })
    }

    /// Create a session from a service-account key file.
    ///
    /// Tokens are minted on demand via the JWT-bearer grant and kept in
    /// memory only.
    ///
    /// # Errors
    ///
    /// Fails when the key file cannot be read or is not a service-account
    /// key.
    pub async fn service_account_session(
        key_path: impl AsRef<Path>,
    ) -> Result<Self, SessionError> {
        let key = ServiceAccountKey::from_file(key_path)?;
        Ok(Self {
            http: build_http()?,
            store: Arc::new(MemoryTokenStore::new()),
            refresher: Refresher::ServiceAccount(key),
            retry: RetryPolicy::default(),
            token: RwLock::new(None),
        })
    }

    /// Create a session around a caller-supplied access token.
    ///
    /// The token is never refreshed; useful for tests and short scripts
    /// that already hold a valid token.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be built.
    pub fn from_token(access_token: impl Into<String>) -> Result<Self, SessionError> {
        let token = TokenInfo::non_expiring(access_token);
        Ok(Self {
            http: build_http()?,
            store: Arc::new(MemoryTokenStore::with_token(token.clone())),
            refresher: Refresher::Static,
            retry: RetryPolicy::default(),
            token: RwLock::new(Some(token)),
        })
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Remove the cached token.
    pub async fn logout(&self) -> Result<(), SessionError> {
        *self.token.write().await = None;
        self.store.clear().await
    }

    // ------------------------------------------------------------------
    // Requests
    // ------------------------------------------------------------------

    /// GET a JSON document.
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<serde_json::Value, SessionError> {
        let response = self.execute(Method::GET, url, query, None).await?;
        Ok(response.json().await?)
    }

    /// GET raw bytes (report downloads).
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, SessionError> {
        let response = self.execute(Method::GET, url, &[], None).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// POST a JSON body, returning the JSON response.
    pub async fn post_json(
        &self,
        url: &str,
        query: &[(String, String)],
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, SessionError> {
        let response = self.execute(Method::POST, url, query, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// DELETE a resource; any 2xx counts as success.
    pub async fn delete(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<(), SessionError> {
        self.execute(Method::DELETE, url, query, None).await?;
        Ok(())
    }

    /// Issue one authenticated request, retrying transient GET failures.
    #[instrument(skip(self, query, body), fields(method = %method))]
    async fn execute(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<Response, SessionError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let token = self.access_token().await?;

            debug!(url = %url, attempt, "sending request");
            let mut request = self
                .http
                .request(method.clone(), url)
                .query(query)
                .bearer_auth(&token);
            if let Some(json) = body {
                request = request.json(json);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let retry_after = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse().ok());

                    // Only idempotent reads get retried.
                    if method == Method::GET
                        && RetryPolicy::retries_status(status.as_u16())
                        && attempt < self.retry.max_attempts
                    {
                        let delay = retry_after
                            .map(Duration::from_secs)
                            .unwrap_or_else(|| self.retry.delay_for_attempt(attempt));
                        warn!(
                            status = status.as_u16(),
                            delay_secs = delay.as_secs_f64(),
                            "transient failure, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let text = response.text().await.unwrap_or_default();
                    let error = match ApiError::from_response(status.as_u16(), &text, retry_after)
                    {
                        Some(classified) => classified,
                        None => ApiError::Api {
                            status: status.as_u16(),
                            message: text,
                        },
                    };
                    return Err(error.into());
                }
                Err(e) => {
                    if attempt < self.retry.max_attempts && self.retry.should_retry(&e) {
                        let delay = self.retry.delay_for_attempt(attempt);
                        warn!(error = %e, delay_secs = delay.as_secs_f64(), "request failed, retrying");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Token management
    // ------------------------------------------------------------------

    /// Return a valid access token, refreshing it first when needed.
    async fn access_token(&self) -> Result<String, SessionError> {
        {
            let guard = self.token.read().await;
            if let Some(token) = guard.as_ref() {
                if !token.is_expired() {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut guard = self.token.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(token) = guard.as_ref() {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
        }

        let stored = match guard.as_ref() {
            Some(token) => Some(token.clone()),
            None => self.store.load().await?,
        };

        let fresh = match stored {
            Some(token) if !token.is_expired() => token,
            stale => self.mint(stale).await?,
        };

        self.store.save(&fresh).await?;
        let access = fresh.access_token.clone();
        *guard = Some(fresh);
        Ok(access)
    }

    /// Obtain a brand-new token through whatever grant this session has.
    async fn mint(&self, previous: Option<TokenInfo>) -> Result<TokenInfo, SessionError> {
        match &self.refresher {
            Refresher::UserOAuth(secrets) => {
                let refresh = previous
                    .and_then(|t| t.refresh_token)
                    .ok_or(SessionError::NotAuthenticated)?;
                oauth::refresh_token(&self.http, secrets, &refresh).await
            }
            Refresher::ServiceAccount(key) => {
                oauth::service_account_token(&self.http, key, SCOPES).await
            }
            Refresher::Static => Err(SessionError::NotAuthenticated),
        }
    }
}

fn build_http() -> Result<reqwest::Client, SessionError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(concat!("ytkit/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_json_sends_bearer_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/reports"))
            .and(header("authorization", "Bearer tok"))
            .and(query_param("ids", "channel==MINE"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"rows": []})),
            )
            .mount(&server)
            .await;

        let session = Session::from_token("tok").unwrap();
        let value = session
            .get_json(
                &format!("{}/v2/reports", server.uri()),
                &[("ids".to_string(), "channel==MINE".to_string())],
            )
            .await
            .unwrap();

        assert!(value["rows"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_2xx_classifies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                r#"{"error":{"errors":[{"reason":"quotaExceeded"}]}}"#,
            ))
            .mount(&server)
            .await;

        let session = Session::from_token("tok")
            .unwrap()
            .with_retry_policy(RetryPolicy::no_retry());
        let err = session.get_json(&server.uri(), &[]).await.unwrap_err();

        assert!(matches!(
            err.as_api(),
            Some(ApiError::QuotaExceeded(_))
        ));
    }

    #[tokio::test]
    async fn test_get_retries_transient_statuses() {
        let server = MockServer::start().await;
        // First attempt fails with 503, all later ones succeed.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let session = Session::from_token("tok").unwrap().with_retry_policy(
            RetryPolicy::new(3).with_base_delay(Duration::from_millis(1)),
        );
        let value = session.get_json(&server.uri(), &[]).await.unwrap();
        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn test_delete_succeeds_on_204() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let session = Session::from_token("tok").unwrap();
        session.delete(&server.uri(), &[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_static_session_cannot_refresh() {
        let session = Session::from_token("tok").unwrap();
        session.logout().await.unwrap();

        let err = session.access_token().await.unwrap_err();
        assert!(matches!(err, SessionError::NotAuthenticated));
    }
}
