//! OAuth credential handling.
//!
//! Two ways to obtain a token:
//!
//! 1. **Installed-app flow** - authorization-code grant with PKCE: open the
//!    consent page in the system browser, catch the loopback redirect,
//!    exchange the code at the token endpoint.
//! 2. **Service account** - JWT-bearer grant: sign an RS256 assertion with
//!    the key file's private key and exchange it directly.
//!
//! Refreshing uses the standard refresh-token grant against the same token
//! endpoint.

use std::path::Path;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::SessionError;
use crate::token::{TokenInfo, TokenResponse};

// ============================================================================
// Constants
// ============================================================================

/// Google authorization endpoint.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// JWT-bearer grant type for service accounts.
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Characters allowed in PKCE verifiers and state values (RFC 7636
/// unreserved characters).
const VERIFIER_CHARS: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// PKCE verifier length (the RFC 7636 maximum).
const PKCE_VERIFIER_LENGTH: usize = 128;

/// State parameter length.
const STATE_LENGTH: usize = 32;

// ============================================================================
// Credential files
// ============================================================================

/// Parsed Google `client_secrets.json`.
///
/// The file wraps the credentials under an `installed` (desktop app) or
/// `web` key; both shapes are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret (not actually secret for installed apps).
    pub client_secret: String,
    /// Authorization endpoint.
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    /// Token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URL.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

#[derive(Debug, Deserialize)]
struct SecretsFile {
    #[serde(default)]
    installed: Option<ClientSecrets>,
    #[serde(default)]
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Parse a `client_secrets.json` document.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Credentials`] when neither an `installed`
    /// nor a `web` section is present.
    pub fn parse(json: &str) -> Result<Self, SessionError> {
        let file: SecretsFile = serde_json::from_str(json)?;
        file.installed.or(file.web).ok_or_else(|| {
            SessionError::Credentials(
                "client secrets file has no 'installed' or 'web' section".to_string(),
            )
        })
    }

    /// Load and parse a `client_secrets.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SessionError::Credentials(format!(
                "could not read client secrets at {}: {e}",
                path.display()
            ))
        })?;
        Self::parse(&content)
    }
}

/// Parsed service-account key file.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Credential type (expected `service_account`).
    #[serde(rename = "type")]
    pub key_type: String,
    /// Service-account email; becomes the JWT issuer.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Token endpoint; becomes the JWT audience.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Load and parse a service-account key file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SessionError::Credentials(format!(
                "could not read service account key at {}: {e}",
                path.display()
            ))
        })?;
        let key: Self = serde_json::from_str(&content)?;
        if key.key_type != "service_account" {
            return Err(SessionError::Credentials(format!(
                "expected a service_account key, got type {:?}",
                key.key_type
            )));
        }
        Ok(key)
    }
}

// The private key must never end up in logs.
impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// PKCE
// ============================================================================

/// PKCE verifier/challenge pair for the authorization-code flow.
#[derive(Debug, Clone)]
pub(crate) struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

impl Pkce {
    /// Generate a fresh verifier and its S256 challenge.
    pub fn generate() -> Self {
        let verifier = random_string(PKCE_VERIFIER_LENGTH);
        let digest = Sha256::digest(verifier.as_bytes());
        let challenge = URL_SAFE_NO_PAD.encode(digest);
        Self { verifier, challenge }
    }
}

fn random_string(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| {
            let idx = rng.random_range(0..VERIFIER_CHARS.len());
            VERIFIER_CHARS[idx] as char
        })
        .collect()
}

// ============================================================================
// Grants
// ============================================================================

/// Build the authorization URL for the consent page.
pub(crate) fn build_authorization_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    challenge: &str,
    state: &str,
    scopes: &[&str],
) -> Result<String, SessionError> {
    let mut url =
        Url::parse(&secrets.auth_uri).map_err(|e| SessionError::OAuth(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("client_id", &secrets.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &scopes.join(" "))
        .append_pair("code_challenge", challenge)
        .append_pair("code_challenge_method", "S256")
        .append_pair("state", state)
        // A refresh token is only issued for offline access.
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");
    Ok(url.into())
}

/// Exchange an authorization code for tokens.
#[instrument(skip_all)]
pub(crate) async fn exchange_code(
    http: &reqwest::Client,
    secrets: &ClientSecrets,
    redirect_uri: &str,
    code: &str,
    verifier: &str,
) -> Result<TokenInfo, SessionError> {
    debug!("exchanging authorization code");
    let params = [
        ("client_id", secrets.client_id.as_str()),
        ("client_secret", secrets.client_secret.as_str()),
        ("code", code),
        ("code_verifier", verifier),
        ("grant_type", "authorization_code"),
        ("redirect_uri", redirect_uri),
    ];
    token_request(http, &secrets.token_uri, &params, None).await
}

/// Refresh an access token using a refresh token.
#[instrument(skip_all)]
pub(crate) async fn refresh_token(
    http: &reqwest::Client,
    secrets: &ClientSecrets,
    refresh: &str,
) -> Result<TokenInfo, SessionError> {
    debug!("refreshing access token");
    let params = [
        ("client_id", secrets.client_id.as_str()),
        ("client_secret", secrets.client_secret.as_str()),
        ("refresh_token", refresh),
        ("grant_type", "refresh_token"),
    ];
    token_request(http, &secrets.token_uri, &params, Some(refresh.to_string())).await
}

/// JWT claim set for the service-account assertion.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Mint an access token from a service-account key (JWT-bearer grant).
#[instrument(skip_all, fields(client_email = %key.client_email))]
pub(crate) async fn service_account_token(
    http: &reqwest::Client,
    key: &ServiceAccountKey,
    scopes: &[&str],
) -> Result<TokenInfo, SessionError> {
    debug!("minting service account token");

    let now = Utc::now().timestamp();
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: scopes.join(" "),
        aud: &key.token_uri,
        iat: now,
        exp: now + 3600,
    };

    let header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
    let signing_key = jsonwebtoken::EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    let assertion = jsonwebtoken::encode(&header, &claims, &signing_key)?;

    let params = [
        ("grant_type", JWT_BEARER_GRANT),
        ("assertion", assertion.as_str()),
    ];
    token_request(http, &key.token_uri, &params, None).await
}

/// POST to the token endpoint and parse the response.
async fn token_request(
    http: &reqwest::Client,
    token_uri: &str,
    params: &[(&str, &str)],
    previous_refresh: Option<String>,
) -> Result<TokenInfo, SessionError> {
    let response = http.post(token_uri).form(params).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SessionError::OAuth(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    let parsed: TokenResponse = response.json().await?;
    Ok(TokenInfo::from_response(parsed, previous_refresh))
}

// ============================================================================
// Installed-app flow
// ============================================================================

/// Run the full installed-app authorization flow.
///
/// Binds a loopback listener, opens the consent page in the system browser,
/// waits for the redirect, validates the state parameter, and exchanges the
/// code for tokens.
#[instrument(skip_all)]
pub(crate) async fn run_installed_flow(
    http: &reqwest::Client,
    secrets: &ClientSecrets,
    scopes: &[&str],
) -> Result<TokenInfo, SessionError> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
    let redirect_uri = format!("http://127.0.0.1:{}", listener.local_addr()?.port());

    let pkce = Pkce::generate();
    let state = random_string(STATE_LENGTH);
    let auth_url =
        build_authorization_url(secrets, &redirect_uri, &pkce.challenge, &state, scopes)?;

    info!("opening browser for authorization");
    if webbrowser::open(&auth_url).is_err() {
        warn!("could not open a browser; visit this URL to authorize: {auth_url}");
    }

    let (code, returned_state) = wait_for_redirect(listener).await?;
    if returned_state.as_deref() != Some(state.as_str()) {
        return Err(SessionError::StateMismatch);
    }

    exchange_code(http, secrets, &redirect_uri, &code, &pkce.verifier).await
}

/// Accept one connection on the loopback listener and pull the
/// authorization code out of the redirect request.
async fn wait_for_redirect(
    listener: TcpListener,
) -> Result<(String, Option<String>), SessionError> {
    let (mut stream, _) = listener.accept().await?;

    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        // The query string lives in the request line; stop at end of headers.
        if buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.len() > 16 * 1024 {
            break;
        }
    }

    let text = String::from_utf8_lossy(&buf);
    let request_line = text
        .lines()
        .next()
        .ok_or_else(|| SessionError::OAuth("empty redirect request".to_string()))?;
    let path = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| SessionError::OAuth("malformed redirect request".to_string()))?;

    let url = Url::parse(&format!("http://127.0.0.1{path}"))
        .map_err(|e| SessionError::OAuth(format!("unparseable redirect: {e}")))?;

    let mut code = None;
    let mut state = None;
    let mut denial = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => denial = Some(value.into_owned()),
            _ => {}
        }
    }

    let body = "<html><body>Authorization complete. You may close this window.</body></html>";
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    let _ = stream.shutdown().await;

    if let Some(error) = denial {
        return Err(SessionError::OAuth(format!("authorization denied: {error}")));
    }
    code.map(|c| (c, state)).ok_or_else(|| {
        SessionError::OAuth("redirect did not include an authorization code".to_string())
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::SCOPES;

    fn test_secrets() -> ClientSecrets {
        ClientSecrets::parse(
            r#"{
                "installed": {
                    "client_id": "123.apps.googleusercontent.com",
                    "client_secret": "shhh",
                    "auth_uri": "https://accounts.google.com/o/oauth2/v2/auth",
                    "token_uri": "https://oauth2.googleapis.com/token",
                    "redirect_uris": ["http://localhost"]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_installed_secrets() {
        let secrets = test_secrets();
        assert_eq!(secrets.client_id, "123.apps.googleusercontent.com");
        assert_eq!(secrets.token_uri, GOOGLE_TOKEN_URL);
    }

    #[test]
    fn test_parse_web_secrets() {
        let secrets = ClientSecrets::parse(
            r#"{"web": {"client_id": "id", "client_secret": "s"}}"#,
        )
        .unwrap();
        assert_eq!(secrets.client_id, "id");
        // Endpoints default when the file omits them.
        assert_eq!(secrets.auth_uri, GOOGLE_AUTH_URL);
    }

    #[test]
    fn test_parse_rejects_empty_file() {
        assert!(matches!(
            ClientSecrets::parse("{}"),
            Err(SessionError::Credentials(_))
        ));
    }

    #[test]
    fn test_pkce_challenge_matches_verifier() {
        let pkce = Pkce::generate();
        assert_eq!(pkce.verifier.len(), PKCE_VERIFIER_LENGTH);

        let expected = URL_SAFE_NO_PAD.encode(Sha256::digest(pkce.verifier.as_bytes()));
        assert_eq!(pkce.challenge, expected);
    }

    #[test]
    fn test_pkce_is_random() {
        assert_ne!(Pkce::generate().verifier, Pkce::generate().verifier);
    }

    #[test]
    fn test_authorization_url() {
        let url = build_authorization_url(
            &test_secrets(),
            "http://127.0.0.1:7777",
            "challenge",
            "state123",
            SCOPES,
        )
        .unwrap();

        assert!(url.starts_with("https://accounts.google.com/"));
        assert!(url.contains("client_id=123.apps.googleusercontent.com"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("state=state123"));
        assert!(url.contains("access_type=offline"));
    }

    #[tokio::test]
    async fn test_refresh_round_trip_against_mock() {
        use wiremock::matchers::{body_string_contains, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=rrr"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        let mut secrets = test_secrets();
        secrets.token_uri = format!("{}/token", server.uri());

        let http = reqwest::Client::new();
        let token = refresh_token(&http, &secrets, "rrr").await.unwrap();

        assert_eq!(token.access_token, "fresh");
        // Refresh responses omit the refresh token; the old one carries over.
        assert_eq!(token.refresh_token.as_deref(), Some("rrr"));
    }

    #[tokio::test]
    async fn test_exchange_failure_surfaces_body() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
            )
            .mount(&server)
            .await;

        let mut secrets = test_secrets();
        secrets.token_uri = server.uri();

        let http = reqwest::Client::new();
        let err = refresh_token(&http, &secrets, "expired").await.unwrap_err();
        match err {
            SessionError::OAuth(message) => assert!(message.contains("invalid_grant")),
            other => panic!("expected OAuth error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wait_for_redirect_parses_code() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move {
            let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /?code=abc&state=xyz HTTP/1.1\r\nHost: x\r\n\r\n")
                .await
                .unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).await.unwrap();
            response
        });

        let (code, state) = wait_for_redirect(listener).await.unwrap();
        assert_eq!(code, "abc");
        assert_eq!(state.as_deref(), Some("xyz"));

        let response = client.await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK"));
    }

    #[tokio::test]
    async fn test_wait_for_redirect_reports_denial() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /?error=access_denied HTTP/1.1\r\n\r\n")
                .await
                .unwrap();
            let mut sink = Vec::new();
            let _ = stream.read_to_end(&mut sink).await;
        });

        let err = wait_for_redirect(listener).await.unwrap_err();
        assert!(matches!(err, SessionError::OAuth(_)));
    }
}
