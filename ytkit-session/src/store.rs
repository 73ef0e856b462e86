//! Token cache backends.
//!
//! The session persists its token through a [`TokenStore`] so that a
//! process restart does not force a new authorization. [`FileTokenStore`]
//! is the default (a JSON file under the user config directory);
//! [`MemoryTokenStore`] backs tests and bring-your-own-token sessions.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::SessionError;
use crate::token::TokenInfo;

// ============================================================================
// Trait
// ============================================================================

/// Async persistence for a single cached token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the cached token, if any.
    async fn load(&self) -> Result<Option<TokenInfo>, SessionError>;

    /// Persist the token.
    async fn save(&self, token: &TokenInfo) -> Result<(), SessionError>;

    /// Remove the cached token.
    async fn clear(&self) -> Result<(), SessionError>;

    /// Backend name for diagnostics.
    fn name(&self) -> &str {
        "store"
    }
}

// ============================================================================
// File backend
// ============================================================================

/// Token cache stored as a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default cache location (`<config dir>/ytkit/token.json`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ytkit").join("token.json"))
    }

    /// Creates a store at the default cache location.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Credentials`] when no config directory can
    /// be determined for this platform.
    pub fn at_default() -> Result<Self, SessionError> {
        Self::default_path().map(Self::new).ok_or_else(|| {
            SessionError::Credentials("could not determine a config directory".to_string())
        })
    }

    /// The cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<TokenInfo>, SessionError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let token = serde_json::from_str(&content)?;
                debug!(path = %self.path.display(), "loaded cached token");
                Ok(Some(token))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, token: &TokenInfo) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&self.path, content).await?;
        debug!(path = %self.path.display(), "saved token");
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &str {
        "file"
    }
}

// ============================================================================
// Memory backend
// ============================================================================

/// In-memory token cache for tests and static-token sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: RwLock<Option<TokenInfo>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with a token.
    pub fn with_token(token: TokenInfo) -> Self {
        Self {
            inner: RwLock::new(Some(token)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<TokenInfo>, SessionError> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, token: &TokenInfo) -> Result<(), SessionError> {
        *self.inner.write().await = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.inner.write().await = None;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_round_trip() {
        let store = MemoryTokenStore::new();
        assert!(store.load().await.unwrap().is_none());

        let token = TokenInfo::new("access", Some("refresh".into()), 3600);
        store.save(&token).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "access");

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("token.json"));

        assert!(store.load().await.unwrap().is_none());

        let token = TokenInfo::new("access", Some("refresh".into()), 3600);
        store.save(&token).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "access");
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh"));
    }

    #[tokio::test]
    async fn test_file_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));

        store.clear().await.unwrap();
        store.save(&TokenInfo::non_expiring("t")).await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[test]
    fn test_default_path_shape() {
        if let Some(path) = FileTokenStore::default_path() {
            assert!(path.ends_with("ytkit/token.json"));
        }
    }
}
