// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # ytkit Session
//!
//! The authenticated session layer shared by every ytkit client.
//!
//! A [`Session`] is created once per process - via the OAuth installed-app
//! flow, a service-account key, or a caller-supplied token - and handed to
//! the clients, which use it for every request. The session caches its
//! token on disk, refreshes it transparently, and retries transient GET
//! failures.
//!
//! ```ignore
//! use ytkit_session::Session;
//!
//! let session = Session::user_session("client_secrets.json", None).await?;
//! ```

pub mod error;
pub mod oauth;
pub mod retry;
pub mod session;
pub mod store;
pub mod token;

pub use error::SessionError;
pub use oauth::{ClientSecrets, ServiceAccountKey};
pub use retry::RetryPolicy;
pub use session::Session;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use token::{TokenInfo, SCOPES};
