// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # ytkit Clients
//!
//! Endpoint-wrapper clients for the three YouTube APIs, all sharing one
//! authenticated [`Session`](ytkit_session::Session):
//!
//! - [`analytics::AnalyticsClient`] - `reports.query` plus helpers that
//!   pre-fill its parameters for common report shapes
//! - [`data::DataClient`] - the Data API `list` endpoints with pagination
//! - [`reporting::ReportingClient`] - bulk-report jobs and CSV downloads
//!
//! ```ignore
//! use std::sync::Arc;
//! use ytkit_clients::analytics::{AnalyticsClient, ReportsQuery};
//! use ytkit_session::Session;
//!
//! let session = Arc::new(Session::user_session("client_secrets.json", None).await?);
//! let analytics = AnalyticsClient::new(session);
//! let table = analytics
//!     .reports_query(&ReportsQuery::new().metrics(["views", "likes"]).dimensions(["day"]))
//!     .await?;
//! ```

pub mod analytics;
pub mod data;
pub mod reporting;

pub use analytics::{AnalyticsClient, ReportsQuery};
pub use data::{DataClient, ListParams, Page};
pub use reporting::{ReportingClient, ReportingOpts};
