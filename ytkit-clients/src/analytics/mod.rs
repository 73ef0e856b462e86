//! YouTube Analytics API (v2) client.
//!
//! [`AnalyticsClient`] wraps the `reports.query` endpoint; most of its
//! methods pre-fill the query for a particular report shape (geography,
//! devices, traffic sources, ...) and return a [`ytkit_core::Table`].

pub mod client;
pub mod fields;
pub mod query;

pub use client::{AnalyticsClient, ANALYTICS_BASE_URL};
pub use query::ReportsQuery;
