//! YouTube Reporting API (v1) client.

pub mod client;
pub mod models;

pub use client::{ReportingClient, ReportingOpts, REPORTING_BASE_URL};
pub use models::{Job, Report, ReportType};
