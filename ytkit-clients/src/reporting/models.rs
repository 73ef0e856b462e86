//! Reporting API wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An available bulk-report type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportType {
    /// Report-type ID (for example `channel_basic_a2`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// When the type will stop being generated, if deprecated.
    #[serde(default)]
    pub deprecate_time: Option<DateTime<Utc>>,
    /// Whether YouTube manages jobs of this type itself.
    #[serde(default)]
    pub system_managed: Option<bool>,
}

/// A reporting job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Job ID.
    pub id: String,
    /// Job name as given at creation.
    pub name: String,
    /// The report type this job generates.
    pub report_type_id: String,
    /// When the job was created.
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    /// When the job expires.
    #[serde(default)]
    pub expire_time: Option<DateTime<Utc>>,
    /// Whether YouTube created this job.
    #[serde(default)]
    pub system_managed: Option<bool>,
}

/// A generated report within a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Report ID.
    pub id: String,
    /// Owning job ID.
    #[serde(default)]
    pub job_id: Option<String>,
    /// Start of the period the report covers.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// End of the period the report covers.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// When the report was generated.
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    /// Media URL for the CSV content.
    #[serde(default)]
    pub download_url: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
