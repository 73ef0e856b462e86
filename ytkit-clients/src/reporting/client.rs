//! YouTube Reporting API client.
//!
//! Bulk reports are asynchronous on Google's side: a *job* is registered
//! for a report type, YouTube generates dated *reports* under it, and each
//! report is downloaded as CSV. [`ReportingClient`] wraps that lifecycle
//! and [`get_latest_report`](ReportingClient::get_latest_report) collapses
//! it into one call.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use ytkit_core::{ApiError, Table};
use ytkit_session::{Session, SessionError};

use super::models::{Job, Report, ReportType};

/// The Reporting API base URL.
pub const REPORTING_BASE_URL: &str = "https://youtubereporting.googleapis.com/v1";

// ============================================================================
// Options
// ============================================================================

/// Options shared by the Reporting list endpoints.
#[derive(Debug, Clone, Default)]
pub struct ReportingOpts {
    include_system_managed: Option<bool>,
    page_size: Option<u32>,
    page_token: Option<String>,
    on_behalf_of_content_owner: Option<String>,
}

impl ReportingOpts {
    /// Creates empty options (API defaults apply).
    pub fn new() -> Self {
        Self::default()
    }

    /// Include report types/jobs that YouTube manages itself.
    #[must_use]
    pub fn include_system_managed(mut self, include: bool) -> Self {
        self.include_system_managed = Some(include);
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Sets the continuation token from a previous page.
    #[must_use]
    pub fn page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }

    /// CMS content-owner ID when acting on behalf of a partner account.
    #[must_use]
    pub fn on_behalf_of_content_owner(mut self, owner: impl Into<String>) -> Self {
        self.on_behalf_of_content_owner = Some(owner.into());
        self
    }

    /// Produce the wire query parameters.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(include) = self.include_system_managed {
            pairs.push(("includeSystemManaged".to_string(), include.to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("pageSize".to_string(), size.to_string()));
        }
        if let Some(token) = &self.page_token {
            pairs.push(("pageToken".to_string(), token.clone()));
        }
        if let Some(owner) = &self.on_behalf_of_content_owner {
            pairs.push(("onBehalfOfContentOwner".to_string(), owner.clone()));
        }
        pairs
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client for the YouTube Reporting API.
pub struct ReportingClient {
    session: Arc<Session>,
    base_url: String,
}

impl ReportingClient {
    /// Creates a client on the shared session.
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            base_url: REPORTING_BASE_URL.to_string(),
        }
    }

    /// Overrides the endpoint URL (tests).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    // ------------------------------------------------------------------
    // Report types & jobs
    // ------------------------------------------------------------------

    /// List the available report types.
    #[instrument(skip_all)]
    pub async fn list_report_types(
        &self,
        opts: &ReportingOpts,
    ) -> Result<(Vec<ReportType>, Option<String>), SessionError> {
        let url = format!("{}/reportTypes", self.base_url);
        let payload = self.session.get_json(&url, &opts.to_query_pairs()).await?;
        parse_list(&payload, "reportTypes")
    }

    /// Create a reporting job for a report type.
    #[instrument(skip(self))]
    pub async fn create_job(
        &self,
        report_type_id: &str,
        name: &str,
        content_owner: Option<&str>,
    ) -> Result<Job, SessionError> {
        let url = format!("{}/jobs", self.base_url);
        let body = serde_json::json!({
            "reportTypeId": report_type_id,
            "name": name,
        });
        let payload = self
            .session
            .post_json(&url, &owner_query(content_owner), &body)
            .await?;
        let job: Job = serde_json::from_value(payload).map_err(ApiError::from)?;
        info!(job_id = %job.id, "created reporting job");
        Ok(job)
    }

    /// List existing reporting jobs.
    #[instrument(skip_all)]
    pub async fn list_jobs(
        &self,
        opts: &ReportingOpts,
    ) -> Result<(Vec<Job>, Option<String>), SessionError> {
        let url = format!("{}/jobs", self.base_url);
        let payload = self.session.get_json(&url, &opts.to_query_pairs()).await?;
        parse_list(&payload, "jobs")
    }

    /// Get one job by ID.
    pub async fn get_job(
        &self,
        job_id: &str,
        content_owner: Option<&str>,
    ) -> Result<Job, SessionError> {
        let url = format!("{}/jobs/{job_id}", self.base_url);
        let payload = self
            .session
            .get_json(&url, &owner_query(content_owner))
            .await?;
        Ok(serde_json::from_value(payload).map_err(ApiError::from)?)
    }

    /// Delete a job.
    #[instrument(skip(self))]
    pub async fn delete_job(
        &self,
        job_id: &str,
        content_owner: Option<&str>,
    ) -> Result<(), SessionError> {
        let url = format!("{}/jobs/{job_id}", self.base_url);
        self.session.delete(&url, &owner_query(content_owner)).await?;
        info!(job_id, "deleted reporting job");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    /// List the reports generated under a job.
    ///
    /// `created_after` restricts to reports created after that instant.
    #[instrument(skip(self, opts, created_after))]
    pub async fn list_reports(
        &self,
        job_id: &str,
        opts: &ReportingOpts,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<(Vec<Report>, Option<String>), SessionError> {
        let url = format!("{}/jobs/{job_id}/reports", self.base_url);
        let mut query = opts.to_query_pairs();
        if let Some(cutoff) = created_after {
            query.push((
                "createdAfter".to_string(),
                cutoff.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        let payload = self.session.get_json(&url, &query).await?;
        parse_list(&payload, "reports")
    }

    /// Get one report's metadata.
    pub async fn get_report(
        &self,
        job_id: &str,
        report_id: &str,
        content_owner: Option<&str>,
    ) -> Result<Report, SessionError> {
        let url = format!("{}/jobs/{job_id}/reports/{report_id}", self.base_url);
        let payload = self
            .session
            .get_json(&url, &owner_query(content_owner))
            .await?;
        Ok(serde_json::from_value(payload).map_err(ApiError::from)?)
    }

    /// Download a report's CSV content as a table.
    ///
    /// `download_url` comes from [`list_reports`](Self::list_reports);
    /// columns whose name looks date-like parse into dates.
    #[instrument(skip_all)]
    pub async fn download_report(&self, download_url: &str) -> Result<Table, SessionError> {
        let bytes = self.session.get_bytes(download_url).await?;
        let table = Table::from_csv(&bytes)?;
        debug!(rows = table.n_rows(), "report downloaded");
        Ok(table)
    }

    /// Download the most recent report in a single call.
    ///
    /// `identifier` is either a report-type ID (for example
    /// `channel_basic_a2`) or a job name, matched case-insensitively.
    /// When several jobs match, the newest one wins; within the job the
    /// report with the latest start time (falling back to creation time)
    /// is downloaded.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiError::InvalidArgument`] when no job matches or the
    /// matching job has no reports yet.
    #[instrument(skip(self))]
    pub async fn get_latest_report(&self, identifier: &str) -> Result<Table, SessionError> {
        // Gather all jobs, following pagination.
        let mut jobs: Vec<Job> = Vec::new();
        let mut opts = ReportingOpts::new().include_system_managed(true);
        loop {
            let (page, token) = self.list_jobs(&opts).await?;
            jobs.extend(page);
            match token {
                Some(token) => opts = opts.page_token(token),
                None => break,
            }
        }

        let mut matches: Vec<Job> = jobs
            .into_iter()
            .filter(|job| {
                job.report_type_id.eq_ignore_ascii_case(identifier)
                    || job.name.eq_ignore_ascii_case(identifier)
            })
            .collect();
        matches.sort_by(|a, b| b.create_time.cmp(&a.create_time));
        let job = matches.into_iter().next().ok_or_else(|| {
            ApiError::InvalidArgument(format!("no job found matching {identifier:?}"))
        })?;

        // Gather all of the job's reports, following pagination.
        let mut reports: Vec<Report> = Vec::new();
        let mut opts = ReportingOpts::new();
        loop {
            let (page, token) = self.list_reports(&job.id, &opts, None).await?;
            reports.extend(page);
            match token {
                Some(token) => opts = opts.page_token(token),
                None => break,
            }
        }

        reports.sort_by(|a, b| {
            (b.start_time, b.create_time).cmp(&(a.start_time, a.create_time))
        });
        let latest = reports.into_iter().next().ok_or_else(|| {
            ApiError::InvalidArgument(format!("no reports available for job {identifier:?}"))
        })?;
        let download_url = latest.download_url.as_deref().ok_or_else(|| {
            ApiError::InvalidData(format!("report {} has no download URL", latest.id))
        })?;

        let table = self.download_report(download_url).await?;
        info!(identifier, start_time = ?latest.start_time, "downloaded latest report");
        Ok(table)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn owner_query(content_owner: Option<&str>) -> Vec<(String, String)> {
    content_owner
        .map(|owner| vec![("onBehalfOfContentOwner".to_string(), owner.to_string())])
        .unwrap_or_default()
}

/// Parse `{key: [...], nextPageToken: ...}` list payloads.
fn parse_list<T: DeserializeOwned>(
    payload: &serde_json::Value,
    key: &str,
) -> Result<(Vec<T>, Option<String>), SessionError> {
    let items = payload
        .get(key)
        .cloned()
        .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));
    let parsed: Vec<T> = serde_json::from_value(items).map_err(ApiError::from)?;
    let token = payload
        .get("nextPageToken")
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string);
    Ok((parsed, token))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_opts_to_query_pairs() {
        let opts = ReportingOpts::new()
            .include_system_managed(true)
            .page_size(50)
            .page_token("tok")
            .on_behalf_of_content_owner("cms");

        let pairs: std::collections::HashMap<_, _> =
            opts.to_query_pairs().into_iter().collect();
        assert_eq!(pairs["includeSystemManaged"], "true");
        assert_eq!(pairs["pageSize"], "50");
        assert_eq!(pairs["pageToken"], "tok");
        assert_eq!(pairs["onBehalfOfContentOwner"], "cms");
    }

    #[test]
    fn test_empty_opts_send_nothing() {
        assert!(ReportingOpts::new().to_query_pairs().is_empty());
    }

    #[test]
    fn test_parse_list_missing_key_is_empty() {
        let (jobs, token) = parse_list::<Job>(&json!({}), "jobs").unwrap();
        assert!(jobs.is_empty());
        assert!(token.is_none());
    }

    #[test]
    fn test_parse_list_with_token() {
        let payload = json!({
            "jobs": [
                {"id": "j1", "name": "a", "reportTypeId": "t"},
                {"id": "j2", "name": "b", "reportTypeId": "t"}
            ],
            "nextPageToken": "next"
        });
        let (jobs, token) = parse_list::<Job>(&payload, "jobs").unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(token.as_deref(), Some("next"));
    }

    #[test]
    fn test_owner_query() {
        assert!(owner_query(None).is_empty());
        let pairs = owner_query(Some("cms"));
        assert_eq!(pairs[0].0, "onBehalfOfContentOwner");
    }
}
