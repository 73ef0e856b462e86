//! YouTube Analytics API client.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, instrument};
use ytkit_core::{invalid_argument, Names, Table};
use ytkit_session::{Session, SessionError};

use super::fields::{
    AUDIENCE_TYPES, DEMOGRAPHIC_DIMENSIONS, DEVICE_DIMENSIONS, GEOGRAPHIC_DIMENSIONS,
    LIVESTREAM_METRICS, PLAYBACK_DETAIL_DIMENSIONS, TIME_PERIOD_DIMENSIONS,
    TRAFFIC_DETAIL_TYPES,
};
use super::query::ReportsQuery;

/// The `reports.query` endpoint.
pub const ANALYTICS_BASE_URL: &str = "https://youtubeanalytics.googleapis.com/v2/reports";

/// How many per-id requests run at once during fan-out.
const FANOUT_CONCURRENCY: usize = 8;

// ============================================================================
// Client
// ============================================================================

/// Client for the YouTube Analytics `reports.query` endpoint.
///
/// [`reports_query`](Self::reports_query) is the general entry point; the
/// other methods are wrappers that pre-fill its parameters for a
/// particular report shape. The `video_*` wrappers accept several IDs and
/// fan out one request per id, concatenating the resulting tables.
pub struct AnalyticsClient {
    session: Arc<Session>,
    base_url: String,
}

impl AnalyticsClient {
    /// Creates a client on the shared session.
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            base_url: ANALYTICS_BASE_URL.to_string(),
        }
    }

    /// Overrides the endpoint URL (tests).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    // ------------------------------------------------------------------
    // The general query
    // ------------------------------------------------------------------

    /// Send a single `reports.query` request and return the result as a
    /// table.
    ///
    /// Every other method in this client is a wrapper around this one with
    /// some parameters already populated; when none of them fit, build a
    /// [`ReportsQuery`] yourself and call this.
    ///
    /// # Errors
    ///
    /// Quota exhaustion surfaces as
    /// [`ApiError::QuotaExceeded`](ytkit_core::ApiError::QuotaExceeded);
    /// other failures carry the upstream status and message.
    #[instrument(skip_all)]
    pub async fn reports_query(&self, query: &ReportsQuery) -> Result<Table, SessionError> {
        let payload = self
            .session
            .get_json(&self.base_url, &query.to_query_pairs())
            .await?;
        let table = Table::from_report(&payload)?;
        debug!(rows = table.n_rows(), "report received");
        Ok(table)
    }

    /// Fan out over many IDs and concatenate the tables.
    ///
    /// Each id becomes its own request with an `{id_kind}=={id}` filter
    /// appended to the base filters; requests run with bounded concurrency
    /// and arrival order is not preserved.
    async fn per_id(
        &self,
        id_kind: &str,
        ids: Names,
        extra_filters: &[String],
        query: ReportsQuery,
    ) -> Result<Table, SessionError> {
        if ids.is_empty() {
            return Ok(Table::empty());
        }

        let queries: Vec<ReportsQuery> = ids
            .iter()
            .map(|id| {
                let mut parts: Vec<String> = Vec::new();
                if let Some(base) = query.filters_ref() {
                    parts.push(base.to_string());
                }
                parts.extend_from_slice(extra_filters);
                parts.push(format!("{id_kind}=={id}"));
                query.clone().filters(parts.join(";"))
            })
            .collect();

        let tables: Vec<Table> = stream::iter(queries)
            .map(|q| async move { self.reports_query(&q).await })
            .buffer_unordered(FANOUT_CONCURRENCY)
            .try_collect()
            .await?;

        Ok(Table::concat(tables))
    }

    // ------------------------------------------------------------------
    // Geography
    // ------------------------------------------------------------------

    /// Video stats by geographic region.
    ///
    /// `geo_dim` picks the granularity: `country`, `province`, `dma`, or
    /// `city`. One row per video and region.
    pub async fn video_geography(
        &self,
        video_ids: impl Into<Names>,
        geo_dim: &str,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        if !GEOGRAPHIC_DIMENSIONS.contains(&geo_dim) {
            return Err(invalid_argument("geo_dim", geo_dim, GEOGRAPHIC_DIMENSIONS).into());
        }
        let query = wide_page(base).dimensions(["video", geo_dim]);
        self.per_id("video", video_ids.into(), &[], query).await
    }

    /// Channel stats by geographic region.
    pub async fn channel_geography(
        &self,
        geo_dim: &str,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        if !GEOGRAPHIC_DIMENSIONS.contains(&geo_dim) {
            return Err(invalid_argument("geo_dim", geo_dim, GEOGRAPHIC_DIMENSIONS).into());
        }
        self.reports_query(&wide_page(base).dimensions([geo_dim])).await
    }

    // ------------------------------------------------------------------
    // Playback location
    // ------------------------------------------------------------------

    /// Where viewers watched each video (YouTube, embedded players, ...).
    ///
    /// With `detail` the report drills into
    /// `insightPlaybackLocationDetail`; the API then filters to embedded
    /// playback and caps the page at 25 rows.
    pub async fn video_playback_location(
        &self,
        video_ids: impl Into<Names>,
        detail: bool,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        let (dim, extras, query) = playback_location(detail, base);
        self.per_id("video", video_ids.into(), &extras, query.dimensions([dim]))
            .await
    }

    /// Where viewers watched the channel's videos.
    pub async fn channel_playback_location(
        &self,
        detail: bool,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        let (dim, extras, mut query) = playback_location(detail, base);
        if let Some(filter) = extras.first() {
            query = query.filters(filter.clone());
        }
        self.reports_query(&query.dimensions([dim])).await
    }

    // ------------------------------------------------------------------
    // Playback details
    // ------------------------------------------------------------------

    /// Break down each video by a playback-detail dimension
    /// (`liveOrOnDemand`, `subscribedStatus`, ...).
    pub async fn video_playback_details(
        &self,
        video_ids: impl Into<Names>,
        detail: &str,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        if !PLAYBACK_DETAIL_DIMENSIONS.contains(&detail) {
            return Err(invalid_argument("detail", detail, PLAYBACK_DETAIL_DIMENSIONS).into());
        }
        self.per_id("video", video_ids.into(), &[], base.dimensions([detail]))
            .await
    }

    /// Break down channel stats by a playback-detail dimension.
    pub async fn channel_playback_details(
        &self,
        detail: &str,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        if !PLAYBACK_DETAIL_DIMENSIONS.contains(&detail) {
            return Err(invalid_argument("detail", detail, PLAYBACK_DETAIL_DIMENSIONS).into());
        }
        self.reports_query(&base.dimensions([detail])).await
    }

    // ------------------------------------------------------------------
    // Devices
    // ------------------------------------------------------------------

    /// Break down each video by device characteristics.
    ///
    /// `device_info` takes `deviceType`, `operatingSystem`, or both; empty
    /// selects `deviceType`.
    pub async fn video_devices(
        &self,
        video_ids: impl Into<Names>,
        device_info: impl Into<Names>,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        let dims = defaulted(device_info.into(), "deviceType");
        dims.validate("device_info", DEVICE_DIMENSIONS)?;
        self.per_id("video", video_ids.into(), &[], base.dimensions(dims))
            .await
    }

    /// Break down channel stats by device characteristics.
    pub async fn channel_devices(
        &self,
        device_info: impl Into<Names>,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        let dims = defaulted(device_info.into(), "deviceType");
        dims.validate("device_info", DEVICE_DIMENSIONS)?;
        self.reports_query(&base.dimensions(dims)).await
    }

    // ------------------------------------------------------------------
    // Demographics
    // ------------------------------------------------------------------

    /// Break down each video's audience by age and/or gender.
    ///
    /// `demographic` takes `ageGroup`, `gender`, or both; empty selects
    /// `ageGroup`.
    pub async fn video_demographics(
        &self,
        video_ids: impl Into<Names>,
        demographic: impl Into<Names>,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        let dims = defaulted(demographic.into(), "ageGroup");
        dims.validate("demographic", DEMOGRAPHIC_DIMENSIONS)?;
        self.per_id("video", video_ids.into(), &[], base.dimensions(dims))
            .await
    }

    /// Break down the channel's audience by age and/or gender.
    pub async fn channel_demographics(
        &self,
        demographic: impl Into<Names>,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        let dims = defaulted(demographic.into(), "ageGroup");
        dims.validate("demographic", DEMOGRAPHIC_DIMENSIONS)?;
        self.reports_query(&base.dimensions(dims)).await
    }

    // ------------------------------------------------------------------
    // Stats
    // ------------------------------------------------------------------

    /// Generic stats for one or more videos; the base query carries
    /// whatever metrics and dimensions the caller wants.
    pub async fn video_stats(
        &self,
        video_ids: impl Into<Names>,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        self.per_id("video", video_ids.into(), &[], base).await
    }

    /// Generic stats for the channel.
    pub async fn channel_stats(&self, base: ReportsQuery) -> Result<Table, SessionError> {
        self.reports_query(&base).await
    }

    // ------------------------------------------------------------------
    // Sharing services
    // ------------------------------------------------------------------

    /// Which platforms drove shares for each video.
    pub async fn video_sharing_services(
        &self,
        video_ids: impl Into<Names>,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        let query = base.dimensions(["sharingService"]).metrics(["shares"]);
        self.per_id("video", video_ids.into(), &[], query).await
    }

    /// Which platforms drove shares to the channel.
    pub async fn channel_sharing_services(
        &self,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        self.reports_query(&base.dimensions(["sharingService"]).metrics(["shares"]))
            .await
    }

    // ------------------------------------------------------------------
    // Time periods
    // ------------------------------------------------------------------

    /// Summarise video performance by calendar day or month.
    ///
    /// When `max_results` is `None` the row limit is derived from the date
    /// span (inclusive day or month count).
    pub async fn video_time_period(
        &self,
        video_ids: impl Into<Names>,
        time_period: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        max_results: Option<u32>,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        let resolved = resolve_max_results(time_period, start_date, end_date, max_results)?;
        let query = base
            .dimensions([time_period])
            .start_date(start_date)
            .end_date(end_date)
            .sort(time_period)
            .max_results(resolved);
        self.per_id("video", video_ids.into(), &[], query).await
    }

    /// Summarise channel performance by calendar day or month.
    pub async fn channel_time_period(
        &self,
        time_period: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        max_results: Option<u32>,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        let resolved = resolve_max_results(time_period, start_date, end_date, max_results)?;
        self.reports_query(
            &base
                .dimensions([time_period])
                .start_date(start_date)
                .end_date(end_date)
                .sort(time_period)
                .max_results(resolved),
        )
        .await
    }

    // ------------------------------------------------------------------
    // Top videos
    // ------------------------------------------------------------------

    /// Top-performing videos within one or more playlists.
    pub async fn playlist_top_videos(
        &self,
        playlist_ids: impl Into<Names>,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        let extras = vec!["isCurated==1".to_string()];
        self.per_id("playlist", playlist_ids.into(), &extras, base.dimensions(["video"]))
            .await
    }

    /// Top-performing videos in the channel.
    pub async fn channel_top_videos(&self, base: ReportsQuery) -> Result<Table, SessionError> {
        self.reports_query(&base.dimensions(["video"])).await
    }

    // ------------------------------------------------------------------
    // Traffic sources
    // ------------------------------------------------------------------

    /// Traffic-source breakdown for one or more videos.
    ///
    /// With a `detail` literal (for example `YT_SEARCH`) the report drills
    /// into `insightTrafficSourceDetail` for that source type.
    pub async fn video_traffic_sources(
        &self,
        video_ids: impl Into<Names>,
        detail: Option<&str>,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        let (dim, extras) = traffic_source(detail)?;
        self.per_id(
            "video",
            video_ids.into(),
            &extras,
            base.dimensions([dim]).max_results(25),
        )
        .await
    }

    /// Traffic-source breakdown for the channel.
    pub async fn channel_traffic_sources(
        &self,
        detail: Option<&str>,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        let (dim, extras) = traffic_source(detail)?;
        let mut query = base.dimensions([dim]).max_results(25);
        if let Some(filter) = extras.first() {
            query = query.filters(filter.clone());
        }
        self.reports_query(&query).await
    }

    // ------------------------------------------------------------------
    // Audience retention (videos only)
    // ------------------------------------------------------------------

    /// Audience-retention curve for each video: one row per
    /// `elapsedVideoTimeRatio` bucket with the `audienceWatchRatio` metric.
    ///
    /// `audience_type` optionally restricts to `ORGANIC`, `AD_INSTREAM`,
    /// or `AD_INDISPLAY` viewers.
    pub async fn video_audience_retention(
        &self,
        video_ids: impl Into<Names>,
        audience_type: Option<&str>,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        let mut extras = Vec::new();
        if let Some(audience) = audience_type {
            if !AUDIENCE_TYPES.contains(&audience) {
                return Err(invalid_argument("audience_type", audience, AUDIENCE_TYPES).into());
            }
            extras.push(format!("audienceType=={audience}"));
        }
        let query = base
            .dimensions(["elapsedVideoTimeRatio"])
            .metrics(["audienceWatchRatio"]);
        self.per_id("video", video_ids.into(), &extras, query).await
    }

    // ------------------------------------------------------------------
    // Live streaming (videos only)
    // ------------------------------------------------------------------

    /// Live-stream performance by in-broadcast position.
    ///
    /// `metrics` is drawn from `averageConcurrentViewers` and
    /// `peakConcurrentViewers`; empty selects the peak.
    pub async fn video_live_position(
        &self,
        video_ids: impl Into<Names>,
        metrics: impl Into<Names>,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        let metrics = defaulted(metrics.into(), "peakConcurrentViewers");
        metrics.validate("metrics", LIVESTREAM_METRICS)?;
        let query = base.dimensions(["liveStreamPosition"]).metrics(metrics);
        self.per_id("video", video_ids.into(), &[], query).await
    }

    // ------------------------------------------------------------------
    // Memberships & ads (channel only)
    // ------------------------------------------------------------------

    /// Why paying members cancelled, grouped by survey reason.
    pub async fn channel_membership_cancellation(
        &self,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        self.reports_query(
            &base
                .dimensions(["membershipsCancellationSurveyReason"])
                .metrics(["membershipsCancellationSurveyResponses"]),
        )
        .await
    }

    /// Ad-revenue performance by ad type.
    pub async fn channel_ad_performance(
        &self,
        base: ReportsQuery,
    ) -> Result<Table, SessionError> {
        self.reports_query(&base.dimensions(["adType"]).metrics(["adRate"]))
            .await
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Raise the page size to 200 unless the caller chose one.
fn wide_page(base: ReportsQuery) -> ReportsQuery {
    if base.max_results_is_default() {
        base.max_results(200)
    } else {
        base
    }
}

/// Substitute a default name when the caller passed none.
fn defaulted(names: Names, default: &str) -> Names {
    if names.is_empty() {
        Names::from(default)
    } else {
        names
    }
}

/// Dimension, extra filters, and page sizing for playback-location reports.
fn playback_location(detail: bool, base: ReportsQuery) -> (&'static str, Vec<String>, ReportsQuery) {
    if detail {
        (
            "insightPlaybackLocationDetail",
            vec!["insightPlaybackLocationType==EMBEDDED".to_string()],
            // The API hard-caps the detail report.
            base.max_results(25),
        )
    } else {
        ("insightPlaybackLocationType", Vec::new(), wide_page(base))
    }
}

/// Dimension and extra filters for traffic-source reports.
fn traffic_source(
    detail: Option<&str>,
) -> Result<(&'static str, Vec<String>), SessionError> {
    match detail {
        Some(source_type) => {
            if !TRAFFIC_DETAIL_TYPES.contains(&source_type) {
                return Err(
                    invalid_argument("detail", source_type, TRAFFIC_DETAIL_TYPES).into()
                );
            }
            Ok((
                "insightTrafficSourceDetail",
                vec![format!("insightTrafficSourceType=={source_type}")],
            ))
        }
        None => Ok(("insightTrafficSourceType", Vec::new())),
    }
}

/// Resolve the row limit for time-period reports from the date span.
fn resolve_max_results(
    time_period: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    explicit: Option<u32>,
) -> Result<u32, SessionError> {
    if !TIME_PERIOD_DIMENSIONS.contains(&time_period) {
        return Err(invalid_argument("time_period", time_period, TIME_PERIOD_DIMENSIONS).into());
    }
    if let Some(value) = explicit {
        return Ok(value);
    }
    let count = match time_period {
        "day" => (end_date - start_date).num_days() + 1,
        _ => {
            i64::from(end_date.year() - start_date.year()) * 12
                + i64::from(end_date.month()) - i64::from(start_date.month())
                + 1
        }
    };
    Ok(u32::try_from(count.max(1)).unwrap_or(u32::MAX))
}

// ============================================================================
// Tests
// ============================================================================
