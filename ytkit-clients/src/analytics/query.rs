//! The `reports.query` request builder.

use chrono::{Local, NaiveDate};
use ytkit_core::Names;

/// Metrics requested when the caller does not name any.
const DEFAULT_METRICS: [&str; 2] = ["views", "estimatedMinutesWatched"];

/// Reporting window start when the caller does not give one.
const DEFAULT_START_DATE: &str = "2000-01-01";

/// A `reports.query` request.
///
/// Most wrapper methods on `AnalyticsClient` take one of these as a base
/// and pre-fill the dimensions, metrics, and filters for their report
/// shape; the base carries everything else (dates, currency, row limits).
///
/// ```
/// use ytkit_clients::analytics::ReportsQuery;
///
/// let query = ReportsQuery::new()
///     .metrics(["views", "likes"])
///     .dimensions(["day"])
///     .max_results(31);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReportsQuery {
    ids: Option<String>,
    metrics: Names,
    dimensions: Names,
    sort: Option<String>,
    max_results: Option<u32>,
    max_results_set: bool,
    filters: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    currency: Option<String>,
    start_index: Option<u32>,
    include_historical_channel_data: Option<bool>,
}

impl ReportsQuery {
    /// Creates a query with every parameter at its default.
    ///
    /// Defaults: `ids=channel==MINE`, metrics
    /// `views,estimatedMinutesWatched`, start date 2000-01-01, end date
    /// today, ten rows, sorted descending on the first metric.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `ids` parameter (default `channel==MINE`).
    #[must_use]
    pub fn ids(mut self, ids: impl Into<String>) -> Self {
        self.ids = Some(ids.into());
        self
    }

    /// Sets the metrics.
    #[must_use]
    pub fn metrics(mut self, metrics: impl Into<Names>) -> Self {
        self.metrics = metrics.into();
        self
    }

    /// Sets the dimensions.
    #[must_use]
    pub fn dimensions(mut self, dimensions: impl Into<Names>) -> Self {
        self.dimensions = dimensions.into();
        self
    }

    /// Sets the sort order (for example `-views`).
    #[must_use]
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self.max_results_set = true;
        self
    }

    /// Omits the row limit, accepting the API default.
    #[must_use]
    pub fn no_max_results(mut self) -> Self {
        self.max_results = None;
        self.max_results_set = true;
        self
    }

    /// Sets the raw filter string (for example `country==US;video==abc`).
    #[must_use]
    pub fn filters(mut self, filters: impl Into<String>) -> Self {
        self.filters = Some(filters.into());
        self
    }

    /// Sets the start of the reporting window (inclusive).
    #[must_use]
    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Sets the end of the reporting window (inclusive).
    #[must_use]
    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Sets the 3-letter ISO currency code for revenue metrics.
    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Sets the 1-based pagination index.
    #[must_use]
    pub fn start_index(mut self, index: u32) -> Self {
        self.start_index = Some(index);
        self
    }

    /// Includes data from before the channel was linked to its owner.
    #[must_use]
    pub fn include_historical_channel_data(mut self, include: bool) -> Self {
        self.include_historical_channel_data = Some(include);
        self
    }

    /// The current filter string, if any.
    pub fn filters_ref(&self) -> Option<&str> {
        self.filters.as_deref()
    }

    /// True unless the caller set (or cleared) the row limit.
    pub(crate) fn max_results_is_default(&self) -> bool {
        !self.max_results_set
    }

    /// Produce the wire query parameters for this request.
    ///
    /// Defaults are resolved here: missing metrics become
    /// `views,estimatedMinutesWatched`, a missing end date becomes today,
    /// and a missing sort becomes descending on the first metric.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let metrics = if self.metrics.is_empty() {
            Names::from(DEFAULT_METRICS)
        } else {
            self.metrics.clone()
        };
        let sort = self
            .sort
            .clone()
            .or_else(|| metrics.first().map(|m| format!("-{m}")));
        let start_date = self
            .start_date
            .map_or_else(|| DEFAULT_START_DATE.to_string(), |d| d.to_string());
        let end_date = self
            .end_date
            .unwrap_or_else(|| Local::now().date_naive())
            .to_string();

        let mut pairs = vec![
            (
                "ids".to_string(),
                self.ids.clone().unwrap_or_else(|| "channel==MINE".to_string()),
            ),
            ("startDate".to_string(), start_date),
            ("endDate".to_string(), end_date),
            ("metrics".to_string(), metrics.join()),
        ];
        if !self.dimensions.is_empty() {
            pairs.push(("dimensions".to_string(), self.dimensions.join()));
        }
        if let Some(filters) = &self.filters {
            pairs.push(("filters".to_string(), filters.clone()));
        }
        if let Some(sort) = sort {
            pairs.push(("sort".to_string(), sort));
        }
        if let Some(max_results) = self.max_results.or_else(|| {
            // Untouched queries keep the ten-row default.
            self.max_results_is_default().then_some(10)
        }) {
            pairs.push(("maxResults".to_string(), max_results.to_string()));
        }
        if let Some(currency) = &self.currency {
            pairs.push(("currency".to_string(), currency.clone()));
        }
        if let Some(index) = self.start_index {
            pairs.push(("startIndex".to_string(), index.to_string()));
        }
        if let Some(include) = self.include_historical_channel_data {
            pairs.push((
                "includeHistoricalChannelData".to_string(),
                include.to_string(),
            ));
        }
        pairs
    }
}

// ============================================================================
// Tests
// ============================================================================
