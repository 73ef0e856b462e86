//! Analytics query command.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use tracing::debug;
use ytkit_clients::analytics::{AnalyticsClient, ReportsQuery};

use super::{open_session, print_table};
use crate::Cli;

/// Arguments for the query command.
#[derive(Args, Default)]
pub struct QueryArgs {
    /// Metrics, comma-separated (default: views,estimatedMinutesWatched).
    #[arg(long, short)]
    pub metrics: Option<String>,

    /// Dimensions, comma-separated (e.g. day, country).
    #[arg(long, short)]
    pub dimensions: Option<String>,

    /// Start of the reporting window (YYYY-MM-DD).
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// End of the reporting window (YYYY-MM-DD, default today).
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Raw filter string (e.g. "country==US;video==abc").
    #[arg(long)]
    pub filters: Option<String>,

    /// Sort order (default: descending on the first metric).
    #[arg(long)]
    pub sort: Option<String>,

    /// Maximum rows to return.
    #[arg(long)]
    pub max_results: Option<u32>,

    /// Currency for revenue metrics (3-letter ISO code).
    #[arg(long)]
    pub currency: Option<String>,

    /// The ids parameter (default: channel==MINE).
    #[arg(long)]
    pub ids: Option<String>,
}

/// Runs the query command.
pub async fn run(args: &QueryArgs, cli: &Cli) -> Result<()> {
    let mut query = ReportsQuery::new();
    if let Some(ids) = &args.ids {
        query = query.ids(ids);
    }
    if let Some(metrics) = &args.metrics {
        query = query.metrics(metrics.as_str());
    }
    if let Some(dimensions) = &args.dimensions {
        query = query.dimensions(dimensions.as_str());
    }
    if let Some(start) = args.start_date {
        query = query.start_date(start);
    }
    if let Some(end) = args.end_date {
        query = query.end_date(end);
    }
    if let Some(filters) = &args.filters {
        query = query.filters(filters);
    }
    if let Some(sort) = &args.sort {
        query = query.sort(sort);
    }
    if let Some(max_results) = args.max_results {
        query = query.max_results(max_results);
    }
    if let Some(currency) = &args.currency {
        query = query.currency(currency);
    }

    debug!("running reports.query");
    let session = open_session(cli).await?;
    let client = AnalyticsClient::new(session);
    let table = client.reports_query(&query).await?;

    print_table(&table, cli)
}
