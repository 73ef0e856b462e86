//! Reporting API commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use ytkit_clients::reporting::{ReportingClient, ReportingOpts};
use ytkit_core::Table;

use super::{open_session, print_table};
use crate::Cli;

/// Arguments for the reporting command.
#[derive(Args)]
pub struct ReportingArgs {
    /// The reporting operation.
    #[command(subcommand)]
    pub operation: ReportingOp,

    /// Include system-managed report types and jobs.
    #[arg(long, global = true)]
    pub include_system_managed: bool,
}

/// Reporting API operations.
#[derive(Subcommand)]
pub enum ReportingOp {
    /// List available report types.
    Types,
    /// List reporting jobs.
    Jobs,
    /// Create a reporting job.
    CreateJob {
        /// The report type the job should generate.
        report_type_id: String,
        /// The job name.
        name: String,
    },
    /// Delete a reporting job.
    DeleteJob {
        /// The job ID.
        job_id: String,
    },
    /// List the reports generated under a job.
    Reports {
        /// The job ID.
        job_id: String,
    },
    /// Download a report CSV by URL.
    Download {
        /// The report's download URL (from `reporting reports`).
        url: String,
    },
    /// Download the most recent report for a report type or job name.
    Latest {
        /// Report-type ID (e.g. channel_basic_a2) or job name.
        identifier: String,
    },
}

/// Runs the reporting command.
pub async fn run(args: &ReportingArgs, cli: &Cli) -> Result<()> {
    let session = open_session(cli).await?;
    let client = ReportingClient::new(session);

    let mut opts = ReportingOpts::new();
    if args.include_system_managed {
        opts = opts.include_system_managed(true);
    }

    match &args.operation {
        ReportingOp::Types => {
            let (types, _) = client.list_report_types(&opts).await?;
            print_table(&models_table(&types)?, cli)
        }
        ReportingOp::Jobs => {
            let (jobs, _) = client.list_jobs(&opts).await?;
            print_table(&models_table(&jobs)?, cli)
        }
        ReportingOp::CreateJob {
            report_type_id,
            name,
        } => {
            let job = client.create_job(report_type_id, name, None).await?;
            if !cli.quiet {
                println!("Created job {} ({})", job.id, job.report_type_id);
            }
            Ok(())
        }
        ReportingOp::DeleteJob { job_id } => {
            client.delete_job(job_id, None).await?;
            if !cli.quiet {
                println!("Job {job_id} successfully deleted.");
            }
            Ok(())
        }
        ReportingOp::Reports { job_id } => {
            let (reports, _) = client.list_reports(job_id, &opts, None).await?;
            print_table(&models_table(&reports)?, cli)
        }
        ReportingOp::Download { url } => {
            let table = client.download_report(url).await?;
            print_table(&table, cli)
        }
        ReportingOp::Latest { identifier } => {
            let table = client.get_latest_report(identifier).await?;
            print_table(&table, cli)
        }
    }
}

/// Render typed models as a table, one row per model.
fn models_table<T: Serialize>(models: &[T]) -> Result<Table> {
    let values = models
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Table::from_items(&values))
}
