// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! ytkit CLI - query the YouTube Analytics, Data, and Reporting APIs.
//!
//! # Examples
//!
//! ```bash
//! # Authorize once; the token is cached for later runs
//! ytkit login --client-secrets client_secrets.json
//!
//! # Daily views for January
//! ytkit query --metrics views,likes --dimensions day \
//!     --start-date 2024-01-01 --end-date 2024-01-31
//!
//! # Your channels, as JSON
//! ytkit data channels --mine --format json --pretty
//!
//! # Bulk reports
//! ytkit reporting jobs
//! ytkit reporting latest channel_basic_a2
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{data, login, query, reporting};

// ============================================================================
// CLI Definition
// ============================================================================

/// ytkit CLI - YouTube Analytics, Data, and Reporting from the command line.
#[derive(Parser)]
#[command(name = "ytkit")]
#[command(about = "Query the YouTube Analytics, Data, and Reporting APIs")]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Path to the OAuth client secrets file.
    #[arg(long, default_value = "client_secrets.json", global = true)]
    pub client_secrets: PathBuf,

    /// Token cache location (defaults to the user config directory).
    #[arg(long, global = true)]
    pub token_cache: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the OAuth authorization flow and cache the token.
    Login,

    /// Remove the cached token.
    Logout,

    /// Run an Analytics reports.query request.
    #[command(visible_alias = "q")]
    Query(query::QueryArgs),

    /// List Data API resources (channels, videos, playlists, search).
    #[command(visible_alias = "d")]
    Data(data::DataArgs),

    /// Manage bulk-report jobs and downloads.
    #[command(visible_alias = "r")]
    Reporting(reporting::ReportingArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Text,
    /// JSON rows for scripting.
    Json,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("ytkit=debug,ytkit_session=debug,ytkit_clients=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Login => login::run_login(&cli).await,
        Commands::Logout => login::run_logout(&cli).await,
        Commands::Query(args) => query::run(args, &cli).await,
        Commands::Data(args) => data::run(args, &cli).await,
        Commands::Reporting(args) => reporting::run(args, &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }

    Ok(())
}
