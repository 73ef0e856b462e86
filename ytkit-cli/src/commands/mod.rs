//! Command implementations.

pub mod data;
pub mod login;
pub mod query;
pub mod reporting;

use std::sync::Arc;

use anyhow::Result;
use ytkit_core::Table;
use ytkit_session::Session;

use crate::output::{format_json, TextFormatter};
use crate::{Cli, OutputFormat};

/// Open the shared session for a command.
///
/// Loads the cached token (refreshing it if needed); when nothing usable is
/// cached this runs the interactive authorization flow, same as `login`.
pub async fn open_session(cli: &Cli) -> Result<Arc<Session>> {
    let session = Session::user_session(&cli.client_secrets, cli.token_cache.clone()).await?;
    Ok(Arc::new(session))
}

/// Print a table in the selected output format.
pub fn print_table(table: &Table, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_table(table));
        }
        OutputFormat::Json => println!("{}", format_json(table, cli.pretty)?),
    }
    Ok(())
}
