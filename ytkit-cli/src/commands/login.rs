//! Login and logout commands.

use anyhow::Result;
use ytkit_session::{FileTokenStore, Session, TokenStore};

use crate::Cli;

/// Runs the login command: the OAuth flow, then token caching.
pub async fn run_login(cli: &Cli) -> Result<()> {
    let session = Session::user_session(&cli.client_secrets, cli.token_cache.clone()).await?;
    drop(session);

    if !cli.quiet {
        let location = cli
            .token_cache
            .clone()
            .or_else(FileTokenStore::default_path)
            .map_or_else(|| "the token cache".to_string(), |p| p.display().to_string());
        println!("Authorized. Token cached at {location}.");
    }
    Ok(())
}

/// Runs the logout command: remove the cached token.
pub async fn run_logout(cli: &Cli) -> Result<()> {
    let store = match &cli.token_cache {
        Some(path) => FileTokenStore::new(path),
        None => FileTokenStore::at_default()?,
    };
    store.clear().await?;

    if !cli.quiet {
        println!("Logged out.");
    }
    Ok(())
}
