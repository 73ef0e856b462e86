//! Data API commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use ytkit_clients::data::{DataClient, ListParams};

use super::{open_session, print_table};
use crate::Cli;

/// Arguments for the data command.
#[derive(Args)]
pub struct DataArgs {
    /// The resource collection to list.
    #[command(subcommand)]
    pub resource: DataResource,

    /// Resource parts to return, comma-separated (default: snippet).
    #[arg(long, global = true)]
    pub part: Option<String>,

    /// Page size.
    #[arg(long, global = true)]
    pub max_results: Option<u32>,

    /// Follow pagination until exhaustion instead of one page.
    #[arg(long, global = true)]
    pub all_pages: bool,
}

/// Data API resource collections.
#[derive(Subcommand)]
pub enum DataResource {
    /// List channels.
    Channels {
        /// Channel IDs, comma-separated.
        #[arg(long)]
        id: Option<String>,
        /// The authenticated user's own channel.
        #[arg(long)]
        mine: bool,
    },
    /// List videos by ID.
    Videos {
        /// Video IDs, comma-separated.
        ids: String,
    },
    /// List playlists.
    Playlists {
        /// Restrict to a channel.
        #[arg(long)]
        channel_id: Option<String>,
        /// The authenticated user's own playlists.
        #[arg(long)]
        mine: bool,
    },
    /// List the items of a playlist.
    PlaylistItems {
        /// The playlist ID.
        playlist_id: String,
    },
    /// Search for videos, channels, and playlists.
    Search {
        /// Free-text query.
        query: String,
    },
}

/// Runs the data command.
pub async fn run(args: &DataArgs, cli: &Cli) -> Result<()> {
    let mut params = ListParams::new();
    if let Some(part) = &args.part {
        params = params.part(part.as_str());
    }
    if let Some(max_results) = args.max_results {
        params = params.max_results(max_results);
    }

    let (resource, params) = match &args.resource {
        DataResource::Channels { id, mine } => {
            if let Some(id) = id {
                params = params.ids(id.as_str());
            }
            if *mine {
                params = params.mine(true);
            }
            ("channels", params)
        }
        DataResource::Videos { ids } => ("videos", params.ids(ids.as_str())),
        DataResource::Playlists { channel_id, mine } => {
            if let Some(channel_id) = channel_id {
                params = params.channel_id(channel_id);
            }
            if *mine {
                params = params.mine(true);
            }
            ("playlists", params)
        }
        DataResource::PlaylistItems { playlist_id } => {
            ("playlistItems", params.playlist_id(playlist_id))
        }
        DataResource::Search { query } => ("search", params.search_query(query)),
    };

    let session = open_session(cli).await?;
    let client = DataClient::new(session);

    if args.all_pages {
        let table = client.collect_all(resource, &params).await?;
        print_table(&table, cli)
    } else {
        let page = client.list(resource, &params).await?;
        print_table(&page.items, cli)?;
        if let Some(token) = page.next_page_token {
            if !cli.quiet {
                eprintln!("More results available (next page token: {token}); pass --all-pages to fetch everything.");
            }
        }
        Ok(())
    }
}
