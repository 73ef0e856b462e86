//! YouTube Data API client.
//!
//! Thin wrappers over the Data API `list` endpoints: each call names a
//! resource collection, sends the query parameters from [`ListParams`],
//! and reshapes the returned items into a [`Table`] (one row per item,
//! one column per top-level key). Pagination follows `nextPageToken`.

use std::sync::Arc;

use tracing::{debug, instrument};
use ytkit_core::{Names, Table};
use ytkit_session::{Session, SessionError};

/// The Data API base URL.
pub const DATA_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

// ============================================================================
// List parameters
// ============================================================================

/// Query parameters shared by the Data API `list` endpoints.
///
/// `part` defaults to `snippet`; everything else is only sent when set.
/// [`extra`](Self::extra) covers endpoint-specific parameters the builders
/// do not name.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    part: Names,
    id: Names,
    mine: Option<bool>,
    channel_id: Option<String>,
    playlist_id: Option<String>,
    q: Option<String>,
    max_results: Option<u32>,
    page_token: Option<String>,
    extra: Vec<(String, String)>,
}

impl ListParams {
    /// Creates parameters with `part=snippet`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resource parts to return.
    #[must_use]
    pub fn part(mut self, part: impl Into<Names>) -> Self {
        self.part = part.into();
        self
    }

    /// Sets the resource IDs to look up.
    #[must_use]
    pub fn ids(mut self, ids: impl Into<Names>) -> Self {
        self.id = ids.into();
        self
    }

    /// Restricts to resources owned by the authenticated user.
    #[must_use]
    pub fn mine(mut self, mine: bool) -> Self {
        self.mine = Some(mine);
        self
    }

    /// Restricts to a channel.
    #[must_use]
    pub fn channel_id(mut self, id: impl Into<String>) -> Self {
        self.channel_id = Some(id.into());
        self
    }

    /// Restricts to a playlist (playlist items).
    #[must_use]
    pub fn playlist_id(mut self, id: impl Into<String>) -> Self {
        self.playlist_id = Some(id.into());
        self
    }

    /// Sets the free-text search query (search endpoint).
    #[must_use]
    pub fn search_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Sets the continuation token from a previous page.
    #[must_use]
    pub fn page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }

    /// Appends a raw query parameter.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Produce the wire query parameters.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let part = if self.part.is_empty() {
            "snippet".to_string()
        } else {
            self.part.join()
        };

        let mut pairs = vec![("part".to_string(), part)];
        if !self.id.is_empty() {
            pairs.push(("id".to_string(), self.id.join()));
        }
        if let Some(mine) = self.mine {
            pairs.push(("mine".to_string(), mine.to_string()));
        }
        if let Some(channel_id) = &self.channel_id {
            pairs.push(("channelId".to_string(), channel_id.clone()));
        }
        if let Some(playlist_id) = &self.playlist_id {
            pairs.push(("playlistId".to_string(), playlist_id.clone()));
        }
        if let Some(q) = &self.q {
            pairs.push(("q".to_string(), q.clone()));
        }
        if let Some(max_results) = self.max_results {
            pairs.push(("maxResults".to_string(), max_results.to_string()));
        }
        if let Some(token) = &self.page_token {
            pairs.push(("pageToken".to_string(), token.clone()));
        }
        pairs.extend(self.extra.iter().cloned());
        pairs
    }
}

// ============================================================================
// Pages
// ============================================================================

/// One page of Data API results.
#[derive(Debug, Clone)]
pub struct Page {
    /// The page's items as a table.
    pub items: Table,
    /// Continuation token; absent on the last page.
    pub next_page_token: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Client for the YouTube Data API `list` endpoints.
pub struct DataClient {
    session: Arc<Session>,
    base_url: String,
}

impl DataClient {
    /// Creates a client on the shared session.
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            base_url: DATA_BASE_URL.to_string(),
        }
    }

    /// Overrides the endpoint URL (tests).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// List one page of a resource collection.
    ///
    /// This is the generic entry point; the `*_list` wrappers pre-fill the
    /// resource name and the identifying parameter.
    #[instrument(skip(self, params))]
    pub async fn list(
        &self,
        resource: &str,
        params: &ListParams,
    ) -> Result<Page, SessionError> {
        let url = format!("{}/{resource}", self.base_url);
        let payload = self.session.get_json(&url, &params.to_query_pairs()).await?;

        let items = payload
            .get("items")
            .and_then(serde_json::Value::as_array)
            .cloned()
            .unwrap_or_default();
        let next_page_token = payload
            .get("nextPageToken")
            .and_then(serde_json::Value::as_str)
            .map(ToString::to_string);

        debug!(rows = items.len(), has_next = next_page_token.is_some(), "page received");
        Ok(Page {
            items: Table::from_items(&items),
            next_page_token,
        })
    }

    /// Follow `nextPageToken` until exhaustion, concatenating all pages.
    pub async fn collect_all(
        &self,
        resource: &str,
        params: &ListParams,
    ) -> Result<Table, SessionError> {
        let mut request = params.clone();
        let mut tables = Vec::new();
        loop {
            let page = self.list(resource, &request).await?;
            tables.push(page.items);
            match page.next_page_token {
                Some(token) => request = request.page_token(token),
                None => break,
            }
        }
        Ok(Table::concat(tables))
    }

    /// List channels (by id, or `mine`).
    pub async fn channels_list(&self, params: &ListParams) -> Result<Page, SessionError> {
        self.list("channels", params).await
    }

    /// List videos by id.
    pub async fn videos_list(
        &self,
        ids: impl Into<Names>,
        params: &ListParams,
    ) -> Result<Page, SessionError> {
        self.list("videos", &params.clone().ids(ids)).await
    }

    /// List playlists (by id, channel, or `mine`).
    pub async fn playlists_list(&self, params: &ListParams) -> Result<Page, SessionError> {
        self.list("playlists", params).await
    }

    /// List the items of a playlist.
    pub async fn playlist_items_list(
        &self,
        playlist_id: &str,
        params: &ListParams,
    ) -> Result<Page, SessionError> {
        self.list("playlistItems", &params.clone().playlist_id(playlist_id))
            .await
    }

    /// Search for resources matching a free-text query.
    pub async fn search_list(
        &self,
        query: &str,
        params: &ListParams,
    ) -> Result<Page, SessionError> {
        self.list("search", &params.clone().search_query(query)).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs_map(params: &ListParams) -> std::collections::HashMap<String, String> {
        params.to_query_pairs().into_iter().collect()
    }

    #[test]
    fn test_part_defaults_to_snippet() {
        let pairs = pairs_map(&ListParams::new());
        assert_eq!(pairs["part"], "snippet");
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_all_parameters() {
        let params = ListParams::new()
            .part(["snippet", "statistics"])
            .ids("a,b")
            .mine(true)
            .channel_id("UC1")
            .playlist_id("PL1")
            .search_query("rust")
            .max_results(50)
            .page_token("tok")
            .extra("order", "date");

        let pairs = pairs_map(&params);
        assert_eq!(pairs["part"], "snippet,statistics");
        assert_eq!(pairs["id"], "a,b");
        assert_eq!(pairs["mine"], "true");
        assert_eq!(pairs["channelId"], "UC1");
        assert_eq!(pairs["playlistId"], "PL1");
        assert_eq!(pairs["q"], "rust");
        assert_eq!(pairs["maxResults"], "50");
        assert_eq!(pairs["pageToken"], "tok");
        assert_eq!(pairs["order"], "date");
    }

    #[test]
    fn test_unset_parameters_are_omitted() {
        let pairs = pairs_map(&ListParams::new().mine(false));
        assert_eq!(pairs["mine"], "false");
        assert!(!pairs.contains_key("id"));
        assert!(!pairs.contains_key("pageToken"));
    }
}
