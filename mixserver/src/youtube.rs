//! Minimal client for the YouTube Data API search endpoint.

use std::time::Duration;

use mixconfig::Config;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::catalog::thumbnail_url;
use crate::models::Song;

pub const DEFAULT_SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
pub const DEFAULT_SEARCH_PREFIX: &str = "90s music";
pub const DEFAULT_MAX_RESULTS: usize = 50;
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search returned status {0}")]
    Status(u16),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct ItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl SearchItem {
    fn into_song(self) -> Option<Song> {
        let video_id = self.id.video_id?;
        let thumbnail = self
            .snippet
            .thumbnails
            .medium
            .map(|t| t.url)
            .unwrap_or_else(|| thumbnail_url(&video_id));
        Some(Song {
            title: self.snippet.title,
            artist: self.snippet.channel_title,
            video_id,
            thumbnail,
        })
    }
}

#[derive(Debug, Clone)]
pub struct YoutubeSearch {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    search_prefix: String,
    max_results: usize,
}

impl YoutubeSearch {
    pub fn new(api_key: impl Into<String>) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_client(client, api_key))
    }

    pub fn with_client(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_url: DEFAULT_SEARCH_URL.to_string(),
            api_key: api_key.into(),
            search_prefix: DEFAULT_SEARCH_PREFIX.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Builds the client from the `youtube` section; `None` without an API key.
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = config.get_youtube_api_key();
        if api_key.trim().is_empty() {
            return None;
        }
        let mut search = match Self::new(api_key) {
            Ok(search) => search,
            Err(e) => {
                tracing::warn!("❌ Cannot build YouTube client: {}", e);
                return None;
            }
        };
        if let Ok(url) = config.get_youtube_api_url() {
            search.api_url = url;
        }
        if let Ok(prefix) = config.get_youtube_search_prefix() {
            search.search_prefix = prefix;
        }
        if let Ok(max) = config.get_youtube_max_results() {
            search.max_results = max;
        }
        Some(search)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_search_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.search_prefix = prefix.into();
        self
    }

    pub fn query_for(&self, theme: &str) -> String {
        format!("{} {}", self.search_prefix, theme.to_lowercase())
            .trim()
            .to_string()
    }

    /// Searches embeddable videos for `theme` and keeps the first `count`.
    pub async fn search(&self, theme: &str, count: usize) -> Result<Vec<Song>, SearchError> {
        let query = self.query_for(theme);
        debug!("🔎 YouTube search: {}", query);

        let max_results = self.max_results.to_string();
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("part", "snippet"),
                ("q", query.as_str()),
                ("type", "video"),
                ("videoEmbeddable", "true"),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Http(e.without_url()))?;

        Ok(body
            .items
            .into_iter()
            .filter_map(SearchItem::into_song)
            .take(count)
            .collect())
    }
}
