//! HTTP client for the playlist generation endpoint

use crate::error::{Error, Result};
use crate::models::{GenerateRequest, GenerateResponse, Playlist};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Default API base URL (the path `/generate-playlist` is appended)
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8001/api";

/// Number of tracks requested per theme
pub const DEFAULT_PLAYLIST_COUNT: u32 = 10;

/// Default timeout for generation requests
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "mixplaylist/0.1.0";

/// Trims a theme and rejects blank ones.
pub fn normalize_theme(theme: &str) -> Result<&str> {
    let trimmed = theme.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("theme must not be empty".to_string()));
    }
    Ok(trimmed)
}

/// Client for `POST /api/generate-playlist`
///
/// One call per `generate()`; retries are left to the caller.
///
/// # Example
///
/// ```no_run
/// use mixplaylist::{PlaylistClient, DEFAULT_PLAYLIST_COUNT};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = PlaylistClient::builder()
///         .api_base("http://localhost:8001/api")
///         .build()?;
///     let playlist = client.generate("grunge", DEFAULT_PLAYLIST_COUNT).await?;
///     for track in &playlist {
///         println!("{} - {}", track.artist(), track.title());
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PlaylistClient {
    client: Client,
    api_base: String,
    request_timeout: Duration,
}

impl PlaylistClient {
    /// Create a new client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client with a custom reqwest::Client
    pub fn with_client(client: Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self) -> String {
        format!("{}/generate-playlist", self.api_base.trim_end_matches('/'))
    }

    /// Ask the endpoint for `count` tracks matching `theme`.
    ///
    /// The theme is trimmed; a blank theme fails with `InvalidInput` without
    /// any request. Every other failure is `GenerationFailed`.
    pub async fn generate(&self, theme: &str, count: u32) -> Result<Playlist> {
        let theme = normalize_theme(theme)?;
        let url = self.endpoint();

        debug!(%url, theme, count, "Requesting playlist");

        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(&GenerateRequest { theme, count })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation_failed(format!(
                "server returned {}: {}",
                status,
                body.trim()
            )));
        }

        let payload: GenerateResponse = response.json().await?;
        let playlist = payload.into_playlist(theme)?;

        info!(
            theme,
            tracks = playlist.len(),
            message = playlist.message().unwrap_or(""),
            "🎞️ Playlist generated"
        );

        Ok(playlist)
    }
}

/// Builder for configuring a PlaylistClient
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    api_base: String,
    request_timeout: Duration,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-filled from `backend.url` and `backend.request_timeout_secs`
    #[cfg(feature = "mixconfig")]
    pub fn from_config(config: &mixconfig::Config) -> Self {
        let mut builder = Self::default();
        if let Ok(url) = config.get_backend_url() {
            builder.api_base = url;
        }
        if let Ok(secs) = config.get_request_timeout_secs() {
            builder.request_timeout = Duration::from_secs(secs);
        }
        builder
    }

    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the API base URL
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<PlaylistClient> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.request_timeout)
                .build()?,
        };

        Ok(PlaylistClient {
            client,
            api_base: self.api_base,
            request_timeout: self.request_timeout,
        })
    }
}
