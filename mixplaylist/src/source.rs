//! Playlist source abstraction
//!
//! The transition controller only needs "give me a playlist for this theme";
//! `PlaylistClient` is the production implementation, tests plug in their own.

use crate::client::PlaylistClient;
use crate::error::Result;
use crate::models::Playlist;
use async_trait::async_trait;

#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// Produce a playlist of at most `count` tracks for `theme`.
    async fn generate(&self, theme: &str, count: u32) -> Result<Playlist>;
}

#[async_trait]
impl PlaylistSource for PlaylistClient {
    async fn generate(&self, theme: &str, count: u32) -> Result<Playlist> {
        PlaylistClient::generate(self, theme, count).await
    }
}
