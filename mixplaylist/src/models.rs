//! Track and Playlist types, plus the wire format of the generation endpoint

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One playable item with display metadata and an opaque media reference.
///
/// A track never changes once built; `media_ref` is what a
/// `PlayerAdapter` receives in `load()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    id: String,
    title: String,
    artist: String,
    thumbnail_url: String,
    media_ref: String,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        thumbnail_url: impl Into<String>,
        media_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            thumbnail_url: thumbnail_url.into(),
            media_ref: media_ref.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn thumbnail_url(&self) -> &str {
        &self.thumbnail_url
    }

    pub fn media_ref(&self) -> &str {
        &self.media_ref
    }
}

/// Ordered tracks produced by one generation call.
///
/// Insertion order is playback order. A playlist is replaced wholesale when a
/// new theme is loaded, never edited in place; clones share the same track
/// storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    theme: String,
    tracks: Arc<Vec<Track>>,
    message: Option<String>,
}

impl Playlist {
    pub fn new(theme: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            theme: theme.into(),
            tracks: Arc::new(tracks),
            message: None,
        }
    }

    /// Attach the informational message returned by the server
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Body of `POST /generate-playlist`
#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest<'a> {
    pub theme: &'a str,
    pub count: u32,
}

/// One entry of the `playlist` array returned by the endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct SongPayload {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(rename = "videoId", alias = "mediaRef")]
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    pub playlist: Vec<SongPayload>,
    #[serde(default)]
    pub message: Option<String>,
}

impl GenerateResponse {
    /// Builds the playlist, keeping the server order.
    ///
    /// Entries without an explicit id get `<position>-<media ref>` so that a
    /// video listed twice still yields two distinct tracks.
    pub(crate) fn into_playlist(self, theme: &str) -> Result<Playlist> {
        if self.playlist.is_empty() {
            return Err(Error::generation_failed("server returned an empty playlist"));
        }

        let tracks = self
            .playlist
            .into_iter()
            .enumerate()
            .map(|(position, song)| {
                let id = song
                    .id
                    .unwrap_or_else(|| format!("{}-{}", position, song.video_id));
                Track::new(id, song.title, song.artist, song.thumbnail, song.video_id)
            })
            .collect();

        let playlist = Playlist::new(theme, tracks);
        Ok(match self.message {
            Some(message) => playlist.with_message(message),
            None => playlist,
        })
    }
}
