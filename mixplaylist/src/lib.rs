//! # mixplaylist
//!
//! Themed playlists for Mixtape: the `Track` / `Playlist` model and the HTTP
//! client that asks the generation endpoint for a playlist.
//!
//! ```no_run
//! use mixplaylist::PlaylistClient;
//!
//! # async fn example() -> mixplaylist::Result<()> {
//! let client = PlaylistClient::new()?;
//! let playlist = client.generate("hip hop", 10).await?;
//! println!("{} tracks", playlist.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod source;

pub use client::{
    ClientBuilder, DEFAULT_API_BASE, DEFAULT_PLAYLIST_COUNT, PlaylistClient, normalize_theme,
};
pub use error::{Error, Result};
pub use models::{Playlist, Track};
pub use source::PlaylistSource;
