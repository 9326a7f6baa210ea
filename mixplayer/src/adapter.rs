//! Abstraction over the embedded playback widget.

use tokio::sync::mpsc::UnboundedReceiver;

use crate::errors::PlayerError;
use crate::events::PlayerUpdate;

/// Base URL used to open a media reference outside the application.
pub const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// Builds the external "open in browser" link for a media reference.
pub fn watch_url(media_ref: &str) -> String {
    format!("{}{}", WATCH_URL_BASE, media_ref)
}

/// Capability set of a playback widget: load / play / pause plus an event
/// stream.
///
/// Implementations wrap exactly one widget instance. The embedding technology
/// is an implementation detail; the transition controller only talks to this
/// trait.
pub trait PlayerAdapter: Send + Sync {
    /// Replaces the loaded content. Autoplay is requested, but whether
    /// playback actually starts is reported through `PlayerEvent::Playing`.
    ///
    /// Returns the epoch of this load. Every later event about this content
    /// carries it, until the next `load` opens a new one.
    fn load(&self, media_ref: &str) -> Result<u64, PlayerError>;

    /// Starts or resumes playback. No-op when nothing is loaded.
    fn play(&self) -> Result<(), PlayerError>;

    /// Pauses playback. No-op when nothing is loaded.
    fn pause(&self) -> Result<(), PlayerError>;

    /// New receiver for the widget's state changes.
    fn subscribe(&self) -> UnboundedReceiver<PlayerUpdate>;

    /// True once `load` has been called.
    fn is_loaded(&self) -> bool;

    /// Reference a caller can open outside the application.
    fn external_url(&self, media_ref: &str) -> String {
        watch_url(media_ref)
    }
}
