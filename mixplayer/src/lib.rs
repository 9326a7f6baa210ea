//! # mixplayer
//!
//! Playback widget abstraction for Mixtape.
//!
//! - [`PlayerAdapter`] : load / play / pause and an event stream
//! - [`PlayerEventBus`] : fan-out of [`PlayerEvent`]s, stamped with the load
//!   epoch ([`PlayerUpdate`]), to subscribers
//! - [`SimulatedPlayer`] : a widget driven by tokio timers, used by the
//!   terminal front end

pub mod adapter;
pub mod errors;
pub mod events;
pub mod simulated;

pub use adapter::{PlayerAdapter, WATCH_URL_BASE, watch_url};
pub use errors::PlayerError;
pub use events::{PlayerEvent, PlayerEventBus, PlayerUpdate};
pub use simulated::{SimulatedPlayer, SimulatedPlayerOptions};
