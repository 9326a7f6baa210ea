//! # mixcontrol
//!
//! Playback and transition state machine of Mixtape.
//!
//! [`TransitionController`] owns the playlist, the current index and the
//! power state of the simulated television. It drives the power-up and
//! channel-change sequences (`Off` → `Transitioning` → `On`) and reconciles
//! the player's events with its own state. Other components submit intents
//! and read [`PlaybackSnapshot`]s.
//!
//! ```no_run
//! use std::sync::Arc;
//! use mixcontrol::{ControllerOptions, TransitionController};
//! use mixplayer::SimulatedPlayer;
//! use mixplaylist::PlaylistClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let controller = TransitionController::spawn(
//!     Arc::new(PlaylistClient::new()?),
//!     Arc::new(SimulatedPlayer::default()),
//!     ControllerOptions::default(),
//! );
//! controller.submit_theme("grunge").await?;
//! let mut state = controller.watch();
//! state.wait_for(|s| s.power.is_on()).await?;
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod dwell_timer;
pub mod errors;
pub mod model;
pub mod options;

pub use controller::TransitionController;
pub use errors::{ControlError, Result};
pub use model::{PlaybackSnapshot, PowerState};
pub use options::ControllerOptions;
