//! Simulated player driven by tokio timers.
//!
//! Stands in for the embedded video widget when the application runs in a
//! terminal: it keeps a virtual playback position, reports state changes
//! through the same event stream a real widget would, and ends each track
//! after a configurable duration.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::adapter::PlayerAdapter;
use crate::errors::PlayerError;
use crate::events::{PlayerEvent, PlayerEventBus, PlayerUpdate};

pub const DEFAULT_TRACK_SECS: u64 = 30;
pub const DEFAULT_STARTUP_MS: u64 = 200;
const DEFAULT_TICK_MS: u64 = 100;

#[derive(Clone, Debug)]
pub struct SimulatedPlayerOptions {
    /// Virtual length of every track.
    pub track_length: Duration,
    /// Delay between `load` and the first `Playing` event.
    pub startup: Duration,
    /// Resolution of the virtual clock.
    pub tick: Duration,
}

impl Default for SimulatedPlayerOptions {
    fn default() -> Self {
        Self {
            track_length: Duration::from_secs(DEFAULT_TRACK_SECS),
            startup: Duration::from_millis(DEFAULT_STARTUP_MS),
            tick: Duration::from_millis(DEFAULT_TICK_MS),
        }
    }
}

impl SimulatedPlayerOptions {
    /// Reads `player.track_secs` and `player.startup_ms`.
    #[cfg(feature = "mixconfig")]
    pub fn from_config(config: &mixconfig::Config) -> Self {
        let defaults = Self::default();
        Self {
            track_length: config
                .get_player_track_secs()
                .map(Duration::from_secs)
                .unwrap_or(defaults.track_length),
            startup: config
                .get_player_startup_ms()
                .map(Duration::from_millis)
                .unwrap_or(defaults.startup),
            tick: defaults.tick,
        }
    }
}

#[derive(Default)]
struct SimState {
    loaded: Option<String>,
    started: bool,
    playing: bool,
    ended: bool,
    position: Duration,
    generation: u64,
    unavailable: HashSet<String>,
}

pub struct SimulatedPlayer {
    options: SimulatedPlayerOptions,
    state: Arc<Mutex<SimState>>,
    bus: PlayerEventBus,
    clock: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatedPlayer {
    pub fn new(options: SimulatedPlayerOptions) -> Self {
        Self {
            options,
            state: Arc::new(Mutex::new(SimState::default())),
            bus: PlayerEventBus::new(),
            clock: Mutex::new(None),
        }
    }

    /// Marks a media reference as unplayable: loading it reports `Error`
    /// instead of starting playback.
    pub fn mark_unavailable(&self, media_ref: &str) {
        let mut state = self.state.lock().unwrap();
        state.unavailable.insert(media_ref.to_string());
    }

    pub fn loaded(&self) -> Option<String> {
        self.state.lock().unwrap().loaded.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    pub fn position(&self) -> Duration {
        self.state.lock().unwrap().position
    }

    pub fn options(&self) -> &SimulatedPlayerOptions {
        &self.options
    }

    fn cancel_clock(&self) {
        if let Some(handle) = self.clock.lock().unwrap().take() {
            handle.abort();
        }
    }

    async fn run_clock(
        state: Arc<Mutex<SimState>>,
        bus: PlayerEventBus,
        options: SimulatedPlayerOptions,
        generation: u64,
    ) {
        tokio::time::sleep(options.startup).await;

        {
            let mut s = state.lock().unwrap();
            if s.generation != generation {
                return;
            }
            let Some(media_ref) = s.loaded.clone() else {
                return;
            };
            if s.unavailable.contains(&media_ref) {
                warn!("🎬 Media {} is unavailable", media_ref);
                bus.broadcast(generation, PlayerEvent::Error);
                return;
            }
            s.started = true;
            s.playing = true;
            debug!("🎬 Autoplay started for {}", media_ref);
            bus.broadcast(generation, PlayerEvent::Playing);
        }

        let mut ticker = tokio::time::interval(options.tick);
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let mut s = state.lock().unwrap();
            if s.generation != generation {
                return;
            }
            if !s.playing {
                continue;
            }
            s.position += options.tick;
            if s.position >= options.track_length {
                s.position = options.track_length;
                s.playing = false;
                s.ended = true;
                debug!("🎬 Track finished");
                bus.broadcast(generation, PlayerEvent::Ended);
                return;
            }
        }
    }
}

impl Default for SimulatedPlayer {
    fn default() -> Self {
        Self::new(SimulatedPlayerOptions::default())
    }
}

impl PlayerAdapter for SimulatedPlayer {
    fn load(&self, media_ref: &str) -> Result<u64, PlayerError> {
        if media_ref.trim().is_empty() {
            return Err(PlayerError::load_failed(media_ref, "empty media reference"));
        }
        let runtime = Handle::try_current().map_err(|_| PlayerError::NoRuntime)?;

        self.cancel_clock();

        let generation = {
            let mut s = self.state.lock().unwrap();
            s.generation += 1;
            s.loaded = Some(media_ref.to_string());
            s.started = false;
            s.playing = false;
            s.ended = false;
            s.position = Duration::ZERO;
            s.generation
        };

        debug!("🎬 Loading {}", media_ref);
        let handle = runtime.spawn(Self::run_clock(
            self.state.clone(),
            self.bus.clone(),
            self.options.clone(),
            generation,
        ));
        *self.clock.lock().unwrap() = Some(handle);
        Ok(generation)
    }

    fn play(&self) -> Result<(), PlayerError> {
        let mut s = self.state.lock().unwrap();
        // Pas encore démarré, fini ou indisponible: rien à reprendre
        if s.loaded.is_none() || !s.started || s.ended || s.playing {
            return Ok(());
        }
        s.playing = true;
        self.bus.broadcast(s.generation, PlayerEvent::Playing);
        Ok(())
    }

    fn pause(&self) -> Result<(), PlayerError> {
        let mut s = self.state.lock().unwrap();
        if !s.playing {
            return Ok(());
        }
        s.playing = false;
        self.bus.broadcast(s.generation, PlayerEvent::Paused);
        Ok(())
    }

    fn subscribe(&self) -> UnboundedReceiver<PlayerUpdate> {
        self.bus.subscribe()
    }

    fn is_loaded(&self) -> bool {
        self.state.lock().unwrap().loaded.is_some()
    }
}

impl Drop for SimulatedPlayer {
    fn drop(&mut self) {
        self.cancel_clock();
    }
}
