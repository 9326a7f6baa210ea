//! The transition controller: one actor task owning the playback state.
//!
//! Every cause of change (user intents, generation results, dwell timers,
//! player events) enters through a single unbounded queue and is handled to
//! completion before the next one. Dwell timers and in-flight generations
//! carry a token; a message whose token is no longer the expected one is
//! dropped. Player events carry the epoch of the `load` they belong to and
//! are dropped once another track has been loaded.

use std::sync::Arc;
use std::time::Duration;

use mixplayer::{PlayerAdapter, PlayerEvent, PlayerUpdate};
use mixplaylist::{Playlist, PlaylistSource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dwell_timer::DwellTimer;
use crate::errors::{ControlError, Result};
use crate::model::{PlaybackSnapshot, PowerState};
use crate::options::ControllerOptions;

const SNAPSHOT_CHANNEL_CAPACITY: usize = 256;

enum ControlMessage {
    SubmitTheme {
        theme: String,
        reply: oneshot::Sender<Result<()>>,
    },
    SelectTrack {
        index: usize,
        reply: oneshot::Sender<Result<()>>,
    },
    ShuffleRandom {
        reply: oneshot::Sender<Result<()>>,
    },
    TogglePlayPause {
        reply: oneshot::Sender<Result<()>>,
    },
    OpenExternally {
        reply: oneshot::Sender<Option<String>>,
    },
    DismissPlaybackError {
        reply: oneshot::Sender<()>,
    },
    Current {
        reply: oneshot::Sender<PlaybackSnapshot>,
    },
    GenerationDone {
        token: u64,
        result: mixplaylist::Result<Playlist>,
    },
    DwellElapsed {
        token: u64,
    },
    Player(PlayerUpdate),
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// What the controller is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    Idle,
    Generation { token: u64 },
    PowerOn { token: u64 },
    ChannelChange { token: u64, target: usize },
}

/// Handle on a running transition controller.
///
/// Cloning the handle is cheap; all clones talk to the same actor. The actor
/// stops on [`TransitionController::shutdown`] or when the last handle is
/// dropped.
#[derive(Clone)]
pub struct TransitionController {
    tx: UnboundedSender<ControlMessage>,
    state: watch::Receiver<PlaybackSnapshot>,
    snapshots: broadcast::Sender<PlaybackSnapshot>,
}

impl TransitionController {
    /// Starts the actor on the current tokio runtime.
    ///
    /// The controller becomes the only user of `source` and `player`.
    pub fn spawn(
        source: Arc<dyn PlaylistSource>,
        player: Arc<dyn PlayerAdapter>,
        options: ControllerOptions,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(PlaybackSnapshot::default());
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);

        let forwarder = tokio::spawn(forward_player_events(player.subscribe(), tx.downgrade()));

        let rng = match options.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let actor = ControllerActor {
            source,
            player,
            options,
            state: PlaybackSnapshot::default(),
            pending: Pending::Idle,
            missed_end: false,
            load_epoch: None,
            next_token: 0,
            dwell: DwellTimer::new(),
            rng,
            queue: tx.downgrade(),
            state_tx,
            snapshots: snapshots.clone(),
            forwarder,
        };
        tokio::spawn(actor.run(rx));

        info!("📺 Transition controller started");
        Self {
            tx,
            state: state_rx,
            snapshots,
        }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> ControlMessage,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(make(reply))
            .map_err(|_| ControlError::ControllerStopped)?;
        response.await.map_err(|_| ControlError::ControllerStopped)
    }

    /// Asks for a new playlist on `theme`.
    ///
    /// Returns once the request is accepted; the outcome shows up in the
    /// published snapshots (`power = On`, or `power = Off` with `last_error`).
    pub async fn submit_theme(&self, theme: impl Into<String>) -> Result<()> {
        let theme = theme.into();
        self.request(|reply| ControlMessage::SubmitTheme { theme, reply })
            .await?
    }

    /// Switches to the track at `index` (0-based) after the channel-change
    /// dwell.
    pub async fn select_track(&self, index: usize) -> Result<()> {
        self.request(|reply| ControlMessage::SelectTrack { index, reply })
            .await?
    }

    pub async fn shuffle_random(&self) -> Result<()> {
        self.request(|reply| ControlMessage::ShuffleRandom { reply })
            .await?
    }

    /// Asks the player to pause or resume. `is_playing` changes only when
    /// the player reports it.
    pub async fn toggle_play_pause(&self) -> Result<()> {
        self.request(|reply| ControlMessage::TogglePlayPause { reply })
            .await?
    }

    /// External link of the current track, if there is one.
    pub async fn open_externally(&self) -> Result<Option<String>> {
        self.request(|reply| ControlMessage::OpenExternally { reply })
            .await
    }

    pub async fn dismiss_playback_error(&self) -> Result<()> {
        self.request(|reply| ControlMessage::DismissPlaybackError { reply })
            .await
    }

    /// Snapshot taken after every previously sent intent was handled.
    pub async fn current(&self) -> Result<PlaybackSnapshot> {
        self.request(|reply| ControlMessage::Current { reply }).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| ControlMessage::Shutdown { reply })
            .await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.state.clone()
    }

    /// Every snapshot published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

async fn forward_player_events(
    mut events: UnboundedReceiver<PlayerUpdate>,
    queue: WeakUnboundedSender<ControlMessage>,
) {
    while let Some(update) = events.recv().await {
        let Some(tx) = queue.upgrade() else {
            break;
        };
        if tx.send(ControlMessage::Player(update)).is_err() {
            break;
        }
    }
}

struct ControllerActor {
    source: Arc<dyn PlaylistSource>,
    player: Arc<dyn PlayerAdapter>,
    options: ControllerOptions,
    state: PlaybackSnapshot,
    pending: Pending,
    // ENDED reçu pendant un changement de chaîne
    missed_end: bool,
    // Époque du dernier `load` accepté par le lecteur
    load_epoch: Option<u64>,
    next_token: u64,
    dwell: DwellTimer,
    rng: StdRng,
    queue: WeakUnboundedSender<ControlMessage>,
    state_tx: watch::Sender<PlaybackSnapshot>,
    snapshots: broadcast::Sender<PlaybackSnapshot>,
    forwarder: JoinHandle<()>,
}

impl ControllerActor {
    async fn run(mut self, mut rx: UnboundedReceiver<ControlMessage>) {
        while let Some(message) = rx.recv().await {
            if !self.handle(message) {
                break;
            }
        }
        self.dwell.cancel();
        self.forwarder.abort();
        info!("📺 Transition controller stopped");
    }

    /// Returns false when the actor must stop.
    fn handle(&mut self, message: ControlMessage) -> bool {
        match message {
            ControlMessage::SubmitTheme { theme, reply } => {
                let _ = reply.send(self.submit_theme(&theme));
            }
            ControlMessage::SelectTrack { index, reply } => {
                let _ = reply.send(self.select_track(index));
            }
            ControlMessage::ShuffleRandom { reply } => {
                let _ = reply.send(self.shuffle_random());
            }
            ControlMessage::TogglePlayPause { reply } => {
                let _ = reply.send(self.toggle_play_pause());
            }
            ControlMessage::OpenExternally { reply } => {
                let _ = reply.send(self.external_reference());
            }
            ControlMessage::DismissPlaybackError { reply } => {
                self.state.has_playback_error = false;
                self.publish();
                let _ = reply.send(());
            }
            ControlMessage::Current { reply } => {
                let _ = reply.send(self.state.clone());
            }
            ControlMessage::GenerationDone { token, result } => {
                self.generation_done(token, result);
            }
            ControlMessage::DwellElapsed { token } => self.dwell_elapsed(token),
            ControlMessage::Player(update) => self.player_event(update),
            ControlMessage::Shutdown { reply } => {
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    fn take_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    fn publish(&mut self) {
        if *self.state_tx.borrow() == self.state {
            return;
        }
        self.state_tx.send_replace(self.state.clone());
        // Pas d'abonné: rien à faire
        let _ = self.snapshots.send(self.state.clone());
    }

    fn schedule_dwell(&mut self, token: u64, delay: Duration) {
        let queue = self.queue.clone();
        self.dwell.schedule(token, delay, move |token| {
            if let Some(tx) = queue.upgrade() {
                let _ = tx.send(ControlMessage::DwellElapsed { token });
            }
        });
    }

    fn submit_theme(&mut self, theme: &str) -> Result<()> {
        let theme = theme.trim();
        if theme.is_empty() {
            return Err(ControlError::invalid_input("theme is empty"));
        }
        if matches!(self.pending, Pending::Generation { .. }) {
            return Err(ControlError::AlreadyLoading);
        }

        self.dwell.cancel();
        if self.player.is_loaded() {
            if let Err(e) = self.player.pause() {
                warn!("⚠️ Cannot pause player before loading a new mixtape: {}", e);
            }
        }

        let token = self.take_token();
        self.pending = Pending::Generation { token };
        self.missed_end = false;
        self.state.power = PowerState::Transitioning;
        self.state.is_loading = true;
        self.state.is_playing = false;
        self.state.has_playback_error = false;
        self.state.last_error = None;
        self.publish();

        info!("🎞️ Generating a mixtape for '{}'", theme);
        let source = self.source.clone();
        let queue = self.queue.clone();
        let theme = theme.to_string();
        let count = self.options.playlist_count;
        tokio::spawn(async move {
            let result = source.generate(&theme, count).await;
            if let Some(tx) = queue.upgrade() {
                let _ = tx.send(ControlMessage::GenerationDone { token, result });
            }
        });
        Ok(())
    }

    fn generation_done(&mut self, token: u64, result: mixplaylist::Result<Playlist>) {
        if self.pending != (Pending::Generation { token }) {
            debug!("Ignoring stale generation result (token {})", token);
            return;
        }
        self.state.is_loading = false;

        match result {
            Ok(playlist) if !playlist.is_empty() => {
                info!(
                    "🎞️ Mixtape '{}' ready with {} tracks",
                    playlist.theme(),
                    playlist.len()
                );
                self.state.playlist = playlist;
                self.state.current_index = 0;
                self.state.has_playback_error = false;
                self.state.last_error = None;

                let token = self.take_token();
                self.pending = Pending::PowerOn { token };
                self.schedule_dwell(token, self.options.power_on);
            }
            Ok(_) => self.generation_failed("empty playlist".to_string()),
            Err(e) => self.generation_failed(e.to_string()),
        }
        self.publish();
    }

    fn generation_failed(&mut self, reason: String) {
        warn!("❌ Playlist generation failed: {}", reason);
        self.pending = Pending::Idle;
        self.state.power = PowerState::Off;
        self.state.last_error = Some(reason);
    }

    fn dwell_elapsed(&mut self, token: u64) {
        if self.dwell.token() != Some(token) {
            debug!("Ignoring stale dwell timer (token {})", token);
            return;
        }
        self.dwell.clear();

        match self.pending {
            Pending::PowerOn { token: expected } if expected == token => {
                self.pending = Pending::Idle;
                self.state.power = PowerState::On;
                self.load_current();
                self.publish();
            }
            Pending::ChannelChange {
                token: expected,
                target,
            } if expected == token => self.commit_channel_change(target),
            _ => debug!("Ignoring dwell timer without matching transition"),
        }
    }

    /// Accepts a channel change only from `On`, or to retarget a change
    /// that is still in its dwell.
    fn accepts_channel_change(&self) -> bool {
        self.state.power == PowerState::On
            || matches!(self.pending, Pending::ChannelChange { .. })
    }

    fn select_track(&mut self, index: usize) -> Result<()> {
        let len = self.state.playlist.len();
        if len == 0 {
            return Ok(());
        }
        if index >= len {
            return Err(ControlError::InvalidIndex { index, len });
        }
        if !self.accepts_channel_change() {
            debug!("Ignoring track selection while {}", self.state.power);
            return Ok(());
        }

        if index == self.state.current_index {
            if matches!(self.pending, Pending::ChannelChange { .. }) {
                // Retour sur la chaîne courante: on abandonne le changement
                self.dwell.cancel();
                self.commit_channel_change(index);
            }
            return Ok(());
        }

        self.begin_channel_change(index);
        Ok(())
    }

    fn shuffle_random(&mut self) -> Result<()> {
        let len = self.state.playlist.len();
        if len == 0 || !self.accepts_channel_change() {
            return Ok(());
        }
        let target = self.rng.random_range(0..len);
        debug!("🔀 Shuffle picked track {}", target);
        self.begin_channel_change(target);
        Ok(())
    }

    fn begin_channel_change(&mut self, target: usize) {
        if !matches!(self.pending, Pending::ChannelChange { .. }) {
            self.missed_end = false;
        }
        self.dwell.cancel();

        let token = self.take_token();
        self.pending = Pending::ChannelChange { token, target };
        self.state.power = PowerState::Transitioning;
        self.publish();
        self.schedule_dwell(token, self.options.channel_change);
    }

    fn commit_channel_change(&mut self, target: usize) {
        self.pending = Pending::Idle;
        if target != self.state.current_index || self.missed_end {
            self.state.current_index = target;
            self.state.has_playback_error = false;
            self.load_current();
        }
        self.missed_end = false;
        self.state.power = PowerState::On;
        self.publish();
    }

    fn toggle_play_pause(&mut self) -> Result<()> {
        if self.state.playlist.is_empty() || self.state.power != PowerState::On {
            return Ok(());
        }
        if self.state.is_playing {
            self.player.pause()?;
        } else {
            self.player.play()?;
        }
        Ok(())
    }

    fn external_reference(&self) -> Option<String> {
        self.state
            .current_track()
            .map(|track| self.player.external_url(track.media_ref()))
    }

    fn player_event(&mut self, update: PlayerUpdate) {
        let PlayerUpdate { epoch, event } = update;
        if self.load_epoch != Some(epoch) {
            debug!("Ignoring player event {} from stale load epoch {}", event, epoch);
            return;
        }
        if self.state.power != PowerState::On {
            if event == PlayerEvent::Ended
                && matches!(self.pending, Pending::ChannelChange { .. })
            {
                self.missed_end = true;
            }
            debug!("Ignoring player event {} while {}", event, self.state.power);
            return;
        }

        match event {
            PlayerEvent::Playing => self.state.is_playing = true,
            PlayerEvent::Paused => self.state.is_playing = false,
            PlayerEvent::Error => {
                warn!("⚠️ Player reported an error on track {}", self.state.current_index);
                self.state.has_playback_error = true;
            }
            PlayerEvent::Ended => {
                let len = self.state.playlist.len();
                if len == 0 {
                    return;
                }
                self.state.current_index = (self.state.current_index + 1) % len;
                self.state.has_playback_error = false;
                self.load_current();
            }
        }
        self.publish();
    }

    fn load_current(&mut self) {
        let Some(track) = self.state.current_track() else {
            return;
        };
        let media_ref = track.media_ref().to_string();
        info!(
            "▶️ Now playing {} - {}",
            track.artist(),
            track.title()
        );

        self.state.is_playing = false;
        match self.player.load(&media_ref) {
            Ok(epoch) => self.load_epoch = Some(epoch),
            Err(e) => {
                warn!("⚠️ Cannot load {}: {}", media_ref, e);
                self.load_epoch = None;
                self.state.has_playback_error = true;
            }
        }
    }
}
