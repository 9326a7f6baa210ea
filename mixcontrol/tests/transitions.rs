//! Transition table of the controller, driven with a recording player and a
//! scripted playlist source on tokio's paused clock.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mixcontrol::{ControlError, ControllerOptions, PlaybackSnapshot, PowerState, TransitionController};
use mixplayer::{PlayerAdapter, PlayerError, PlayerEvent, PlayerEventBus, PlayerUpdate};
use mixplaylist::{Playlist, PlaylistSource, Track};
use tokio::sync::broadcast;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Instant, timeout};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    Load(String),
    Play,
    Pause,
}

#[derive(Default)]
struct RecordingPlayer {
    calls: Mutex<Vec<Call>>,
    loaded: Mutex<Option<String>>,
    epoch: Mutex<u64>,
    bus: PlayerEventBus,
}

impl RecordingPlayer {
    /// Event about the content loaded last.
    fn emit(&self, event: PlayerEvent) {
        let epoch = *self.epoch.lock().unwrap();
        self.bus.broadcast(epoch, event);
    }

    fn epoch(&self) -> u64 {
        *self.epoch.lock().unwrap()
    }

    fn emit_for(&self, epoch: u64, event: PlayerEvent) {
        self.bus.broadcast(epoch, event);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn loads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Load(media_ref) => Some(media_ref),
                _ => None,
            })
            .collect()
    }
}

impl PlayerAdapter for RecordingPlayer {
    fn load(&self, media_ref: &str) -> Result<u64, PlayerError> {
        self.calls.lock().unwrap().push(Call::Load(media_ref.to_string()));
        *self.loaded.lock().unwrap() = Some(media_ref.to_string());
        let mut epoch = self.epoch.lock().unwrap();
        *epoch += 1;
        Ok(*epoch)
    }

    fn play(&self) -> Result<(), PlayerError> {
        self.calls.lock().unwrap().push(Call::Play);
        Ok(())
    }

    fn pause(&self) -> Result<(), PlayerError> {
        self.calls.lock().unwrap().push(Call::Pause);
        Ok(())
    }

    fn subscribe(&self) -> UnboundedReceiver<PlayerUpdate> {
        self.bus.subscribe()
    }

    fn is_loaded(&self) -> bool {
        self.loaded.lock().unwrap().is_some()
    }
}

/// Answers generation calls from a script, after an optional delay.
#[derive(Default)]
struct ScriptedSource {
    responses: Mutex<VecDeque<mixplaylist::Result<Playlist>>>,
    requests: Mutex<Vec<(String, u32)>>,
    delay: Duration,
}

impl ScriptedSource {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    fn push(&self, response: mixplaylist::Result<Playlist>) {
        self.responses.lock().unwrap().push_back(response);
    }

    fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaylistSource for ScriptedSource {
    async fn generate(&self, theme: &str, count: u32) -> mixplaylist::Result<Playlist> {
        self.requests.lock().unwrap().push((theme.to_string(), count));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(mixplaylist::Error::generation_failed("no scripted response")))
    }
}

fn playlist(theme: &str, len: usize) -> Playlist {
    let tracks = (0..len)
        .map(|i| {
            Track::new(
                format!("{}", i),
                format!("Song {}", i),
                format!("Artist {}", i),
                format!("https://i.ytimg.com/vi/vid{:02}/hqdefault.jpg", i),
                format!("vid{:02}", i),
            )
        })
        .collect();
    Playlist::new(theme, tracks)
}

fn options() -> ControllerOptions {
    ControllerOptions::default().with_seed(7)
}

struct Harness {
    controller: TransitionController,
    player: Arc<RecordingPlayer>,
    source: Arc<ScriptedSource>,
}

fn harness_with(source: ScriptedSource) -> Harness {
    let player = Arc::new(RecordingPlayer::default());
    let source = Arc::new(source);
    let controller = TransitionController::spawn(source.clone(), player.clone(), options());
    Harness {
        controller,
        player,
        source,
    }
}

fn harness() -> Harness {
    harness_with(ScriptedSource::default())
}

async fn wait_until(
    controller: &TransitionController,
    predicate: impl FnMut(&PlaybackSnapshot) -> bool,
) -> PlaybackSnapshot {
    let mut state = controller.watch();
    let snapshot = timeout(Duration::from_secs(60), state.wait_for(predicate))
        .await
        .expect("state not reached before timeout")
        .expect("controller stopped");
    snapshot.clone()
}

/// Submits a theme answered with `len` tracks and waits for power on.
async fn powered_on(len: usize) -> Harness {
    let h = harness();
    h.source.push(Ok(playlist("grunge", len)));
    h.controller.submit_theme("grunge").await.unwrap();
    wait_until(&h.controller, |s| s.power == PowerState::On).await;
    h
}

fn drain_powers(rx: &mut broadcast::Receiver<PlaybackSnapshot>) -> Vec<PowerState> {
    let mut powers: Vec<PowerState> = Vec::new();
    while let Ok(snapshot) = rx.try_recv() {
        if powers.last() != Some(&snapshot.power) {
            powers.push(snapshot.power);
        }
    }
    powers
}

#[tokio::test(start_paused = true)]
async fn test_grunge_theme_powers_on_at_first_track() {
    let h = harness();
    h.source.push(Ok(playlist("grunge", 10)));
    let mut published = h.controller.subscribe();
    assert_eq!(h.controller.snapshot().power, PowerState::Off);

    let started = Instant::now();
    h.controller.submit_theme("grunge").await.unwrap();

    assert_eq!(h.controller.snapshot().power, PowerState::Transitioning);

    let snapshot = wait_until(&h.controller, |s| s.power == PowerState::On).await;
    assert!(started.elapsed() >= Duration::from_millis(1500));
    assert_eq!(snapshot.current_index, 0);
    assert_eq!(snapshot.playlist.len(), 10);
    assert!(!snapshot.is_loading);
    assert!(snapshot.last_error.is_none());
    assert_eq!(h.source.requests(), vec![("grunge".to_string(), 10)]);
    assert_eq!(h.player.loads(), vec!["vid00".to_string()]);

    assert_eq!(
        drain_powers(&mut published),
        vec![PowerState::Transitioning, PowerState::On]
    );

    // isPlaying ne bascule qu'avec l'événement du lecteur
    assert!(!h.controller.current().await.unwrap().is_playing);
    h.player.emit(PlayerEvent::Playing);
    let snapshot = wait_until(&h.controller, |s| s.is_playing).await;
    assert_eq!(snapshot.power, PowerState::On);
}

#[tokio::test(start_paused = true)]
async fn test_blank_theme_is_rejected_without_request() {
    let h = harness();

    let err = h.controller.submit_theme("   \t").await.unwrap_err();
    assert!(matches!(err, ControlError::InvalidInput(_)));
    assert!(h.source.requests().is_empty());
    assert_eq!(h.controller.current().await.unwrap().power, PowerState::Off);
}

#[tokio::test(start_paused = true)]
async fn test_second_submit_while_loading_is_rejected() {
    let h = harness_with(ScriptedSource::with_delay(Duration::from_secs(2)));
    h.source.push(Ok(playlist("grunge", 3)));

    h.controller.submit_theme("grunge").await.unwrap();
    assert_eq!(
        h.controller.submit_theme("pop").await,
        Err(ControlError::AlreadyLoading)
    );

    let snapshot = wait_until(&h.controller, |s| s.power == PowerState::On).await;
    assert_eq!(snapshot.playlist.theme(), "grunge");
    assert_eq!(h.source.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_ended_on_last_track_wraps_to_first() {
    let h = powered_on(3).await;

    h.controller.select_track(2).await.unwrap();
    wait_until(&h.controller, |s| s.power == PowerState::On && s.current_index == 2).await;
    h.player.emit(PlayerEvent::Playing);
    wait_until(&h.controller, |s| s.is_playing).await;

    let mut published = h.controller.subscribe();
    h.player.emit(PlayerEvent::Ended);
    let snapshot = wait_until(&h.controller, |s| s.current_index == 0).await;

    assert_eq!(snapshot.power, PowerState::On);
    assert!(!snapshot.is_playing);
    assert_eq!(h.player.loads().last().map(String::as_str), Some("vid00"));
    // Pas d'écran de neige sur l'enchaînement naturel
    assert!(!drain_powers(&mut published).contains(&PowerState::Transitioning));
}

#[tokio::test(start_paused = true)]
async fn test_ended_advances_to_next_track() {
    let h = powered_on(3).await;

    h.player.emit(PlayerEvent::Ended);
    let snapshot = wait_until(&h.controller, |s| s.current_index == 1).await;
    assert_eq!(snapshot.power, PowerState::On);
    assert_eq!(h.player.loads(), vec!["vid00".to_string(), "vid01".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_toggle_waits_for_player_confirmation() {
    let h = powered_on(2).await;
    h.player.emit(PlayerEvent::Playing);
    wait_until(&h.controller, |s| s.is_playing).await;

    h.controller.toggle_play_pause().await.unwrap();
    assert_eq!(h.player.calls().last(), Some(&Call::Pause));
    assert!(h.controller.current().await.unwrap().is_playing);

    h.player.emit(PlayerEvent::Paused);
    wait_until(&h.controller, |s| !s.is_playing).await;

    h.controller.toggle_play_pause().await.unwrap();
    assert_eq!(h.player.calls().last(), Some(&Call::Play));
}

#[tokio::test(start_paused = true)]
async fn test_selecting_current_track_is_a_noop() {
    let h = powered_on(3).await;
    let mut published = h.controller.subscribe();

    h.controller.select_track(0).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let snapshot = h.controller.current().await.unwrap();
    assert_eq!(snapshot.power, PowerState::On);
    assert!(drain_powers(&mut published).is_empty());
    assert_eq!(h.player.loads().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_select_runs_channel_change_dwell() {
    let h = powered_on(3).await;
    let mut published = h.controller.subscribe();

    let started = Instant::now();
    h.controller.select_track(1).await.unwrap();
    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.power, PowerState::Transitioning);
    assert_eq!(snapshot.current_index, 0);
    assert_eq!(h.player.loads().len(), 1);

    let snapshot = wait_until(&h.controller, |s| s.power == PowerState::On).await;
    assert!(started.elapsed() >= Duration::from_millis(500));
    assert_eq!(snapshot.current_index, 1);
    assert_eq!(h.player.loads().last().map(String::as_str), Some("vid01"));
    assert_eq!(
        drain_powers(&mut published),
        vec![PowerState::Transitioning, PowerState::On]
    );
}

#[tokio::test(start_paused = true)]
async fn test_out_of_range_selection_is_rejected() {
    let h = powered_on(3).await;

    assert_eq!(
        h.controller.select_track(5).await,
        Err(ControlError::InvalidIndex { index: 5, len: 3 })
    );
    assert_eq!(h.controller.current().await.unwrap().power, PowerState::On);
}

#[tokio::test(start_paused = true)]
async fn test_shuffle_on_single_track_keeps_index_and_dwells() {
    let h = powered_on(1).await;
    let mut published = h.controller.subscribe();

    h.controller.shuffle_random().await.unwrap();
    assert_eq!(h.controller.snapshot().power, PowerState::Transitioning);

    let snapshot = wait_until(&h.controller, |s| s.power == PowerState::On).await;
    assert_eq!(snapshot.current_index, 0);
    assert_eq!(h.player.loads().len(), 1);
    assert_eq!(
        drain_powers(&mut published),
        vec![PowerState::Transitioning, PowerState::On]
    );
}

#[tokio::test(start_paused = true)]
async fn test_shuffle_lands_inside_playlist() {
    let h = powered_on(5).await;

    for _ in 0..10 {
        h.controller.shuffle_random().await.unwrap();
        let snapshot = wait_until(&h.controller, |s| s.power == PowerState::On).await;
        assert!(snapshot.current_index < 5);
    }
}

#[tokio::test(start_paused = true)]
async fn test_generation_failure_keeps_previous_playlist() {
    let h = powered_on(3).await;
    h.controller.select_track(1).await.unwrap();
    wait_until(&h.controller, |s| s.power == PowerState::On && s.current_index == 1).await;

    h.source
        .push(Err(mixplaylist::Error::generation_failed("server returned 500")));
    h.controller.submit_theme("pop").await.unwrap();

    let snapshot = wait_until(&h.controller, |s| !s.is_loading).await;
    assert_eq!(snapshot.power, PowerState::Off);
    assert_eq!(snapshot.playlist.theme(), "grunge");
    assert_eq!(snapshot.playlist.len(), 3);
    assert_eq!(snapshot.current_index, 1);
    assert!(snapshot.last_error.unwrap().contains("500"));
    // L'écran s'éteint: le lecteur a été mis en pause
    assert!(h.player.calls().contains(&Call::Pause));
}

#[tokio::test(start_paused = true)]
async fn test_first_generation_failure_turns_off() {
    let h = harness();
    h.source
        .push(Err(mixplaylist::Error::generation_failed("connection refused")));

    h.controller.submit_theme("grunge").await.unwrap();
    let snapshot = wait_until(&h.controller, |s| !s.is_loading).await;

    assert_eq!(snapshot.power, PowerState::Off);
    assert!(snapshot.playlist.is_empty());
    assert!(snapshot.last_error.is_some());
    assert!(h.player.loads().is_empty());

    // Un nouvel essai est possible
    h.source.push(Ok(playlist("grunge", 2)));
    h.controller.submit_theme("grunge").await.unwrap();
    let snapshot = wait_until(&h.controller, |s| s.power == PowerState::On).await;
    assert!(snapshot.last_error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_empty_generation_result_is_a_failure() {
    let h = harness();
    h.source.push(Ok(playlist("grunge", 0)));

    h.controller.submit_theme("grunge").await.unwrap();
    let snapshot = wait_until(&h.controller, |s| !s.is_loading).await;
    assert_eq!(snapshot.power, PowerState::Off);
    assert!(snapshot.last_error.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_pending_selection_wins_over_ended() {
    let h = powered_on(3).await;

    h.controller.select_track(2).await.unwrap();
    h.player.emit(PlayerEvent::Ended);

    let snapshot = wait_until(&h.controller, |s| s.power == PowerState::On).await;
    assert_eq!(snapshot.current_index, 2);
    assert_eq!(h.player.loads(), vec!["vid00".to_string(), "vid02".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_selection_wins_over_ended_at_dwell_deadline() {
    let h = powered_on(3).await;

    h.controller.select_track(2).await.unwrap();
    let deadline = Instant::now() + Duration::from_millis(500);
    let player = h.player.clone();
    let ender = tokio::spawn(async move {
        tokio::time::sleep_until(deadline).await;
        player.emit(PlayerEvent::Ended);
    });

    let snapshot = wait_until(&h.controller, |s| s.power == PowerState::On).await;
    assert_eq!(snapshot.current_index, 2);
    ender.await.unwrap();

    // L'ENDED de l'ancienne piste ne doit pas faire avancer la nouvelle
    tokio::time::sleep(Duration::from_millis(50)).await;
    let snapshot = h.controller.current().await.unwrap();
    assert_eq!(snapshot.current_index, 2);
    assert_eq!(snapshot.power, PowerState::On);
    assert_eq!(h.player.loads(), vec!["vid00".to_string(), "vid02".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_events_from_replaced_track_are_ignored() {
    let h = powered_on(3).await;
    let first = h.player.epoch();

    h.controller.select_track(1).await.unwrap();
    wait_until(&h.controller, |s| s.power == PowerState::On && s.current_index == 1).await;

    h.player.emit_for(first, PlayerEvent::Playing);
    h.player.emit_for(first, PlayerEvent::Error);
    h.player.emit_for(first, PlayerEvent::Ended);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let snapshot = h.controller.current().await.unwrap();
    assert_eq!(snapshot.current_index, 1);
    assert!(!snapshot.is_playing);
    assert!(!snapshot.has_playback_error);
    assert_eq!(h.player.loads().len(), 2);

    h.player.emit(PlayerEvent::Playing);
    wait_until(&h.controller, |s| s.is_playing).await;
}

#[tokio::test(start_paused = true)]
async fn test_second_selection_cancels_stale_dwell() {
    let h = powered_on(3).await;

    h.controller.select_track(1).await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    h.controller.select_track(2).await.unwrap();

    // Le premier timer aurait expiré à 500 ms
    tokio::time::sleep(Duration::from_millis(300)).await;
    let snapshot = h.controller.current().await.unwrap();
    assert_eq!(snapshot.power, PowerState::Transitioning);
    assert_eq!(snapshot.current_index, 0);

    let snapshot = wait_until(&h.controller, |s| s.power == PowerState::On).await;
    assert_eq!(snapshot.current_index, 2);
    assert_eq!(h.player.loads(), vec!["vid00".to_string(), "vid02".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_reselecting_current_track_mid_dwell_cancels_change() {
    let h = powered_on(3).await;

    h.controller.select_track(2).await.unwrap();
    h.controller.select_track(0).await.unwrap();

    let snapshot = h.controller.current().await.unwrap();
    assert_eq!(snapshot.power, PowerState::On);
    assert_eq!(snapshot.current_index, 0);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.controller.current().await.unwrap().current_index, 0);
    assert_eq!(h.player.loads().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_playback_error_is_advisory_and_cleared_on_change() {
    let h = powered_on(3).await;
    h.player.emit(PlayerEvent::Playing);
    h.player.emit(PlayerEvent::Error);

    let snapshot = wait_until(&h.controller, |s| s.has_playback_error).await;
    assert_eq!(snapshot.power, PowerState::On);
    assert!(snapshot.is_playing);

    h.controller.dismiss_playback_error().await.unwrap();
    assert!(!h.controller.snapshot().has_playback_error);

    h.player.emit(PlayerEvent::Error);
    wait_until(&h.controller, |s| s.has_playback_error).await;
    h.controller.select_track(1).await.unwrap();
    let snapshot = wait_until(&h.controller, |s| s.power == PowerState::On).await;
    assert!(!snapshot.has_playback_error);
}

#[tokio::test(start_paused = true)]
async fn test_empty_playlist_makes_controls_noops() {
    let h = harness();

    h.controller.select_track(0).await.unwrap();
    h.controller.shuffle_random().await.unwrap();
    h.controller.toggle_play_pause().await.unwrap();
    assert_eq!(h.controller.open_externally().await.unwrap(), None);

    let snapshot = h.controller.current().await.unwrap();
    assert_eq!(snapshot.power, PowerState::Off);
    assert!(h.player.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_player_events_ignored_when_off() {
    let h = harness();

    h.player.emit(PlayerEvent::Playing);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!h.controller.current().await.unwrap().is_playing);
}

#[tokio::test(start_paused = true)]
async fn test_open_externally_returns_watch_url() {
    let h = powered_on(2).await;

    assert_eq!(
        h.controller.open_externally().await.unwrap().as_deref(),
        Some("https://www.youtube.com/watch?v=vid00")
    );
    assert_eq!(h.controller.current().await.unwrap().power, PowerState::On);
}

#[tokio::test(start_paused = true)]
async fn test_new_theme_replaces_playlist() {
    let h = powered_on(3).await;
    h.player.emit(PlayerEvent::Playing);
    wait_until(&h.controller, |s| s.is_playing).await;

    h.source.push(Ok(playlist("pop", 2)));
    h.controller.submit_theme("pop").await.unwrap();
    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.power, PowerState::Transitioning);
    assert!(!snapshot.is_playing);
    assert!(h.player.calls().contains(&Call::Pause));

    let snapshot = wait_until(&h.controller, |s| s.power == PowerState::On).await;
    assert_eq!(snapshot.playlist.theme(), "pop");
    assert_eq!(snapshot.playlist.len(), 2);
    assert_eq!(snapshot.current_index, 0);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_controller() {
    let h = harness();

    h.controller.shutdown().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(
        h.controller.submit_theme("grunge").await,
        Err(ControlError::ControllerStopped)
    );
    assert!(!h.controller.is_running());
}
