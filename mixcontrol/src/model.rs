use std::fmt;

use mixplaylist::{Playlist, Track};

/// Power state of the simulated television.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PowerState {
    #[default]
    Off,
    /// Static on screen: a power-up or a channel change is in progress.
    Transitioning,
    On,
}

impl PowerState {
    pub fn is_on(&self) -> bool {
        matches!(self, PowerState::On)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PowerState::Off => "OFF",
            PowerState::Transitioning => "TRANSITIONING",
            PowerState::On => "ON",
        };
        f.write_str(label)
    }
}

/// Read-only view of the playback state, published after every handled
/// event.
///
/// `current_index` is meaningful only when the playlist is non-empty, and
/// `is_playing` only when `power` is `On`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub playlist: Playlist,
    pub current_index: usize,
    pub power: PowerState,
    pub is_playing: bool,
    pub has_playback_error: bool,
    pub is_loading: bool,
    pub last_error: Option<String>,
}

impl PlaybackSnapshot {
    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.get(self.current_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot_is_off_and_empty() {
        let snapshot = PlaybackSnapshot::default();
        assert_eq!(snapshot.power, PowerState::Off);
        assert!(snapshot.playlist.is_empty());
        assert!(snapshot.current_track().is_none());
        assert!(!snapshot.is_playing);
        assert!(snapshot.last_error.is_none());
    }

    #[test]
    fn test_current_track_follows_index() {
        let playlist = Playlist::new(
            "grunge",
            vec![
                Track::new("0", "Smells Like Teen Spirit", "Nirvana", "", "hTWKbfoikeg"),
                Track::new("1", "Black Hole Sun", "Soundgarden", "", "3mbBbFH9fAg"),
            ],
        );
        let snapshot = PlaybackSnapshot {
            playlist,
            current_index: 1,
            ..Default::default()
        };
        assert_eq!(snapshot.current_track().unwrap().artist(), "Soundgarden");
    }
}
