use std::time::Duration;

pub const DEFAULT_POWER_ON_MS: u64 = 1500;
pub const DEFAULT_CHANNEL_CHANGE_MS: u64 = 500;
pub const DEFAULT_PLAYLIST_COUNT: u32 = 10;

/// Tunables of the transition controller.
#[derive(Clone, Debug)]
pub struct ControllerOptions {
    /// Dwell between a successful generation and power on.
    pub power_on: Duration,
    /// Dwell of a manual selection or a shuffle.
    pub channel_change: Duration,
    /// Number of tracks asked for on each theme submission.
    pub playlist_count: u32,
    /// Seed for shuffle; `None` seeds from the OS.
    pub shuffle_seed: Option<u64>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            power_on: Duration::from_millis(DEFAULT_POWER_ON_MS),
            channel_change: Duration::from_millis(DEFAULT_CHANNEL_CHANGE_MS),
            playlist_count: DEFAULT_PLAYLIST_COUNT,
            shuffle_seed: None,
        }
    }
}

impl ControllerOptions {
    /// Reads the `transition` and `playlist` sections.
    #[cfg(feature = "mixconfig")]
    pub fn from_config(config: &mixconfig::Config) -> Self {
        let defaults = Self::default();
        Self {
            power_on: config
                .get_power_on_ms()
                .map(Duration::from_millis)
                .unwrap_or(defaults.power_on),
            channel_change: config
                .get_channel_change_ms()
                .map(Duration::from_millis)
                .unwrap_or(defaults.channel_change),
            playlist_count: config
                .get_playlist_count()
                .ok()
                .and_then(|count| u32::try_from(count).ok())
                .filter(|count| *count > 0)
                .unwrap_or(defaults.playlist_count),
            shuffle_seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }
}
