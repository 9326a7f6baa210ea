use mixplayer::PlayerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ControlError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    // Rejeté avant tout appel réseau
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("A playlist is already loading")]
    AlreadyLoading,
    #[error("Track index {index} is out of range (playlist has {len} tracks)")]
    InvalidIndex { index: usize, len: usize },
    #[error("Player error: {0}")]
    Player(#[from] PlayerError),
    #[error("Transition controller is stopped")]
    ControllerStopped,
}

impl ControlError {
    pub fn invalid_input(message: &str) -> Self {
        ControlError::InvalidInput(message.to_string())
    }
}
