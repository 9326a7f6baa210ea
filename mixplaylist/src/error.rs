//! Error types for playlist generation

/// Result type alias for playlist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when asking for a themed playlist
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Rejected before any request was made (empty or blank theme)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transport failure, non-2xx status or unusable response body
    #[error("Playlist generation failed: {0}")]
    GenerationFailed(String),
}

impl Error {
    pub fn generation_failed(reason: impl Into<String>) -> Self {
        Self::GenerationFailed(reason.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::GenerationFailed("request timeout".to_string())
        } else if err.is_decode() {
            Self::GenerationFailed(format!("invalid response body: {}", err))
        } else {
            Self::GenerationFailed(err.to_string())
        }
    }
}
