use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    #[error("No content loaded")]
    NoContent,
    #[error("Media '{0}' cannot be loaded: {1}")]
    LoadFailed(String, String),
    #[error("Player needs a running tokio runtime")]
    NoRuntime,
    #[error("Player widget error: {0}")]
    Widget(String),
}

impl PlayerError {
    pub fn load_failed(media_ref: &str, reason: &str) -> Self {
        PlayerError::LoadFailed(media_ref.to_string(), reason.to_string())
    }
}
