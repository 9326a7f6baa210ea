//! Wire types of the generation API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One entry of a generated playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Song {
    pub title: String,
    pub artist: String,
    #[serde(rename = "videoId")]
    pub video_id: String,
    pub thumbnail: String,
}

/// Body of `POST /api/generate-playlist`
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    pub theme: String,
    /// Number of songs wanted (default 10, clamped to the configured maximum)
    #[serde(default)]
    pub count: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    pub playlist: Vec<Song>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiMessage {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
