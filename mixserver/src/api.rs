//! Playlist generation API
//!
//! - `GET /api/` : API banner
//! - `POST /api/generate-playlist` : themed playlist, from the YouTube search
//!   when an API key is configured, from the built-in catalogue otherwise

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use mixconfig::Config;
use tracing::{info, warn};
use utoipa::OpenApi;

use crate::catalog::shuffled_sample;
use crate::models::{ApiMessage, ErrorResponse, GenerateRequest, GenerateResponse, Song};
use crate::youtube::YoutubeSearch;

pub const API_BANNER: &str = "Mixtape Generator API";
pub const DEFAULT_COUNT: usize = 10;
pub const DEFAULT_MAX_COUNT: usize = 15;

pub const MESSAGE_SEARCH_OK: &str = "Successfully generated playlist";
pub const MESSAGE_NO_KEY: &str = "Using sample 90s playlist (YouTube API key not configured)";

/// État partagé des handlers de génération
#[derive(Clone)]
pub struct GenerateState {
    search: Option<Arc<YoutubeSearch>>,
    default_count: usize,
    max_count: usize,
}

impl GenerateState {
    pub fn new(search: Option<YoutubeSearch>) -> Self {
        Self {
            search: search.map(Arc::new),
            default_count: DEFAULT_COUNT,
            max_count: DEFAULT_MAX_COUNT,
        }
    }

    /// Catalogue seul, sans recherche
    pub fn offline() -> Self {
        Self::new(None)
    }

    pub fn from_config(config: &Config) -> Self {
        let mut state = Self::new(YoutubeSearch::from_config(config));
        if let Ok(count) = config.get_playlist_count() {
            state.default_count = count.max(1);
        }
        if let Ok(max) = config.get_playlist_max_count() {
            state.max_count = max.max(1);
        }
        state
    }

    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count.max(1);
        self
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }

    fn effective_count(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_count)
            .clamp(1, self.max_count)
    }
}

fn sample(count: usize) -> Vec<Song> {
    shuffled_sample(count, &mut rand::rng())
}

/// Handler pour GET /api/
#[utoipa::path(
    get,
    path = "/api/",
    responses(
        (status = 200, description = "API banner", body = ApiMessage)
    ),
    tag = "mixtape"
)]
pub async fn api_root() -> Json<ApiMessage> {
    Json(ApiMessage {
        message: API_BANNER.to_string(),
    })
}

/// Handler pour POST /api/generate-playlist
#[utoipa::path(
    post,
    path = "/api/generate-playlist",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Playlist generated", body = GenerateResponse),
        (status = 400, description = "Blank theme", body = ErrorResponse)
    ),
    tag = "mixtape"
)]
pub async fn generate_playlist(
    State(state): State<GenerateState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let theme = request.theme.trim();
    if theme.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "theme must not be empty".to_string(),
            }),
        )
            .into_response();
    }
    let count = state.effective_count(request.count);

    let (playlist, message) = match &state.search {
        None => (sample(count), MESSAGE_NO_KEY.to_string()),
        Some(search) => match search.search(theme, count).await {
            Ok(songs) => (songs, MESSAGE_SEARCH_OK.to_string()),
            Err(e) => {
                warn!("❌ YouTube search failed: {}", e);
                (
                    sample(count),
                    format!("Using sample 90s playlist (API error: {})", e),
                )
            }
        },
    };

    info!(
        "🎞️ Generated {} songs for theme '{}'",
        playlist.len(),
        theme
    );
    Json(GenerateResponse { playlist, message }).into_response()
}

/// Crée le router de l'API de génération
pub fn create_router(state: GenerateState) -> Router {
    Router::new()
        .route("/", get(api_root))
        .route("/api", get(api_root))
        .route("/api/", get(api_root))
        .route("/api/generate-playlist", post(generate_playlist))
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(api_root, generate_playlist),
    components(schemas(Song, GenerateRequest, GenerateResponse, ApiMessage, ErrorResponse)),
    tags(
        (name = "mixtape", description = "Themed playlist generation")
    )
)]
pub struct MixtapeApiDoc;
