//! # mixserver - Serveur HTTP de Mixtape basé sur Axum
//!
//! Cette crate fournit l'endpoint de génération de playlists consommé par
//! `mixplaylist::PlaylistClient`, ainsi que le système de logs de
//! l'application.
//!
//! ## Architecture
//!
//! - [`server`] : serveur principal et builder
//! - [`api`] : `POST /api/generate-playlist` et la bannière de l'API
//! - [`catalog`] : catalogue intégré de vidéos des années 90
//! - [`youtube`] : recherche via la YouTube Data API
//! - [`logs`] : buffer circulaire, niveau rechargeable, routes de logs
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use mixserver::{MixtapeApiExt, ServerBuilder, logs::init_logging_configured};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let log_state = init_logging_configured();
//!
//!     let mut server = ServerBuilder::new_configured().build();
//!     server.init_logging(log_state).await;
//!     server.init_mixtape_api().await?;
//!
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod logs;
pub mod mixtape_ext;
pub mod models;
pub mod server;
pub mod youtube;

pub use api::{GenerateState, MixtapeApiDoc};
pub use logs::{LogState, LoggingOptions, init_logging};
pub use mixtape_ext::MixtapeApiExt;
pub use models::{GenerateRequest, GenerateResponse, Song};
pub use server::{Server, ServerBuilder, ServerInfo};
pub use youtube::YoutubeSearch;
