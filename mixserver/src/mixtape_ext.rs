//! Extension pour monter l'API de génération de Mixtape sur le serveur
//!
//! Ce module fournit le trait `MixtapeApiExt` qui branche les routes de
//! génération et publie la documentation OpenAPI.

use crate::Server;
use crate::api::{GenerateState, MixtapeApiDoc, create_router};
use crate::logs::LogsApiDoc;
use anyhow::Result;
use mixconfig::get_config;
use tracing::info;
use utoipa::OpenApi;

/// Nom du document OpenAPI: `/api-docs/openapi.json`
pub const OPENAPI_NAME: &str = "openapi";

/// Trait d'extension pour ajouter l'API de génération au serveur
pub trait MixtapeApiExt {
    /// Monte l'API avec l'état dérivé de la configuration globale
    ///
    /// # Routes enregistrées
    ///
    /// - `GET /api/` - Bannière de l'API
    /// - `POST /api/generate-playlist` - Génération d'une playlist thématique
    /// - `GET /api-docs/openapi.json` - Documentation OpenAPI
    async fn init_mixtape_api(&mut self) -> Result<()>;

    /// Monte l'API avec un état fourni
    async fn init_mixtape_api_with(&mut self, state: GenerateState) -> Result<()>;
}

impl MixtapeApiExt for Server {
    async fn init_mixtape_api(&mut self) -> Result<()> {
        let config = get_config();
        self.init_mixtape_api_with(GenerateState::from_config(&config))
            .await
    }

    async fn init_mixtape_api_with(&mut self, state: GenerateState) -> Result<()> {
        if state.has_search() {
            info!("🔎 Playlists generated from the YouTube search");
        } else {
            info!("📼 No YouTube API key, playlists come from the built-in catalogue");
        }

        self.add_router("/", create_router(state)).await;

        let mut openapi = MixtapeApiDoc::openapi();
        openapi.merge(LogsApiDoc::openapi());
        self.add_openapi(openapi, OPENAPI_NAME).await;

        Ok(())
    }
}
