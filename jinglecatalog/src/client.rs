//! Client haut niveau : cache de jeton, recherche et enrichissement assemblés

use crate::api::{
    CatalogApi,
    auth::{TokenCache, TokenCacheConfig},
    http_client,
};
use crate::config_ext::CatalogConfigExt;
use crate::enrich::Enricher;
use crate::error::Result;
use crate::models::{EnrichedTrack, TrackRecord};
use jingleconfig::{Config, get_config};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Client du catalogue
///
/// Un seul client (et donc un seul jeton) est partagé par toutes les
/// requêtes du processus.
#[derive(Clone)]
pub struct CatalogClient {
    enricher: Enricher,
}

impl CatalogClient {
    /// Crée un client avec des credentials explicites
    pub fn new(
        tokens: TokenCacheConfig,
        search_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = http_client(timeout)?;
        let cache = Arc::new(TokenCache::new(http.clone(), tokens));
        let api = CatalogApi::new(http, search_url);
        Ok(Self {
            enricher: Enricher::new(cache, api),
        })
    }

    /// Crée un client depuis la configuration globale
    pub fn from_config() -> Result<Self> {
        Self::from_config_obj(&get_config())
    }

    /// Crée un client depuis une configuration donnée (clés `catalog.*`)
    pub fn from_config_obj(config: &Config) -> Result<Self> {
        let (client_id, client_secret) = config.get_catalog_credentials()?;
        if client_id.is_empty() {
            info!("Catalog client_id not configured, enrichment will be rejected");
        }

        let tokens = TokenCacheConfig {
            token_url: config.get_catalog_token_url(),
            client_id,
            client_secret,
            safety_margin: chrono::Duration::from_std(config.get_catalog_token_margin())
                .unwrap_or_else(|_| chrono::Duration::seconds(10)),
            default_ttl: chrono::Duration::from_std(config.get_catalog_default_token_ttl())
                .unwrap_or_else(|_| chrono::Duration::seconds(3600)),
        };

        Self::new(
            tokens,
            config.get_catalog_search_url(),
            config.get_catalog_request_timeout(),
        )
    }

    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        self.enricher.tokens()
    }

    /// Voir [`Enricher::enrich`]
    pub async fn enrich(&self, tracks: Vec<TrackRecord>) -> Result<Vec<EnrichedTrack>> {
        self.enricher.enrich(tracks).await
    }

    /// Voir [`Enricher::enrich_json`]
    pub async fn enrich_json(&self, body: &[u8]) -> Result<Vec<EnrichedTrack>> {
        self.enricher.enrich_json(body).await
    }
}
