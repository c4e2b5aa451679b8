//! Couche d'accès au catalogue musical
//!
//! - [`auth`] : obtention et mise en cache du jeton d'accès
//! - [`search`] : décodage des réponses de recherche

pub mod auth;
pub mod search;

use crate::error::Result;
use reqwest::Client;
use search::{CatalogItem, SearchFailure, SearchResponse};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// URL par défaut de l'endpoint de recherche
pub const DEFAULT_SEARCH_URL: &str = "https://api.spotify.com/v1/search";

/// Construit le client HTTP partagé par l'authentification et la recherche
pub fn http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("jinglebox/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Requête de recherche : titre, puis filtre ` artist:` si un artiste est connu
///
/// ```
/// use jinglecatalog::api::build_query;
///
/// assert_eq!(build_query(" Silent Night ", None), "Silent Night");
/// assert_eq!(build_query("White Christmas", Some(" Bing Crosby ")), "White Christmas artist:Bing Crosby");
/// ```
pub fn build_query(title: &str, artist: Option<&str>) -> String {
    let mut query = title.trim().to_string();
    if let Some(artist) = artist.map(str::trim).filter(|a| !a.is_empty()) {
        query.push_str(" artist:");
        query.push_str(artist);
    }
    query
}

/// Client bas-niveau de l'endpoint de recherche
#[derive(Clone)]
pub struct CatalogApi {
    client: Client,
    search_url: String,
}

impl CatalogApi {
    pub fn new(client: Client, search_url: impl Into<String>) -> Self {
        Self {
            client,
            search_url: search_url.into(),
        }
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    /// Recherche le premier morceau correspondant à `query`
    ///
    /// Retourne `Ok(None)` si le catalogue ne connaît aucun morceau
    /// correspondant. Les échecs sont décrits par [`SearchFailure`] et ne
    /// concernent que ce morceau.
    pub async fn search_track(
        &self,
        token: &str,
        query: &str,
    ) -> std::result::Result<Option<CatalogItem>, SearchFailure> {
        debug!("GET {} q={:?}", self.search_url, query);

        let response = self
            .client
            .get(&self.search_url)
            .bearer_auth(token)
            .query(&[
                ("q", query),
                ("type", "track"),
                ("limit", "1"),
                ("include_external", "audio"),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!("Catalog search unreachable: {}", e);
                SearchFailure::Unreachable
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Catalog search for {:?} failed with {}", query, status);
            return Err(SearchFailure::Status(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(|e| {
            warn!("Catalog search returned an invalid body: {}", e);
            SearchFailure::InvalidBody
        })?;

        Ok(SearchResponse::from_value(&body).first_item())
    }
}
