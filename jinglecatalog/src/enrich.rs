//! Enrichissement d'un lot de morceaux avec les métadonnées du catalogue
//!
//! Les morceaux sont traités un par un, jamais en parallèle, pour rester sous
//! les limites de débit du catalogue : la latence d'un lot est proportionnelle
//! à sa taille. Un échec sur un morceau n'interrompt pas le lot.

use crate::api::{CatalogApi, auth::TokenCache, build_query};
use crate::error::{CatalogError, Result};
use crate::models::{EnrichedTrack, Enrichment, EnrichmentStatus, TrackRecord};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Service d'enrichissement
#[derive(Clone)]
pub struct Enricher {
    tokens: Arc<TokenCache>,
    api: CatalogApi,
}

/// Décompte des résultats d'un lot, pour les logs
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub matched: usize,
    pub no_match: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn of(tracks: &[EnrichedTrack]) -> Self {
        let mut summary = Self::default();
        for track in tracks {
            match track.status() {
                EnrichmentStatus::Matched => summary.matched += 1,
                EnrichmentStatus::NoMatch => summary.no_match += 1,
                EnrichmentStatus::Skipped => summary.skipped += 1,
                EnrichmentStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }
}

impl Enricher {
    pub fn new(tokens: Arc<TokenCache>, api: CatalogApi) -> Self {
        Self { tokens, api }
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// Enrichit `tracks`, dans l'ordre et avec la même longueur
    ///
    /// Un lot vide est renvoyé sans demander de jeton.
    ///
    /// # Errors
    ///
    /// Échoue uniquement si aucun jeton ne peut être obtenu.
    pub async fn enrich(&self, tracks: Vec<TrackRecord>) -> Result<Vec<EnrichedTrack>> {
        if tracks.is_empty() {
            return Ok(Vec::new());
        }

        let token = self.tokens.get_token().await?;
        let mut enriched = Vec::with_capacity(tracks.len());

        for record in tracks {
            let enrichment = self.enrich_one(&token, &record).await;
            enriched.push(EnrichedTrack::new(record, enrichment));
        }

        let summary = BatchSummary::of(&enriched);
        info!(
            matched = summary.matched,
            no_match = summary.no_match,
            skipped = summary.skipped,
            failed = summary.failed,
            "Enriched batch of {} tracks",
            enriched.len()
        );

        Ok(enriched)
    }

    async fn enrich_one(&self, token: &str, record: &TrackRecord) -> Enrichment {
        if !record.has_title() {
            return Enrichment::Skipped;
        }

        let query = build_query(record.title(), record.artist_hint());
        match self.api.search_track(token, &query).await {
            Ok(Some(item)) => Enrichment::Matched(item.into_metadata(record.artist_hint())),
            Ok(None) => {
                debug!("No catalog match for {:?}", record.title());
                Enrichment::NoMatch
            }
            Err(failure) => Enrichment::Failed(failure.to_string()),
        }
    }

    /// Enrichit le corps JSON `{"tracks": [...]}` d'une requête
    ///
    /// Un champ `tracks` absent ou qui n'est pas une liste donne un lot vide.
    ///
    /// # Errors
    ///
    /// * `CatalogError::BadRequest` - le corps n'est pas du JSON
    pub async fn enrich_json(&self, body: &[u8]) -> Result<Vec<EnrichedTrack>> {
        self.enrich(parse_batch(body)?).await
    }
}

/// Extrait le lot de morceaux d'un corps de requête
pub fn parse_batch(body: &[u8]) -> Result<Vec<TrackRecord>> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| CatalogError::BadRequest(e.to_string()))?;

    let Some(Value::Array(items)) = value.get("tracks") else {
        return Ok(Vec::new());
    };

    // Un élément qui n'est pas un objet devient un morceau sans titre
    Ok(items
        .iter()
        .map(|item| serde_json::from_value(item.clone()).unwrap_or_default())
        .collect())
}
