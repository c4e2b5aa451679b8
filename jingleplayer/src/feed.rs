//! Chargement des morceaux d'une saison depuis le serveur JingleBox
//!
//! [`TrackFeed`] interroge `/api/tracks` puis `/api/spotify/enrich`. Un échec
//! de l'enrichissement n'empêche pas la lecture : la liste brute est utilisée
//! et un avertissement `Enrichment failed: <raison>` l'accompagne.
//!
//! [`SeasonLoader`] garantit qu'un changement de saison invalide le
//! chargement précédent : un résultat arrivé trop tard est abandonné.

use jinglecatalog::{BareTrack, EnrichedTrack, Enrichment, Season, TrackRecord};
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{PlayerError, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Morceaux d'une saison prêts à être joués
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonTracks {
    pub season: Season,
    pub tracks: Vec<EnrichedTrack>,
    /// Problème à signaler sans interrompre la lecture
    pub error: Option<String>,
}

impl SeasonTracks {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Client HTTP des endpoints de morceaux
#[derive(Debug, Clone)]
pub struct TrackFeed {
    client: Client,
    base_url: String,
}

impl TrackFeed {
    /// Crée un client pour un serveur, par exemple `http://localhost:8080`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Morceaux bruts d'une saison
    pub async fn tracks(&self, season: Season) -> Result<Vec<BareTrack>> {
        let url = format!("{}/api/tracks", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("season", season.as_str())])
            .send()
            .await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        let reason = || {
            body.get("error")
                .and_then(Value::as_str)
                .unwrap_or("Failed to load tracks")
                .to_string()
        };

        if !status.is_success() {
            return Err(PlayerError::Feed(reason()));
        }
        match body.get("tracks") {
            Some(tracks @ Value::Array(_)) => serde_json::from_value(tracks.clone())
                .map_err(|e| PlayerError::Feed(format!("Invalid track list: {}", e))),
            _ => Err(PlayerError::Feed(reason())),
        }
    }

    /// Enrichit une liste de morceaux, dans le même ordre
    pub async fn enrich(&self, tracks: &[BareTrack]) -> Result<Vec<EnrichedTrack>> {
        let url = format!("{}/api/spotify/enrich", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "tracks": tracks }))
            .send()
            .await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let reason = body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| status.as_u16().to_string());
            return Err(PlayerError::Feed(reason));
        }

        match body.get("tracks") {
            Some(enriched @ Value::Array(_)) => serde_json::from_value(enriched.clone())
                .map_err(|e| PlayerError::Feed(format!("invalid body: {}", e))),
            _ => Err(PlayerError::Feed("invalid body".to_string())),
        }
    }

    /// Charge et enrichit les morceaux d'une saison
    ///
    /// Ne retourne jamais d'erreur : une liste vide ou brute est renvoyée,
    /// accompagnée du message à afficher.
    pub async fn load_season(&self, season: Season) -> SeasonTracks {
        let bare = match self.tracks(season).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!(season = %season, "Cannot load tracks: {}", e);
                return SeasonTracks {
                    season,
                    tracks: Vec::new(),
                    error: Some(e.to_string()),
                };
            }
        };

        if bare.is_empty() {
            return SeasonTracks {
                season,
                tracks: Vec::new(),
                error: None,
            };
        }

        match self.enrich(&bare).await {
            Ok(tracks) => {
                info!(season = %season, count = tracks.len(), "Season tracks loaded");
                SeasonTracks {
                    season,
                    tracks,
                    error: None,
                }
            }
            Err(e) => {
                warn!(season = %season, "Enrichment failed, using bare tracks: {}", e);
                SeasonTracks {
                    season,
                    tracks: bare.into_iter().map(unenriched).collect(),
                    error: Some(format!("Enrichment failed: {}", e)),
                }
            }
        }
    }
}

fn unenriched(track: BareTrack) -> EnrichedTrack {
    EnrichedTrack::new(TrackRecord::from(track), Enrichment::NoMatch)
}

/// Jeton d'un chargement en cours
#[derive(Debug, Clone)]
pub struct LoadTicket {
    pub season: Season,
    pub generation: u64,
    token: CancellationToken,
}

impl LoadTicket {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Chargeur de saison : seul le dernier chargement demandé aboutit
pub struct SeasonLoader {
    feed: TrackFeed,
    current: Mutex<LoadTicket>,
}

impl SeasonLoader {
    pub fn new(feed: TrackFeed) -> Self {
        Self {
            feed,
            current: Mutex::new(LoadTicket {
                season: Season::default(),
                generation: 0,
                token: CancellationToken::new(),
            }),
        }
    }

    pub fn feed(&self) -> &TrackFeed {
        &self.feed
    }

    fn lock(&self) -> MutexGuard<'_, LoadTicket> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Invalide le chargement en cours et en ouvre un nouveau
    pub fn begin(&self, season: Season) -> LoadTicket {
        let mut current = self.lock();
        current.token.cancel();
        let ticket = LoadTicket {
            season,
            generation: current.generation + 1,
            token: CancellationToken::new(),
        };
        *current = ticket.clone();
        ticket
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        !ticket.is_cancelled() && self.lock().generation == ticket.generation
    }

    /// Abandonne le chargement en cours sans en ouvrir d'autre
    pub fn cancel(&self) {
        self.lock().token.cancel();
    }

    /// Charge une saison
    ///
    /// # Errors
    ///
    /// [`PlayerError::Cancelled`] si une autre saison a été demandée entre-temps.
    pub async fn load(&self, season: Season) -> Result<SeasonTracks> {
        let ticket = self.begin(season);
        debug!(season = %season, generation = ticket.generation, "Season load started");

        let loaded = tokio::select! {
            biased;
            _ = ticket.token.cancelled() => None,
            tracks = self.feed.load_season(season) => Some(tracks),
        };

        match loaded {
            Some(tracks) if self.is_current(&ticket) => Ok(tracks),
            _ => {
                debug!(season = %season, generation = ticket.generation, "Stale season load dropped");
                Err(PlayerError::Cancelled)
            }
        }
    }
}
