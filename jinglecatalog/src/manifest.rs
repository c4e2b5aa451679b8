//! Source de la liste des morceaux par saison
//!
//! Le manifeste est un fichier JSON pré-construit :
//!
//! ```json
//! {"seasons": {"christmas": [{"url": "...", "title": "...", "season": "christmas"}]}}
//! ```
//!
//! Sa génération (scan d'un répertoire audio) est hors du périmètre de cette crate.

use crate::error::{CatalogError, Result};
use crate::models::{BareTrack, Season};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Contenu du manifeste
///
/// Les listes restent brutes : seule celle de la saison demandée est
/// décodée, de sorte qu'une entrée invalide dans une autre saison est sans effet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub seasons: Map<String, Value>,
}

impl Manifest {
    /// Morceaux d'une saison (liste vide si la saison est absente)
    ///
    /// Les entrées qui ne décrivent pas un morceau sont ignorées.
    pub fn tracks(&self, season: Season) -> Vec<BareTrack> {
        let entries = match self.seasons.get(season.as_str()) {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                warn!("Manifest entry for {} is not a list", season);
                return Vec::new();
            }
        };

        entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| match BareTrack::deserialize(entry) {
                Ok(track) => Some(track),
                Err(e) => {
                    warn!("Skipping manifest entry {} of {}: {}", i, season, e);
                    None
                }
            })
            .collect()
    }

    pub fn set_tracks(&mut self, season: Season, tracks: &[BareTrack]) {
        let entries = tracks
            .iter()
            .filter_map(|t| serde_json::to_value(t).ok())
            .collect();
        self.seasons.insert(season.to_string(), Value::Array(entries));
    }
}

/// Source en lecture seule interrogée par saison
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn tracks(&self, season: Season) -> Result<Vec<BareTrack>>;
}

/// Manifeste lu depuis un fichier JSON à chaque requête
///
/// Aucune mise en cache : un manifeste régénéré est visible immédiatement.
#[derive(Debug, Clone)]
pub struct FileManifest {
    path: PathBuf,
}

impl FileManifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Manifest> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            warn!("Cannot read manifest {}: {}", self.path.display(), e);
            CatalogError::ManifestUnavailable(format!("{}: {}", self.path.display(), e))
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Invalid manifest {}: {}", self.path.display(), e);
            CatalogError::ManifestUnavailable(format!("{}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl ManifestSource for FileManifest {
    async fn tracks(&self, season: Season) -> Result<Vec<BareTrack>> {
        let tracks = self.load().await?.tracks(season);
        debug!("Manifest lists {} tracks for {}", tracks.len(), season);
        Ok(tracks)
    }
}

/// Manifeste en mémoire
///
/// ```
/// use jinglecatalog::{BareTrack, ManifestSource, Season, StaticManifest};
///
/// let manifest = StaticManifest::default().with_season(
///     Season::Halloween,
///     vec![BareTrack {
///         url: "/audio/halloween/spooky-waltz.mp3".into(),
///         title: "Spooky Waltz".into(),
///         season: Season::Halloween,
///     }],
/// );
///
/// # tokio_test::block_on(async {
/// assert_eq!(manifest.tracks(Season::Halloween).await.unwrap().len(), 1);
/// assert!(manifest.tracks(Season::Christmas).await.unwrap().is_empty());
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticManifest {
    manifest: Manifest,
}

impl StaticManifest {
    pub fn new(manifest: Manifest) -> Self {
        Self { manifest }
    }

    pub fn with_season(mut self, season: Season, tracks: Vec<BareTrack>) -> Self {
        self.manifest.set_tracks(season, &tracks);
        self
    }
}

#[async_trait]
impl ManifestSource for StaticManifest {
    async fn tracks(&self, season: Season) -> Result<Vec<BareTrack>> {
        Ok(self.manifest.tracks(season))
    }
}
