//! Modèles de données : saisons, morceaux bruts et morceaux enrichis
//!
//! Un [`EnrichedTrack`] a une forme JSON plate : les champs du morceau
//! d'origine sont conservés tels quels et les métadonnées du catalogue y
//! sont ajoutées. Sans correspondance, le morceau porte `"spotify": null`
//! (et `"_error"` si la recherche a échoué).

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Champs écrits par l'enrichissement, jamais recopiés depuis l'entrée
const ENRICHMENT_KEYS: [&str; 2] = ["spotify", "_error"];

/// Champs de métadonnées produits par une correspondance dans le catalogue
const METADATA_KEYS: [&str; 8] = [
    "album",
    "image",
    "preview_url",
    "spotify_url",
    "duration_ms",
    "popularity",
    "release_date",
    "spotify_track_id",
];

/// Variante saisonnière du contenu (thème et liste de morceaux)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Season {
    #[default]
    Christmas,
    Halloween,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown season '{0}'")]
pub struct UnknownSeason(pub String);

impl Season {
    pub const ALL: [Season; 2] = [Season::Christmas, Season::Halloween];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Christmas => "christmas",
            Season::Halloween => "halloween",
        }
    }

    /// Saison demandée par un client, la saison par défaut sinon
    ///
    /// ```
    /// use jinglecatalog::Season;
    ///
    /// assert_eq!(Season::from_query(Some("HALLOWEEN")), Season::Halloween);
    /// assert_eq!(Season::from_query(Some("easter")), Season::Christmas);
    /// assert_eq!(Season::from_query(None), Season::Christmas);
    /// ```
    pub fn from_query(raw: Option<&str>) -> Season {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for Season {
    type Err = UnknownSeason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "christmas" => Ok(Season::Christmas),
            "halloween" => Ok(Season::Halloween),
            _ => Err(UnknownSeason(s.to_string())),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Morceau tel que listé par le manifeste
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct BareTrack {
    /// URL de lecture, unique dans la liste d'une saison
    pub url: String,
    pub title: String,
    pub season: Season,
}

/// Morceau soumis à l'enrichissement
///
/// L'objet JSON reçu est conservé tel quel. Seuls `title` et `artist` sont
/// lus, comme indices de recherche, lorsqu'ils sont des chaînes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackRecord {
    pub fields: Map<String, Value>,
}

impl TrackRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self::default().with_field("title", title.into())
    }

    pub fn with_artist(self, artist: impl Into<String>) -> Self {
        self.with_field("artist", artist.into())
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Titre, vide s'il est absent ou n'est pas une chaîne
    pub fn title(&self) -> &str {
        self.text("title").unwrap_or_default()
    }

    pub fn url(&self) -> Option<&str> {
        self.text("url")
    }

    pub fn artist(&self) -> Option<&str> {
        self.text("artist")
    }

    /// Indice d'artiste exploitable (non vide après trim)
    pub fn artist_hint(&self) -> Option<&str> {
        self.artist().map(str::trim).filter(|a| !a.is_empty())
    }

    pub fn has_title(&self) -> bool {
        !self.title().trim().is_empty()
    }
}

impl From<BareTrack> for TrackRecord {
    fn from(track: BareTrack) -> Self {
        Self::new(track.title)
            .with_field("url", track.url)
            .with_field("season", track.season.as_str())
    }
}

/// Métadonnées issues du catalogue pour une correspondance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogMetadata {
    /// Artistes joints par ", "
    pub artist: String,
    pub album: String,
    pub image: String,
    pub preview_url: String,
    pub spotify_url: String,
    pub duration_ms: u64,
    pub popularity: Option<u32>,
    pub release_date: String,
    pub spotify_track_id: String,
}

/// Résultat de l'enrichissement d'un morceau
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment {
    Matched(CatalogMetadata),
    /// Le catalogue a répondu sans résultat
    NoMatch,
    /// Titre vide : aucune recherche effectuée
    Skipped,
    /// Échec de la recherche, avec l'étiquette renvoyée dans `_error`
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrichmentStatus {
    Matched,
    NoMatch,
    Skipped,
    Failed,
}

/// Morceau d'origine accompagné du résultat de l'enrichissement
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTrack {
    pub record: TrackRecord,
    pub enrichment: Enrichment,
}

impl EnrichedTrack {
    pub fn new(record: TrackRecord, enrichment: Enrichment) -> Self {
        Self { record, enrichment }
    }

    pub fn status(&self) -> EnrichmentStatus {
        match self.enrichment {
            Enrichment::Matched(_) => EnrichmentStatus::Matched,
            Enrichment::NoMatch => EnrichmentStatus::NoMatch,
            Enrichment::Skipped => EnrichmentStatus::Skipped,
            Enrichment::Failed(_) => EnrichmentStatus::Failed,
        }
    }

    pub fn metadata(&self) -> Option<&CatalogMetadata> {
        match &self.enrichment {
            Enrichment::Matched(meta) => Some(meta),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.enrichment {
            Enrichment::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn title(&self) -> &str {
        self.record.title()
    }

    pub fn url(&self) -> Option<&str> {
        self.record.url()
    }

    /// Artiste du catalogue, sinon l'artiste d'origine
    pub fn artist(&self) -> Option<&str> {
        match self.metadata() {
            Some(meta) if !meta.artist.is_empty() => Some(&meta.artist),
            _ => self.record.artist(),
        }
    }
}

impl Serialize for EnrichedTrack {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let matched = self.metadata();
        let mut map = serializer.serialize_map(None)?;

        for (key, value) in &self.record.fields {
            let key_str = key.as_str();
            if ENRICHMENT_KEYS.contains(&key_str)
                || (matched.is_some() && (key_str == "artist" || METADATA_KEYS.contains(&key_str)))
            {
                continue;
            }
            map.serialize_entry(key, value)?;
        }

        match &self.enrichment {
            Enrichment::Matched(meta) => {
                map.serialize_entry("artist", &meta.artist)?;
                map.serialize_entry("album", &meta.album)?;
                map.serialize_entry("image", &meta.image)?;
                map.serialize_entry("preview_url", &meta.preview_url)?;
                map.serialize_entry("spotify_url", &meta.spotify_url)?;
                map.serialize_entry("duration_ms", &meta.duration_ms)?;
                map.serialize_entry("popularity", &meta.popularity)?;
                map.serialize_entry("release_date", &meta.release_date)?;
                map.serialize_entry("spotify_track_id", &meta.spotify_track_id)?;
            }
            other => {
                map.serialize_entry("spotify", &Value::Null)?;
                if let Enrichment::Failed(reason) = other {
                    map.serialize_entry("_error", reason)?;
                }
            }
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for EnrichedTrack {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        fields.remove("spotify");
        let error = match fields.remove("_error") {
            Some(Value::String(reason)) => Some(reason),
            _ => None,
        };
        let mut record = TrackRecord { fields };

        if let Some(reason) = error {
            return Ok(EnrichedTrack::new(record, Enrichment::Failed(reason)));
        }

        let has_id = matches!(
            record.fields.get("spotify_track_id"),
            Some(Value::String(id)) if !id.is_empty()
        );

        let enrichment = if has_id {
            let mut meta_fields = Map::new();
            for key in METADATA_KEYS {
                if let Some(value) = record.fields.remove(key) {
                    meta_fields.insert(key.to_string(), value);
                }
            }
            let mut meta: CatalogMetadata =
                serde_json::from_value(Value::Object(meta_fields)).map_err(de::Error::custom)?;
            meta.artist = record.artist().unwrap_or_default().to_string();
            Enrichment::Matched(meta)
        } else if record.has_title() {
            Enrichment::NoMatch
        } else {
            Enrichment::Skipped
        };

        Ok(EnrichedTrack::new(record, enrichment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_season_parsing() {
        assert_eq!(" Halloween ".parse::<Season>(), Ok(Season::Halloween));
        assert_eq!(
            "easter".parse::<Season>(),
            Err(UnknownSeason("easter".into()))
        );
        assert_eq!(Season::from_query(Some("easter")), Season::Christmas);
        assert_eq!(serde_json::to_value(Season::Halloween).unwrap(), "halloween");
    }

    #[test]
    fn test_record_keeps_extra_fields() {
        let record: TrackRecord = serde_json::from_value(json!({
            "title": "Silent Night",
            "url": "/audio/christmas/silent-night.mp3",
            "season": "christmas",
            "mood": "calm"
        }))
        .unwrap();

        assert_eq!(record.title(), "Silent Night");
        assert_eq!(record.url(), Some("/audio/christmas/silent-night.mp3"));
        assert_eq!(record.fields.get("mood"), Some(&json!("calm")));
        assert!(record.artist_hint().is_none());
    }

    #[test]
    fn test_null_title_is_blank() {
        let record: TrackRecord =
            serde_json::from_value(json!({"title": null, "artist": 3})).unwrap();
        assert!(!record.has_title());
        assert!(record.artist_hint().is_none());
    }

    #[test]
    fn test_unmatched_record_passes_through_untouched() {
        let batch = json!([
            {"title": null, "url": null, "season": 7, "id": 1},
            {"url": "/a.mp3", "artist": 5}
        ]);
        let records: Vec<TrackRecord> = serde_json::from_value(batch).unwrap();

        let skipped: Vec<EnrichedTrack> = records
            .into_iter()
            .map(|r| EnrichedTrack::new(r, Enrichment::Skipped))
            .collect();
        assert_eq!(
            serde_json::to_value(&skipped).unwrap(),
            json!([
                {"title": null, "url": null, "season": 7, "id": 1, "spotify": null},
                {"url": "/a.mp3", "artist": 5, "spotify": null}
            ])
        );
    }

    #[test]
    fn test_no_match_wire_form() {
        let track = EnrichedTrack::new(TrackRecord::new("Silent Night"), Enrichment::NoMatch);
        assert_eq!(
            serde_json::to_value(&track).unwrap(),
            json!({"title": "Silent Night", "spotify": null})
        );
    }

    #[test]
    fn test_failed_wire_form() {
        let track = EnrichedTrack::new(
            TrackRecord::new("Spooky Waltz"),
            Enrichment::Failed("search 429".into()),
        );
        let value = serde_json::to_value(&track).unwrap();
        assert_eq!(
            value,
            json!({"title": "Spooky Waltz", "spotify": null, "_error": "search 429"})
        );

        let back: EnrichedTrack = serde_json::from_value(value).unwrap();
        assert_eq!(back.status(), EnrichmentStatus::Failed);
        assert_eq!(back.error(), Some("search 429"));
    }

    #[test]
    fn test_matched_overrides_stale_fields() {
        let mut record = TrackRecord::new("Jingle Bells").with_artist("hint");
        record.fields.insert("album".into(), json!("old"));
        record.fields.insert("_error".into(), json!("search 500"));
        record.fields.insert("mood".into(), json!("happy"));

        let track = EnrichedTrack::new(
            record,
            Enrichment::Matched(CatalogMetadata {
                artist: "Bobby Helms".into(),
                album: "Jingle Bell Rock".into(),
                duration_ms: 130_000,
                spotify_track_id: "abc123".into(),
                ..Default::default()
            }),
        );

        let value = serde_json::to_value(&track).unwrap();
        assert_eq!(value["album"], "Jingle Bell Rock");
        assert_eq!(value["artist"], "Bobby Helms");
        assert_eq!(value["mood"], "happy");
        assert_eq!(value["popularity"], Value::Null);
        assert!(value.get("_error").is_none());
        assert!(value.get("spotify").is_none());

        let back: EnrichedTrack = serde_json::from_value(value).unwrap();
        assert_eq!(back.status(), EnrichmentStatus::Matched);
        assert_eq!(back.artist(), Some("Bobby Helms"));
        assert_eq!(back.metadata().unwrap().duration_ms, 130_000);
        assert_eq!(back.record.fields.get("mood"), Some(&json!("happy")));
    }

    #[test]
    fn test_blank_title_reads_back_as_skipped() {
        let back: EnrichedTrack =
            serde_json::from_value(json!({"title": "  ", "spotify": null})).unwrap();
        assert_eq!(back.status(), EnrichmentStatus::Skipped);
    }
}
