//! Réponses de l'endpoint de recherche du catalogue
//!
//! L'endpoint renvoie normalement `{"tracks": {"items": [...]}}`, mais certains
//! proxys et jeux de test renvoient directement `{"items": [...]}`. La forme
//! est décidée une seule fois, à la frontière, par [`SearchResponse::from_value`].

use crate::models::CatalogMetadata;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Échec d'une recherche pour un morceau
///
/// Le texte affiché est l'étiquette `_error` du morceau.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchFailure {
    #[error("search {0}")]
    Status(u16),
    #[error("search unreachable")]
    Unreachable,
    #[error("search invalid body")]
    InvalidBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogArtist {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogImage {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogAlbum {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<CatalogImage>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

/// Morceau trouvé dans le catalogue
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub artists: Option<Vec<CatalogArtist>>,
    #[serde(default)]
    pub album: Option<CatalogAlbum>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub popularity: Option<u32>,
}

impl CatalogItem {
    /// Projette le résultat sur les champs exposés d'un morceau enrichi
    ///
    /// Sans nom d'artiste exploitable, `artist_hint` est conservé.
    pub fn into_metadata(self, artist_hint: Option<&str>) -> CatalogMetadata {
        let joined = self
            .artists
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| a.name.filter(|n| !n.is_empty()))
            .collect::<Vec<_>>()
            .join(", ");
        let artist = if joined.is_empty() {
            artist_hint.unwrap_or_default().to_string()
        } else {
            joined
        };

        let album = self.album.unwrap_or_default();

        CatalogMetadata {
            artist,
            album: album.name.unwrap_or_default(),
            image: album
                .images
                .into_iter()
                .next()
                .and_then(|i| i.url)
                .unwrap_or_default(),
            preview_url: self.preview_url.unwrap_or_default(),
            spotify_url: self
                .external_urls
                .and_then(|u| u.spotify)
                .unwrap_or_default(),
            duration_ms: self.duration_ms.unwrap_or(0),
            popularity: self.popularity,
            release_date: album.release_date.unwrap_or_default(),
            spotify_track_id: self.id.unwrap_or_default(),
        }
    }
}

/// Forme d'une réponse de recherche
#[derive(Debug, Clone)]
pub enum SearchResponse {
    /// `{"tracks": {"items": [...]}}` avec au moins un élément
    Nested(Vec<CatalogItem>),
    /// `{"items": [...]}` avec au moins un élément
    Flat(Vec<CatalogItem>),
    /// Aucune liste exploitable
    Unrecognized,
}

impl SearchResponse {
    /// La forme imbriquée est préférée ; une liste vide ou illisible
    /// laisse sa chance à la forme plate.
    pub fn from_value(value: &Value) -> Self {
        let nested = decode_items(value.get("tracks").and_then(|t| t.get("items")));
        if !nested.is_empty() {
            return SearchResponse::Nested(nested);
        }

        let flat = decode_items(value.get("items"));
        if !flat.is_empty() {
            return SearchResponse::Flat(flat);
        }

        SearchResponse::Unrecognized
    }

    pub fn first_item(self) -> Option<CatalogItem> {
        match self {
            SearchResponse::Nested(items) | SearchResponse::Flat(items) => {
                items.into_iter().next()
            }
            SearchResponse::Unrecognized => None,
        }
    }
}

fn decode_items(value: Option<&Value>) -> Vec<CatalogItem> {
    match value {
        Some(list @ Value::Array(_)) => {
            serde_json::from_value(list.clone()).unwrap_or_default()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str) -> Value {
        json!({
            "id": id,
            "artists": [{"name": "Bing Crosby"}, {"name": "Ken Darby Singers"}],
            "album": {
                "name": "Merry Christmas",
                "images": [{"url": "https://i.scdn.co/image/large"}, {"url": "https://i.scdn.co/image/small"}],
                "release_date": "1945"
            },
            "preview_url": "https://p.scdn.co/mp3-preview/x",
            "external_urls": {"spotify": "https://open.spotify.com/track/x"},
            "duration_ms": 183000,
            "popularity": 71
        })
    }

    #[test]
    fn test_nested_shape_preferred() {
        let value = json!({"tracks": {"items": [item("nested")]}, "items": [item("flat")]});
        let response = SearchResponse::from_value(&value);
        assert!(matches!(response, SearchResponse::Nested(_)));
        assert_eq!(response.first_item().unwrap().id.as_deref(), Some("nested"));
    }

    #[test]
    fn test_empty_nested_falls_back_to_flat() {
        let value = json!({"tracks": {"items": []}, "items": [item("flat")]});
        let response = SearchResponse::from_value(&value);
        assert!(matches!(response, SearchResponse::Flat(_)));
        assert_eq!(response.first_item().unwrap().id.as_deref(), Some("flat"));
    }

    #[test]
    fn test_unrecognized_shapes() {
        for value in [
            json!({}),
            json!({"tracks": {"items": []}}),
            json!({"items": "nope"}),
            json!({"items": [null]}),
            json!([]),
        ] {
            assert!(SearchResponse::from_value(&value).first_item().is_none());
        }
    }

    #[test]
    fn test_item_mapping() {
        let item: CatalogItem = serde_json::from_value(item("abc")).unwrap();
        let meta = item.into_metadata(Some("hint"));

        assert_eq!(meta.artist, "Bing Crosby, Ken Darby Singers");
        assert_eq!(meta.album, "Merry Christmas");
        assert_eq!(meta.image, "https://i.scdn.co/image/large");
        assert_eq!(meta.spotify_url, "https://open.spotify.com/track/x");
        assert_eq!(meta.duration_ms, 183000);
        assert_eq!(meta.popularity, Some(71));
        assert_eq!(meta.release_date, "1945");
        assert_eq!(meta.spotify_track_id, "abc");
    }

    #[test]
    fn test_sparse_item_uses_artist_hint() {
        let item: CatalogItem =
            serde_json::from_value(json!({"id": "x", "artists": [{"name": null}]})).unwrap();
        let meta = item.into_metadata(Some("Mariah Carey"));

        assert_eq!(meta.artist, "Mariah Carey");
        assert_eq!(meta.album, "");
        assert_eq!(meta.duration_ms, 0);
        assert_eq!(meta.popularity, None);
    }

    #[test]
    fn test_failure_tags() {
        assert_eq!(SearchFailure::Status(429).to_string(), "search 429");
        assert_eq!(SearchFailure::Unreachable.to_string(), "search unreachable");
    }
}
