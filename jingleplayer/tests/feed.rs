//! Integration tests for the season feed against a mock JingleBox server

use jinglecatalog::{EnrichmentStatus, Season};
use jingleplayer::{PlayerError, SeasonLoader, TrackFeed};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bare(season: &str, title: &str) -> serde_json::Value {
    json!({
        "url": format!("/audio/{}/{}.mp3", season, title),
        "title": title,
        "season": season
    })
}

async fn mount_tracks(server: &MockServer, season: &str, titles: &[&str]) {
    let tracks: Vec<_> = titles.iter().map(|t| bare(season, t)).collect();
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .and(query_param("season", season))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"season": season, "tracks": tracks})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_load_season_enriched() {
    let server = MockServer::start().await;
    mount_tracks(&server, "christmas", &["Jingle Bells"]).await;
    Mock::given(method("POST"))
        .and(path("/api/spotify/enrich"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tracks": [{
            "url": "/audio/christmas/Jingle Bells.mp3",
            "title": "Jingle Bells",
            "season": "christmas",
            "artist": "Frank Sinatra",
            "album": "Christmas Songs",
            "spotify_track_id": "jb"
        }]})))
        .expect(1)
        .mount(&server)
        .await;

    let feed = TrackFeed::new(server.uri()).unwrap();
    let loaded = feed.load_season(Season::Christmas).await;

    assert!(loaded.error.is_none());
    assert_eq!(loaded.tracks.len(), 1);
    assert_eq!(loaded.tracks[0].status(), EnrichmentStatus::Matched);
    assert_eq!(loaded.tracks[0].artist(), Some("Frank Sinatra"));
}

#[tokio::test]
async fn test_enrichment_failure_falls_back_to_bare_tracks() {
    let server = MockServer::start().await;
    mount_tracks(&server, "halloween", &["Spooky Waltz", "Night Walk"]).await;
    Mock::given(method("POST"))
        .and(path("/api/spotify/enrich"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": "Catalog token failed: 401 invalid_client"})),
        )
        .mount(&server)
        .await;

    let loaded = TrackFeed::new(server.uri())
        .unwrap()
        .load_season(Season::Halloween)
        .await;

    assert_eq!(loaded.tracks.len(), 2);
    assert_eq!(loaded.tracks[0].title(), "Spooky Waltz");
    assert_eq!(loaded.tracks[1].url(), Some("/audio/halloween/Night Walk.mp3"));
    assert_eq!(
        loaded.error.as_deref(),
        Some("Enrichment failed: Catalog token failed: 401 invalid_client")
    );
}

#[tokio::test]
async fn test_enrichment_status_used_when_no_error_text() {
    let server = MockServer::start().await;
    mount_tracks(&server, "christmas", &["Silent Night"]).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let loaded = TrackFeed::new(server.uri())
        .unwrap()
        .load_season(Season::Christmas)
        .await;

    assert_eq!(loaded.error.as_deref(), Some("Enrichment failed: 502"));
    assert_eq!(loaded.tracks.len(), 1);
}

#[tokio::test]
async fn test_missing_manifest_gives_empty_list_with_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"tracks": [], "error": "Manifest not found"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let loaded = TrackFeed::new(server.uri())
        .unwrap()
        .load_season(Season::Christmas)
        .await;

    assert!(loaded.is_empty());
    assert_eq!(loaded.error.as_deref(), Some("Manifest not found"));
}

#[tokio::test]
async fn test_switching_season_drops_the_stale_load() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .and(query_param("season", "christmas"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"season": "christmas", "tracks": [bare("christmas", "Slow")]}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    mount_tracks(&server, "halloween", &["Fast"]).await;
    Mock::given(method("POST"))
        .and(path("/api/spotify/enrich"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tracks": [
            bare("halloween", "Fast")
        ]})))
        .mount(&server)
        .await;

    let loader = Arc::new(SeasonLoader::new(TrackFeed::new(server.uri()).unwrap()));

    let slow = {
        let loader = loader.clone();
        tokio::spawn(async move { loader.load(Season::Christmas).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let fast = loader.load(Season::Halloween).await.unwrap();
    assert_eq!(fast.season, Season::Halloween);
    assert_eq!(fast.tracks[0].title(), "Fast");

    let stale = slow.await.unwrap();
    assert!(matches!(stale, Err(PlayerError::Cancelled)));
}

#[tokio::test]
async fn test_tickets_track_the_latest_request() {
    let loader = SeasonLoader::new(TrackFeed::new("http://127.0.0.1:9").unwrap());

    let first = loader.begin(Season::Christmas);
    assert!(loader.is_current(&first));

    let second = loader.begin(Season::Halloween);
    assert!(first.is_cancelled());
    assert!(!loader.is_current(&first));
    assert!(loader.is_current(&second));
    assert_eq!(second.generation, first.generation + 1);

    loader.cancel();
    assert!(!loader.is_current(&second));
}
