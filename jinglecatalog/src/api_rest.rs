//! Endpoints API REST : liste des morceaux et enrichissement
//!
//! - `GET /tracks?season=` : morceaux bruts d'une saison, lus dans le manifeste
//! - `POST /spotify/enrich` : enrichissement d'un lot `{"tracks": [...]}`

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::{
    client::CatalogClient,
    error::CatalogError,
    manifest::ManifestSource,
    models::{BareTrack, EnrichedTrack, Season},
};

/// État partagé des handlers
#[derive(Clone)]
pub struct CatalogState {
    pub client: CatalogClient,
    pub manifest: Arc<dyn ManifestSource>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TracksParams {
    /// `christmas` ou `halloween` ; toute autre valeur donne `christmas`
    pub season: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TracksResponse {
    pub season: Season,
    pub tracks: Vec<BareTrack>,
}

/// Corps de la requête d'enrichissement
///
/// Chaque morceau a au moins un `title` et éventuellement un `artist` ;
/// les autres champs sont renvoyés tels quels.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrichRequest {
    #[schema(value_type = Vec<Object>)]
    pub tracks: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrichResponse {
    #[schema(value_type = Vec<Object>)]
    pub tracks: Vec<EnrichedTrack>,
}

/// Crée le router Axum des endpoints du catalogue
pub fn create_router(state: CatalogState) -> Router {
    Router::new()
        .route("/tracks", get(get_tracks))
        .route("/spotify/enrich", post(enrich_tracks))
        .with_state(state)
}

// ============ Handlers ============

#[utoipa::path(
    get,
    path = "/tracks",
    params(TracksParams),
    responses(
        (status = 200, description = "Tracks of the requested season", body = TracksResponse),
        (status = 500, description = "Manifest not found")
    ),
    tag = "catalog"
)]
async fn get_tracks(
    State(state): State<CatalogState>,
    Query(params): Query<TracksParams>,
) -> Response {
    let season = Season::from_query(params.season.as_deref());

    match state.manifest.tracks(season).await {
        Ok(tracks) => (
            [(header::CACHE_CONTROL, "no-store")],
            Json(TracksResponse { season, tracks }),
        )
            .into_response(),
        Err(e) => {
            warn!("Cannot list tracks for {}: {}", season, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "tracks": [],
                    "error": "Manifest not found"
                })),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/spotify/enrich",
    request_body = EnrichRequest,
    responses(
        (status = 200, description = "Enriched tracks, same order as the request", body = EnrichResponse),
        (status = 400, description = "Body is not JSON"),
        (status = 500, description = "No catalog token could be obtained")
    ),
    tag = "catalog"
)]
async fn enrich_tracks(
    State(state): State<CatalogState>,
    body: Bytes,
) -> Result<Json<EnrichResponse>, AppError> {
    let tracks = state.client.enrich_json(&body).await?;
    Ok(Json(EnrichResponse { tracks }))
}

// ============ Gestion des erreurs ============

struct AppError(CatalogError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            CatalogError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            warn!("Enrichment failed: {}", self.0);
        }

        let body = Json(serde_json::json!({
            "error": self.0.to_string()
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<CatalogError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Documentation OpenAPI des endpoints du catalogue
#[derive(OpenApi)]
#[openapi(
    paths(get_tracks, enrich_tracks),
    components(schemas(TracksResponse, EnrichRequest, EnrichResponse, BareTrack, Season)),
    tags(
        (name = "catalog", description = "Seasonal tracks and catalog enrichment")
    )
)]
pub struct CatalogApiDoc;
