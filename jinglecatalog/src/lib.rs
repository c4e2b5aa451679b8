//! # jinglecatalog - Morceaux saisonniers et enrichissement par le catalogue
//!
//! Cette crate fournit la partie serveur de JingleBox :
//! - la lecture du manifeste saison → morceaux ([`ManifestSource`]) ;
//! - le cache du jeton d'accès au catalogue ([`TokenCache`]) ;
//! - l'enrichissement séquentiel d'un lot de morceaux ([`Enricher`]) ;
//! - les endpoints REST `/api/tracks` et `/api/spotify/enrich` (feature `server`).
//!
//! ## Structure des modules
//!
//! ```text
//! jinglecatalog/
//! ├── src/
//! │   ├── lib.rs              # Module principal (ce fichier)
//! │   ├── client.rs           # Client haut niveau
//! │   ├── models.rs           # Saisons, morceaux bruts et enrichis
//! │   ├── manifest.rs         # Source des morceaux par saison
//! │   ├── enrich.rs           # Enrichissement d'un lot
//! │   ├── api/
//! │   │   ├── mod.rs          # Recherche dans le catalogue
//! │   │   ├── auth.rs         # Jeton d'accès
//! │   │   └── search.rs       # Décodage des réponses de recherche
//! │   ├── config_ext.rs       # Clés catalog.* de jingleconfig
//! │   ├── api_rest.rs         # Handlers HTTP
//! │   ├── server_ext.rs       # Enregistrement des routes sur jingleserver
//! │   └── error.rs            # Gestion des erreurs
//! ```
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use jinglecatalog::{CatalogClient, TrackRecord};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = CatalogClient::from_config()?;
//!
//!     let tracks = client
//!         .enrich(vec![TrackRecord::new("White Christmas").with_artist("Bing Crosby")])
//!         .await?;
//!     for track in &tracks {
//!         println!("{} - {:?} ({:?})", track.title(), track.artist(), track.status());
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config_ext;
pub mod enrich;
pub mod error;
pub mod manifest;
pub mod models;

#[cfg(feature = "server")]
pub mod api_rest;
#[cfg(feature = "server")]
pub mod server_ext;

pub use api::CatalogApi;
pub use api::auth::{Clock, Credential, SystemClock, TokenCache, TokenCacheConfig};
pub use api::search::SearchFailure;
pub use client::CatalogClient;
pub use config_ext::CatalogConfigExt;
pub use enrich::{BatchSummary, Enricher};
pub use error::{CatalogError, Result};
pub use manifest::{FileManifest, Manifest, ManifestSource, StaticManifest};
pub use models::{
    BareTrack, CatalogMetadata, EnrichedTrack, Enrichment, EnrichmentStatus, Season,
    TrackRecord, UnknownSeason,
};

#[cfg(feature = "server")]
pub use server_ext::CatalogServerExt;
