//! Extension de jingleserver::Server pour exposer le catalogue
//!
//! `jingleserver` reste générique : c'est cette crate qui ajoute ses routes
//! au serveur au travers du trait [`CatalogServerExt`].

use crate::api_rest::{CatalogApiDoc, CatalogState, create_router};
use crate::client::CatalogClient;
use crate::manifest::{FileManifest, ManifestSource};
use anyhow::Result;
use jingleconfig::get_config;
use jingleserver::Server;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

/// Trait d'extension pour ajouter les endpoints du catalogue à un serveur
///
/// # Routes enregistrées
///
/// - `GET /api/tracks?season=` - Morceaux d'une saison
/// - `POST /api/spotify/enrich` - Enrichissement d'un lot de morceaux
/// - `GET /swagger-ui/catalog` - Documentation interactive
///
/// # Exemple
///
/// ```rust,no_run
/// use jinglecatalog::CatalogServerExt;
/// use jingleserver::ServerBuilder;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let mut server = ServerBuilder::new_configured().build();
///     server.init_catalog_api_configured().await?;
///     server.start().await?;
///     server.wait().await;
///     Ok(())
/// }
/// ```
pub trait CatalogServerExt {
    /// Enregistre les routes avec un client et un manifeste donnés
    async fn init_catalog_api(
        &mut self,
        client: CatalogClient,
        manifest: Arc<dyn ManifestSource>,
    ) -> Result<()>;

    /// Enregistre les routes depuis la configuration
    ///
    /// Utilise `manifest.path` pour le manifeste et `catalog.*` pour le client.
    async fn init_catalog_api_configured(&mut self) -> Result<CatalogClient>;
}

impl CatalogServerExt for Server {
    async fn init_catalog_api(
        &mut self,
        client: CatalogClient,
        manifest: Arc<dyn ManifestSource>,
    ) -> Result<()> {
        let router = create_router(CatalogState { client, manifest });
        self.add_openapi_at("/api", router, CatalogApiDoc::openapi(), "catalog")
            .await;
        Ok(())
    }

    async fn init_catalog_api_configured(&mut self) -> Result<CatalogClient> {
        let config = get_config();
        let manifest_path = config.get_manifest_path();
        info!("Serving tracks from manifest {}", manifest_path);

        let client = CatalogClient::from_config_obj(&config)?;
        let manifest: Arc<dyn ManifestSource> = Arc::new(FileManifest::new(manifest_path));
        self.init_catalog_api(client.clone(), manifest).await?;
        Ok(client)
    }
}
