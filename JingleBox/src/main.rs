use jinglecatalog::CatalogServerExt;
use jingleconfig::get_config;
use jingleserver::{LoggingOptions, ServerBuilder};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_config();

    // ========== PHASE 1 : Serveur et logs ==========

    let mut server = ServerBuilder::new_configured().build();
    server
        .init_logging(LoggingOptions::from_config(&config))
        .await;

    server
        .add_route("/info", || async {
            serde_json::json!({
                "name": "JingleBox",
                "version": env!("CARGO_PKG_VERSION"),
            })
        })
        .await;

    // ========== PHASE 2 : Morceaux et catalogue ==========

    info!("🎵 Registering track and enrichment API...");
    server.init_catalog_api_configured().await?;

    // ========== PHASE 3 : Démarrage du serveur ==========

    info!("🌐 Starting HTTP server...");
    server.start().await?;

    let info = server.info();
    info!("✅ JingleBox is ready at http://{}:{}", info.base_url, info.http_port);
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}
