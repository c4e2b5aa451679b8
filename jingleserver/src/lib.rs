//! # jingleserver - Serveur web haut niveau basé sur Axum
//!
//! Cette crate fournit le serveur HTTP partagé par les crates de JingleBox :
//! les crates de domaine y enregistrent leurs routes au travers de traits
//! d'extension (voir `jinglecatalog::CatalogServerExt`).
//!
//! ## Architecture
//!
//! - [`server`] : serveur principal et builder
//! - [`logs`] : initialisation de `tracing`, buffer mémoire et flux SSE des logs
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use jingleserver::{ServerBuilder, logs::LoggingOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = ServerBuilder::new("MyServer", "localhost", 8080).build();
//!     server.init_logging(LoggingOptions::default()).await;
//!
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogState, LoggingOptions, log_dump, log_sse};
pub use server::{Server, ServerBuilder, ServerInfo};
