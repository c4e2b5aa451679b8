//! # Module Server - API de haut niveau pour Axum
//!
//! Ce module fournit une abstraction simple pour créer le serveur HTTP de
//! JingleBox avec Axum, en cachant la configuration du routage.
//!
//! ## Fonctionnalités
//!
//! - **Routes JSON simples** : endpoints GET avec `add_route()`
//! - **Handlers personnalisés** : handlers avec état (SSE) via `add_handler_with_state()`
//! - **Documentation API** : OpenAPI/Swagger avec `add_openapi()`
//! - **Arrêt gracieux** : sur Ctrl+C

use crate::logs::{
    LogState, LoggingOptions, LogsApiDoc, create_logs_router, init_logging, log_dump, log_sse,
};
use anyhow::{Context, Result};
use axum::handler::Handler;
use axum::routing::get;
use axum::{Json, Router};
use jingleconfig::get_config;
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{signal, sync::RwLock, task::JoinHandle};
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const DEFAULT_SERVER_NAME: &str = "JingleBox";

/// Info serveur sérialisable
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct ServerInfo {
    pub name: String,
    pub base_url: String,
    pub http_port: u16,
}

/// Serveur principal
pub struct Server {
    name: String,
    base_url: String,
    http_port: u16,
    router: Arc<RwLock<Router>>,
    join_handle: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
    log_state: Option<LogState>,
}

impl Server {
    /// Crée une nouvelle instance de serveur
    ///
    /// # Arguments
    ///
    /// * `name` - Nom du serveur (pour les logs)
    /// * `base_url` - Nom d'hôte annoncé (ex: "localhost")
    /// * `http_port` - Port HTTP à écouter (0 = port libre choisi par l'OS)
    ///
    /// # Exemple
    ///
    /// ```rust
    /// # use jingleserver::Server;
    /// let server = Server::new("MyAPI", "localhost", 3000);
    /// ```
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, http_port: u16) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            http_port,
            router: Arc::new(RwLock::new(Router::new())),
            join_handle: None,
            local_addr: None,
            log_state: None,
        }
    }

    pub fn new_configured() -> Self {
        let config = get_config();
        Self::new(
            DEFAULT_SERVER_NAME,
            config.get_base_url(),
            config.get_http_port(),
        )
    }

    async fn mount(&self, path: &str, route: Router) {
        let mut r = self.router.write().await;
        *r = if path == "/" {
            std::mem::take(&mut *r).merge(route)
        } else {
            std::mem::take(&mut *r).nest(path, route)
        };
    }

    /// Ajoute une route JSON dynamique
    ///
    /// La closure fournie est appelée à chaque requête GET sur `path`.
    ///
    /// ```rust,no_run
    /// # use jingleserver::Server;
    /// # #[tokio::main]
    /// # async fn main() {
    /// # let mut server = Server::new("Test", "localhost", 3000);
    /// server.add_route("/info", || async {
    ///     serde_json::json!({"status": "online"})
    /// }).await;
    /// # }
    /// ```
    pub async fn add_route<F, Fut, T>(&mut self, path: &str, f: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let f = Arc::new(f);
        let handler = move || {
            let f = f.clone();
            async move { Json(f().await) }
        };

        self.mount(path, Router::new().route("/", get(handler))).await;
    }

    /// Ajoute un handler GET avec état
    pub async fn add_handler_with_state<H, T, S>(&mut self, path: &str, handler: H, state: S)
    where
        H: Handler<T, S> + Clone + 'static,
        T: 'static,
        S: Clone + Send + Sync + 'static,
    {
        let route = Router::new().route("/", get(handler)).with_state(state);
        self.mount(path, route).await;
    }

    /// Ajoute une API documentée, montée sous `/api/{name}`
    ///
    /// - `/swagger-ui/{name}` affiche la documentation Swagger
    /// - `/api-docs/{name}.json` fournit la spécification OpenAPI
    pub async fn add_openapi(
        &mut self,
        api_router: Router,
        openapi: utoipa::openapi::OpenApi,
        name: &str,
    ) {
        let base_path = format!("/api/{}", name);
        self.add_openapi_at(&base_path, api_router, openapi, name)
            .await;
    }

    /// Comme [`Server::add_openapi`], mais sous un préfixe choisi
    ///
    /// Plusieurs APIs peuvent partager le même préfixe tant que leurs
    /// chemins ne se recouvrent pas.
    pub async fn add_openapi_at(
        &mut self,
        base_path: &str,
        api_router: Router,
        openapi: utoipa::openapi::OpenApi,
        name: &str,
    ) {
        // SwaggerUi exige des chemins 'static
        let swagger_path: &'static str = Box::leak(format!("/swagger-ui/{}", name).into_boxed_str());
        let openapi_json_path: &'static str =
            Box::leak(format!("/api-docs/{}.json", name).into_boxed_str());

        let swagger = SwaggerUi::new(swagger_path).url(openapi_json_path, openapi);
        let nested_router = Router::new().nest(base_path, api_router);

        let mut r = self.router.write().await;
        *r = std::mem::take(&mut *r).merge(nested_router).merge(swagger);
    }

    /// Copie du router courant (tests, intégration dans un autre serveur)
    pub async fn router(&self) -> Router {
        self.router.read().await.clone()
    }

    /// Démarre le serveur HTTP
    ///
    /// Le port est réservé avant le retour : une erreur de bind est
    /// remontée à l'appelant au lieu d'arrêter une tâche de fond.
    ///
    /// ```rust,no_run
    /// # use jingleserver::Server;
    /// # #[tokio::main]
    /// # async fn main() -> anyhow::Result<()> {
    /// # let mut server = Server::new("Test", "localhost", 3000);
    /// server.start().await?;
    /// server.wait().await;  // Attend Ctrl+C
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start(&mut self) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind HTTP port {}", self.http_port))?;
        let local_addr = listener.local_addr()?;
        self.local_addr = Some(local_addr);

        info!(
            "Server {} running at http://{}:{}",
            self.name,
            self.base_url,
            local_addr.port()
        );

        let router = self.router.read().await.clone();
        let server_task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router.into_make_service()).await {
                error!("HTTP server stopped: {}", e);
            }
        });

        let shutdown_task = tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => info!("Ctrl+C reçu, arrêt gracieux"),
                Err(e) => {
                    error!("Failed to listen for Ctrl+C: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        });

        self.join_handle = Some(tokio::spawn(async move {
            tokio::select! {
                _ = server_task => {},
                _ = shutdown_task => {},
            }
        }));

        Ok(())
    }

    /// Attend la fin du serveur
    pub async fn wait(&mut self) {
        if let Some(h) = self.join_handle.take() {
            let _ = h.await;
        }
    }

    /// Adresse effectivement liée, une fois le serveur démarré
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Récupère les infos du serveur
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            name: self.name.clone(),
            base_url: self.base_url.clone(),
            http_port: self
                .local_addr
                .map(|a| a.port())
                .unwrap_or(self.http_port),
        }
    }

    pub fn log_state(&self) -> Option<&LogState> {
        self.log_state.as_ref()
    }

    /// Initialise le système de logging et enregistre les routes de logs
    ///
    /// Routes enregistrées : `/log-sse`, `/log-dump` et
    /// `/api/logs/log_setup` (lecture/modification du niveau).
    ///
    /// ```rust,no_run
    /// # use jingleserver::{ServerBuilder, logs::LoggingOptions};
    /// # #[tokio::main]
    /// # async fn main() {
    /// let mut server = ServerBuilder::new_configured().build();
    /// server.init_logging(LoggingOptions {
    ///     enable_console: false,
    ///     ..Default::default()
    /// }).await;
    /// # }
    /// ```
    pub async fn init_logging(&mut self, options: LoggingOptions) {
        let log_state = init_logging(options);

        self.add_handler_with_state("/log-sse", log_sse, log_state.clone())
            .await;
        self.add_handler_with_state("/log-dump", log_dump, log_state.clone())
            .await;
        self.add_openapi(
            create_logs_router(log_state.clone()),
            LogsApiDoc::openapi(),
            "logs",
        )
        .await;

        self.log_state = Some(log_state);
    }
}

/// Builder pattern
pub struct ServerBuilder {
    name: String,
    base_url: String,
    http_port: u16,
}

impl ServerBuilder {
    /// Crée un nouveau builder
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, http_port: u16) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            http_port,
        }
    }

    pub fn new_configured() -> Self {
        let config = get_config();
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            base_url: config.get_base_url(),
            http_port: config.get_http_port(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    /// Construit le serveur
    pub fn build(self) -> Server {
        Server::new(self.name, self.base_url, self.http_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_add_route_serves_json() {
        let mut server = ServerBuilder::new("Test", "localhost", 0).build();
        server
            .add_route("/info", || async { serde_json::json!({"status": "ok"}) })
            .await;

        let response = server
            .router()
            .await
            .oneshot(Request::get("/info").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_logs_api_is_mounted() {
        let mut server = Server::new("Test", "localhost", 0);
        server
            .add_openapi(
                create_logs_router(LogState::new(8)),
                LogsApiDoc::openapi(),
                "logs",
            )
            .await;

        let response = server
            .router()
            .await
            .oneshot(
                Request::get("/api/logs/log_setup")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["current_level"], "TRACE");
        assert_eq!(json["available_levels"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_invalid_log_level_is_rejected() {
        let router = create_logs_router(LogState::new(8));
        let response = router
            .oneshot(
                Request::post("/log_setup")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"level": "LOUD"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_start_reports_bound_port() {
        let mut server = Server::new("Test", "localhost", 0);
        server.start().await.unwrap();

        let port = server.local_addr().unwrap().port();
        assert_ne!(port, 0);
        assert_eq!(server.info().http_port, port);
    }
}
