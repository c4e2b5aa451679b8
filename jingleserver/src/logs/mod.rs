// logs/mod.rs
mod layer;

pub use layer::LogLayer;

use jingleconfig::Config;
use std::{
    collections::VecDeque,
    sync::{Arc, RwLock},
    time::SystemTime,
};

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::Level;
use tracing_subscriber::{
    Registry,
    filter::LevelFilter,
    layer::SubscriberExt,
    reload,
    util::SubscriberInitExt,
};

const AVAILABLE_LEVELS: [&str; 5] = ["ERROR", "WARN", "INFO", "DEBUG", "TRACE"];

/// Représente une entrée de log
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: SystemTime,
    pub level: String,
    pub target: String,
    pub message: String,
}

/// Buffer circulaire partagé
#[derive(Clone)]
pub struct LogState {
    buffer: Arc<RwLock<VecDeque<LogEntry>>>,
    capacity: usize,
    tx: broadcast::Sender<LogEntry>,
    max_level: Arc<RwLock<Level>>,
    reload_handle: Option<reload::Handle<LevelFilter, Registry>>,
}

impl LogState {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
            tx: broadcast::channel(1000).0,
            max_level: Arc::new(RwLock::new(Level::TRACE)),
            reload_handle: None,
        }
    }

    fn with_reload_handle(mut self, handle: reload::Handle<LevelFilter, Registry>) -> Self {
        self.reload_handle = Some(handle);
        self
    }

    pub fn set_max_level(&self, level: Level) {
        *self.max_level.write().unwrap_or_else(|e| e.into_inner()) = level;

        if let Some(handle) = &self.reload_handle {
            if let Err(e) = handle.reload(level_to_levelfilter(level)) {
                tracing::error!("Failed to reload log level filter: {}", e);
            }
        }
    }

    pub fn get_max_level(&self) -> Level {
        *self.max_level.read().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, entry: LogEntry) {
        {
            let mut buf = self.buffer.write().unwrap_or_else(|e| e.into_inner());
            while buf.len() >= self.capacity {
                buf.pop_front();
            }
            buf.push_back(entry.clone());
        }
        let _ = self.tx.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.tx.subscribe()
    }

    pub fn dump(&self) -> Vec<LogEntry> {
        self.buffer
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}

/// Query params pour /log-sse
#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    #[serde(default)]
    pub error: Option<bool>,
    #[serde(default)]
    pub warn: Option<bool>,
    #[serde(default)]
    pub info: Option<bool>,
    #[serde(default)]
    pub debug: Option<bool>,
    #[serde(default)]
    pub trace: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Handler SSE : l'historique filtré, puis les nouvelles entrées en direct
pub async fn log_sse(
    State(state): State<LogState>,
    Query(params): Query<LogQuery>,
) -> impl IntoResponse {
    let mut rx = state.subscribe();
    let history = state.dump();
    let stream_state = state.clone();

    let stream = async_stream::stream! {
        let current_level = stream_state.get_max_level();
        for entry in history {
            if !is_level_allowed(&entry.level, current_level) || !filter_entry(&entry, &params) {
                continue;
            }
            if let Ok(json) = serde_json::to_string(&entry) {
                yield Ok::<_, axum::Error>(Event::default().data(json));
            }
        }

        loop {
            let entry = match rx.recv().await {
                Ok(entry) => entry,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if !is_level_allowed(&entry.level, stream_state.get_max_level())
                || !filter_entry(&entry, &params)
            {
                continue;
            }
            if let Ok(json) = serde_json::to_string(&entry) {
                yield Ok::<_, axum::Error>(Event::default().data(json));
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handler REST (dump JSON du buffer)
pub async fn log_dump(State(state): State<LogState>) -> impl IntoResponse {
    Json(state.dump())
}

/// Un log est autorisé si son niveau est au moins aussi sévère que `max_level`
fn is_level_allowed(log_level: &str, max_level: Level) -> bool {
    match string_to_level(log_level) {
        // Dans tracing, ERROR < WARN < ... < TRACE en verbosité
        Some(entry_level) => entry_level <= max_level,
        None => false,
    }
}

/// Filtrage par niveaux demandés et par mot-clé
fn filter_entry(entry: &LogEntry, q: &LogQuery) -> bool {
    let lvl = entry.level.to_lowercase();
    let flags = [
        (q.error, "error"),
        (q.warn, "warn"),
        (q.info, "info"),
        (q.debug, "debug"),
        (q.trace, "trace"),
    ];

    let any_flag = flags.iter().any(|(f, _)| f.unwrap_or(false));
    let mut allowed = !any_flag
        || flags
            .iter()
            .any(|(f, name)| f.unwrap_or(false) && lvl == *name);

    if let Some(search) = &q.search {
        allowed &= entry.message.contains(search) || entry.target.contains(search);
    }

    allowed
}

/// Options d'initialisation du système de logging
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Capacité du buffer circulaire (nombre d'entrées conservées)
    pub buffer_capacity: usize,
    /// Activer la sortie console
    pub enable_console: bool,
    /// Niveau minimum au démarrage
    pub min_level: Level,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: 1000,
            enable_console: true,
            min_level: Level::INFO,
        }
    }
}

impl LoggingOptions {
    /// Lit `host.logger.*` en retombant sur les valeurs par défaut
    pub fn from_config(config: &Config) -> Self {
        Self {
            buffer_capacity: config.get_log_cache_size(),
            enable_console: config.get_log_enable_console(),
            min_level: string_to_level(&config.get_log_min_level())
                .unwrap_or(Self::default().min_level),
        }
    }
}

/// Initialise le système de logging global
///
/// Installe un filtre rechargeable, la couche mémoire [`LogLayer`] et,
/// si demandé, une couche console. Si un subscriber global est déjà en place
/// (tests, double initialisation), le `LogState` retourné reste utilisable
/// mais ne reçoit pas les événements.
pub fn init_logging(options: LoggingOptions) -> LogState {
    let (filter, reload_handle) = reload::Layer::new(level_to_levelfilter(options.min_level));

    let log_state = LogState::new(options.buffer_capacity).with_reload_handle(reload_handle);
    *log_state
        .max_level
        .write()
        .unwrap_or_else(|e| e.into_inner()) = options.min_level;

    // Le filtre doit être appliqué avant la couche mémoire
    let subscriber = Registry::default()
        .with(filter)
        .with(LogLayer::new(log_state.clone()));

    let result = if options.enable_console {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true),
            )
            .try_init()
    } else {
        subscriber.try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialised: {}", e);
    }

    log_state
}

/// Request body pour la configuration du logging
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LogSetupRequest {
    pub level: String,
}

/// Response pour la configuration du logging
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LogSetupResponse {
    pub current_level: String,
    pub available_levels: Vec<String>,
}

impl LogSetupResponse {
    fn for_level(level: Level) -> Self {
        Self {
            current_level: level_to_string(level),
            available_levels: AVAILABLE_LEVELS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Handler pour GET /api/logs/log_setup - retourne la configuration actuelle
#[utoipa::path(
    get,
    path = "/log_setup",
    responses(
        (status = 200, description = "Log configuration retrieved successfully", body = LogSetupResponse)
    ),
    tag = "logs"
)]
pub async fn log_setup_get(State(state): State<LogState>) -> impl IntoResponse {
    Json(LogSetupResponse::for_level(state.get_max_level()))
}

/// Handler pour POST /api/logs/log_setup - met à jour le niveau de log
#[utoipa::path(
    post,
    path = "/log_setup",
    request_body = LogSetupRequest,
    responses(
        (status = 200, description = "Log level updated successfully", body = LogSetupResponse),
        (status = 400, description = "Invalid log level")
    ),
    tag = "logs"
)]
pub async fn log_setup_post(
    State(state): State<LogState>,
    Json(payload): Json<LogSetupRequest>,
) -> impl IntoResponse {
    let Some(level) = string_to_level(&payload.level) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "Invalid log level. Must be one of: ERROR, WARN, INFO, DEBUG, TRACE"
            })),
        )
            .into_response();
    };

    state.set_max_level(level);
    tracing::info!("Log level changed to: {}", payload.level);

    (StatusCode::OK, Json(LogSetupResponse::for_level(level))).into_response()
}

fn string_to_level(s: &str) -> Option<Level> {
    match s.trim().to_uppercase().as_str() {
        "ERROR" => Some(Level::ERROR),
        "WARN" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}

fn level_to_string(level: Level) -> String {
    level.as_str().to_string()
}

fn level_to_levelfilter(level: Level) -> LevelFilter {
    LevelFilter::from_level(level)
}

/// Crée le router pour l'API de gestion des logs
pub fn create_logs_router(log_state: LogState) -> axum::Router {
    use axum::routing::get;
    axum::Router::new()
        .route("/log_setup", get(log_setup_get).post(log_setup_post))
        .with_state(log_state)
}

/// API OpenAPI pour la gestion des logs
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(log_setup_get, log_setup_post),
    components(schemas(LogSetupRequest, LogSetupResponse)),
    tags(
        (name = "logs", description = "Log level configuration endpoints")
    )
)]
pub struct LogsApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: &str, message: &str) -> LogEntry {
        LogEntry {
            timestamp: SystemTime::now(),
            level: level.to_string(),
            target: "jinglecatalog::enrich".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_ring_buffer_drops_oldest() {
        let state = LogState::new(2);
        state.push(entry("INFO", "one"));
        state.push(entry("INFO", "two"));
        state.push(entry("INFO", "three"));

        let messages: Vec<_> = state.dump().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn test_level_ordering() {
        assert!(is_level_allowed("ERROR", Level::INFO));
        assert!(is_level_allowed("INFO", Level::INFO));
        assert!(!is_level_allowed("DEBUG", Level::INFO));
        assert!(is_level_allowed("TRACE", Level::TRACE));
        assert!(!is_level_allowed("bogus", Level::TRACE));
    }

    #[test]
    fn test_filter_entry_flags_and_search() {
        let warn = entry("WARN", "search 429");
        let info = entry("INFO", "batch enriched");

        let only_warn = LogQuery {
            warn: Some(true),
            ..Default::default()
        };
        assert!(filter_entry(&warn, &only_warn));
        assert!(!filter_entry(&info, &only_warn));

        let search = LogQuery {
            search: Some("batch".into()),
            ..Default::default()
        };
        assert!(!filter_entry(&warn, &search));
        assert!(filter_entry(&info, &search));
    }

    #[test]
    fn test_set_max_level_without_subscriber() {
        let state = LogState::new(10);
        state.set_max_level(Level::WARN);
        assert_eq!(state.get_max_level(), Level::WARN);
    }
}
