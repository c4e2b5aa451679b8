//! Gestion des erreurs pour le catalogue et l'enrichissement

use thiserror::Error;

/// Type Result personnalisé pour jinglecatalog
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Erreurs qui font échouer un appel complet
///
/// Les échecs de recherche sur un morceau isolé ne sont pas des erreurs :
/// ils sont portés par [`crate::models::Enrichment::Failed`] dans le lot.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// L'échange de credentials a été refusé par le serveur d'autorisation
    #[error("Catalog token failed: {status} {body}")]
    Auth { status: u16, body: String },

    /// Client ID ou secret non configurés
    #[error("Missing catalog client_id or client_secret")]
    MissingCredentials,

    /// Corps de requête illisible
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Manifeste absent ou invalide
    #[error("Manifest unavailable: {0}")]
    ManifestUnavailable(String),

    /// Erreur HTTP
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Erreur de parsing JSON
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl CatalogError {
    /// Vrai si l'erreur empêche d'obtenir un token
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            CatalogError::Auth { .. } | CatalogError::MissingCredentials
        )
    }
}
