//! Extension pour intégrer la configuration du catalogue dans jingleconfig
//!
//! Ce module fournit le trait `CatalogConfigExt` qui ajoute à
//! `jingleconfig::Config` les accesseurs du sous-arbre `catalog.*`.

use anyhow::{Result, anyhow};
use jingleconfig::{Config, encryption};
use serde_yaml::Value;
use std::time::Duration;

use crate::api::{DEFAULT_SEARCH_URL, auth::DEFAULT_TOKEN_URL};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TOKEN_MARGIN_SECS: u64 = 10;
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Trait d'extension pour gérer la configuration du catalogue
///
/// # Exemple
///
/// ```rust,ignore
/// use jingleconfig::get_config;
/// use jinglecatalog::CatalogConfigExt;
///
/// let config = get_config();
/// let (id, secret) = config.get_catalog_credentials()?;
/// ```
pub trait CatalogConfigExt {
    /// Client ID de l'application (chaîne vide si non configuré)
    fn get_catalog_client_id(&self) -> String;

    fn set_catalog_client_id(&self, client_id: &str) -> Result<()>;

    /// Secret de l'application, déchiffré s'il est stocké chiffré
    ///
    /// # Errors
    ///
    /// Retourne une erreur si le secret chiffré ne peut pas être déchiffré
    /// (configuration copiée depuis une autre machine)
    fn get_catalog_client_secret(&self) -> Result<String>;

    /// Stocke le secret chiffré avec la clé de la machine
    ///
    /// Sur une plateforme sans identifiant de machine, le secret est stocké en clair.
    fn set_catalog_client_secret(&self, secret: &str) -> Result<()>;

    fn get_catalog_credentials(&self) -> Result<(String, String)>;

    fn get_catalog_token_url(&self) -> String;

    fn get_catalog_search_url(&self) -> String;

    fn set_catalog_endpoints(&self, token_url: &str, search_url: &str) -> Result<()>;

    /// Timeout des requêtes HTTP vers le catalogue
    fn get_catalog_request_timeout(&self) -> Duration;

    /// Marge de renouvellement du jeton avant son expiration
    fn get_catalog_token_margin(&self) -> Duration;

    /// Validité du jeton quand la réponse ne la précise pas
    fn get_catalog_default_token_ttl(&self) -> Duration;
}

impl CatalogConfigExt for Config {
    fn get_catalog_client_id(&self) -> String {
        self.get_string_or(&["catalog", "client_id"], "")
    }

    fn set_catalog_client_id(&self, client_id: &str) -> Result<()> {
        self.set_value(
            &["catalog", "client_id"],
            Value::String(client_id.to_string()),
        )
    }

    fn get_catalog_client_secret(&self) -> Result<String> {
        let raw = self.get_string_or(&["catalog", "client_secret"], "");
        encryption::reveal_secret(&raw)
            .map_err(|e| anyhow!("Failed to decrypt catalog client secret: {}", e))
    }

    fn set_catalog_client_secret(&self, secret: &str) -> Result<()> {
        let stored = match encryption::encrypt_secret(secret) {
            Ok(encrypted) => encrypted,
            Err(e) => {
                tracing::warn!("Storing catalog secret in clear: {}", e);
                secret.to_string()
            }
        };
        self.set_value(&["catalog", "client_secret"], Value::String(stored))
    }

    fn get_catalog_credentials(&self) -> Result<(String, String)> {
        Ok((
            self.get_catalog_client_id(),
            self.get_catalog_client_secret()?,
        ))
    }

    fn get_catalog_token_url(&self) -> String {
        self.get_string_or(&["catalog", "token_url"], DEFAULT_TOKEN_URL)
    }

    fn get_catalog_search_url(&self) -> String {
        self.get_string_or(&["catalog", "search_url"], DEFAULT_SEARCH_URL)
    }

    fn set_catalog_endpoints(&self, token_url: &str, search_url: &str) -> Result<()> {
        self.set_value(
            &["catalog", "token_url"],
            Value::String(token_url.to_string()),
        )?;
        self.set_value(
            &["catalog", "search_url"],
            Value::String(search_url.to_string()),
        )
    }

    fn get_catalog_request_timeout(&self) -> Duration {
        Duration::from_secs(self.get_u64_or(
            &["catalog", "request_timeout_secs"],
            DEFAULT_REQUEST_TIMEOUT_SECS,
        ))
    }

    fn get_catalog_token_margin(&self) -> Duration {
        Duration::from_secs(
            self.get_u64_or(&["catalog", "token_margin_secs"], DEFAULT_TOKEN_MARGIN_SECS),
        )
    }

    fn get_catalog_default_token_ttl(&self) -> Duration {
        Duration::from_secs(self.get_u64_or(
            &["catalog", "default_token_ttl_secs"],
            DEFAULT_TOKEN_TTL_SECS,
        ))
    }
}
