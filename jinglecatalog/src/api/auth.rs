//! Jeton d'accès au catalogue (OAuth2 client credentials)
//!
//! Le [`TokenCache`] conserve un seul jeton par processus et le renouvelle à
//! la demande, 10 secondes avant son expiration. Deux appels simultanés dans
//! la fenêtre d'expiration peuvent déclencher deux échanges : le serveur
//! d'autorisation les accepte, le dernier jeton reçu remplace l'autre.

use crate::error::{CatalogError, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// URL par défaut de l'échange de credentials
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Source du temps courant, remplaçable dans les tests
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Horloge système
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Jeton et date d'expiration, toujours remplacés ensemble
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Utilisable si `now < expires_at - margin`
    pub fn is_fresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now < self.expires_at - margin
    }
}

/// Paramètres de l'échange de credentials
#[derive(Debug, Clone)]
pub struct TokenCacheConfig {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Marge avant expiration en deçà de laquelle le jeton est renouvelé
    pub safety_margin: Duration,
    /// Durée de validité si la réponse n'indique pas `expires_in`
    pub default_ttl: Duration,
}

impl TokenCacheConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            safety_margin: Duration::seconds(10),
            default_ttl: Duration::seconds(3600),
        }
    }

    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }
}

/// Réponse de l'endpoint de token
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Cache du jeton d'accès, partagé par toutes les requêtes d'enrichissement
pub struct TokenCache {
    client: Client,
    config: TokenCacheConfig,
    clock: Arc<dyn Clock>,
    credential: RwLock<Option<Credential>>,
    exchanges: AtomicU64,
}

impl TokenCache {
    pub fn new(client: Client, config: TokenCacheConfig) -> Self {
        Self::with_clock(client, config, Arc::new(SystemClock))
    }

    pub fn with_clock(client: Client, config: TokenCacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            config,
            clock,
            credential: RwLock::new(None),
            exchanges: AtomicU64::new(0),
        }
    }

    /// Retourne le jeton en cache s'il est encore valide, sinon en obtient un nouveau
    ///
    /// # Errors
    ///
    /// * `CatalogError::MissingCredentials` - client ID ou secret vide
    /// * `CatalogError::Auth` - l'échange a été refusé
    pub async fn get_token(&self) -> Result<String> {
        let now = self.clock.now();
        if let Some(token) = self.cached(now) {
            return Ok(token);
        }

        // Le verrou n'est jamais tenu pendant l'échange réseau
        let credential = self.exchange().await?;
        let token = credential.token.clone();
        *self.credential.write().unwrap_or_else(|e| e.into_inner()) = Some(credential);
        Ok(token)
    }

    fn cached(&self, now: DateTime<Utc>) -> Option<String> {
        self.credential
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .filter(|c| c.is_fresh(now, self.config.safety_margin))
            .map(|c| c.token.clone())
    }

    /// Copie du credential courant, s'il existe
    pub fn credential(&self) -> Option<Credential> {
        self.credential
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Nombre d'échanges effectués depuis la création
    pub fn exchange_count(&self) -> u64 {
        self.exchanges.load(Ordering::Relaxed)
    }

    async fn exchange(&self) -> Result<Credential> {
        if self.config.client_id.is_empty() || self.config.client_secret.is_empty() {
            warn!("Catalog credentials are not configured");
            return Err(CatalogError::MissingCredentials);
        }

        self.exchanges.fetch_add(1, Ordering::Relaxed);
        debug!("Requesting catalog token from {}", self.config.token_url);

        let response = self
            .client
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Catalog token exchange failed ({}): {}", status.as_u16(), body);
            return Err(CatalogError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let data: TokenResponse = response.json().await?;
        let ttl = data
            .expires_in
            .filter(|s| *s > 0)
            .map(Duration::seconds)
            .unwrap_or(self.config.default_ttl);
        let expires_at = self.clock.now() + ttl;

        info!("Catalog token obtained, valid for {}s", ttl.num_seconds());

        Ok(Credential {
            token: data.access_token,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Horloge manuelle pour simuler le passage du temps
    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(Utc::now())))
        }

        fn advance(&self, secs: i64) {
            *self.0.lock().unwrap() += Duration::seconds(secs);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn cache_for(server: &MockServer, clock: Arc<ManualClock>) -> TokenCache {
        let config = TokenCacheConfig::new("id", "secret")
            .token_url(format!("{}/api/token", server.uri()));
        TokenCache::with_clock(Client::new(), config, clock)
    }

    #[test]
    fn test_credential_margin() {
        let now = Utc::now();
        let credential = Credential {
            token: "t".into(),
            expires_at: now + Duration::seconds(11),
        };
        assert!(credential.is_fresh(now, Duration::seconds(10)));
        assert!(!credential.is_fresh(now + Duration::seconds(1), Duration::seconds(10)));
    }

    #[tokio::test]
    async fn test_token_is_reused_within_validity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            // base64("id:secret")
            .and(header("authorization", "Basic aWQ6c2VjcmV0"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-1",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let clock = ManualClock::new();
        let cache = cache_for(&server, clock.clone());

        assert_eq!(cache.get_token().await.unwrap(), "tok-1");
        clock.advance(3000);
        assert_eq!(cache.get_token().await.unwrap(), "tok-1");
        assert_eq!(cache.exchange_count(), 1);
    }

    #[tokio::test]
    async fn test_token_refreshed_inside_margin() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok",
                "expires_in": 60
            })))
            .expect(2)
            .mount(&server)
            .await;

        let clock = ManualClock::new();
        let cache = cache_for(&server, clock.clone());

        cache.get_token().await.unwrap();
        clock.advance(49);
        cache.get_token().await.unwrap();
        assert_eq!(cache.exchange_count(), 1);

        clock.advance(2);
        cache.get_token().await.unwrap();
        assert_eq!(cache.exchange_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_expires_in_defaults_to_an_hour() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "tok"})),
            )
            .mount(&server)
            .await;

        let clock = ManualClock::new();
        let cache = cache_for(&server, clock.clone());
        cache.get_token().await.unwrap();

        let credential = cache.credential().unwrap();
        assert_eq!(credential.expires_at - clock.now(), Duration::seconds(3600));
    }

    #[tokio::test]
    async fn test_rejected_exchange_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let cache = cache_for(&server, ManualClock::new());
        match cache.get_token().await {
            Err(CatalogError::Auth { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid_client");
            }
            other => panic!("expected auth error, got {:?}", other),
        }
        assert!(cache.credential().is_none());
    }

    #[tokio::test]
    async fn test_empty_credentials_fail_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = TokenCacheConfig::new("", "")
            .token_url(format!("{}/api/token", server.uri()));
        let cache = TokenCache::new(Client::new(), config);

        assert!(matches!(
            cache.get_token().await,
            Err(CatalogError::MissingCredentials)
        ));
        assert_eq!(cache.exchange_count(), 0);
    }
}
