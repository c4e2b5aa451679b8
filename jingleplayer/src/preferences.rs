//! Préférences persistées du lecteur : volume et saison

use crate::config_ext::{PlayerConfigExt, sanitize_volume};
use jingleconfig::Config;
use jinglecatalog::Season;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

/// Stockage des préférences entre deux sessions
///
/// La lecture ne peut pas échouer : une valeur absente ou mal formée donne
/// la valeur par défaut. Un échec d'écriture est journalisé et ignoré.
pub trait PreferenceStore: Send + Sync {
    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);
    fn season(&self) -> Season;
    fn set_season(&self, season: Season);
}

/// Préférences enregistrées dans la configuration (`player.*`)
#[derive(Clone)]
pub struct ConfigPreferences {
    config: Arc<Config>,
}

impl ConfigPreferences {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn from_config() -> Self {
        Self::new(jingleconfig::get_config())
    }
}

impl PreferenceStore for ConfigPreferences {
    fn volume(&self) -> f64 {
        self.config.get_player_volume()
    }

    fn set_volume(&self, volume: f64) {
        if let Err(e) = self.config.set_player_volume(volume) {
            warn!("Cannot persist volume: {}", e);
        }
    }

    fn season(&self) -> Season {
        self.config.get_player_season()
    }

    fn set_season(&self, season: Season) {
        if let Err(e) = self.config.set_player_season(season) {
            warn!("Cannot persist season: {}", e);
        }
    }
}

/// Préférences en mémoire, perdues à la fin du processus
#[derive(Debug)]
pub struct MemoryPreferences {
    inner: Mutex<(f64, Season)>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new((sanitize_volume(None), Season::default())),
        }
    }
}

impl MemoryPreferences {
    fn lock(&self) -> MutexGuard<'_, (f64, Season)> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryPreferences {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn volume(&self) -> f64 {
        self.lock().0
    }

    fn set_volume(&self, volume: f64) {
        self.lock().0 = sanitize_volume(Some(volume.clamp(0.0, 1.0)));
    }

    fn season(&self) -> Season {
        self.lock().1
    }

    fn set_season(&self, season: Season) {
        self.lock().1 = season;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_defaults_and_updates() {
        let prefs = MemoryPreferences::new();
        assert_eq!(prefs.volume(), 0.12);
        assert_eq!(prefs.season(), Season::Christmas);

        prefs.set_volume(1.7);
        prefs.set_season(Season::Halloween);
        assert_eq!(prefs.volume(), 1.0);
        assert_eq!(prefs.season(), Season::Halloween);
    }

    #[test]
    fn test_config_preferences_persist() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(Config::load_config(dir.path().to_str().unwrap()).unwrap());
        let prefs = ConfigPreferences::new(config);

        prefs.set_volume(0.4);
        prefs.set_season(Season::Halloween);

        let reloaded = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(reloaded.get_player_volume(), 0.4);
        assert_eq!(reloaded.get_player_season(), Season::Halloween);
    }
}
