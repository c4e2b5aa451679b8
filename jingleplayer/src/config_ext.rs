//! Extension pour intégrer les préférences du lecteur dans jingleconfig
//!
//! Clés du sous-arbre `player.*` :
//! - `player.volume` : volume entre 0 et 1 (0.12 par défaut)
//! - `player.season` : saison choisie (`christmas` par défaut)
//!
//! Une valeur absente, hors bornes ou mal formée donne la valeur par défaut.

use anyhow::Result;
use jingleconfig::Config;
use jinglecatalog::Season;
use serde_yaml::{Number, Value};

pub const DEFAULT_VOLUME: f64 = 0.12;

pub trait PlayerConfigExt {
    fn get_player_volume(&self) -> f64;

    /// Enregistre le volume, ramené dans `[0, 1]`
    fn set_player_volume(&self, volume: f64) -> Result<()>;

    fn get_player_season(&self) -> Season;

    fn set_player_season(&self, season: Season) -> Result<()>;
}

impl PlayerConfigExt for Config {
    fn get_player_volume(&self) -> f64 {
        let raw = match self.get_value(&["player", "volume"]) {
            Ok(Value::Number(n)) => n.as_f64(),
            Ok(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        sanitize_volume(raw)
    }

    fn set_player_volume(&self, volume: f64) -> Result<()> {
        let volume = sanitize_volume(Some(volume.clamp(0.0, 1.0)));
        self.set_value(&["player", "volume"], Value::Number(Number::from(volume)))
    }

    fn get_player_season(&self) -> Season {
        match self.get_value(&["player", "season"]) {
            Ok(Value::String(s)) => s.parse().unwrap_or_default(),
            _ => Season::default(),
        }
    }

    fn set_player_season(&self, season: Season) -> Result<()> {
        self.set_value(
            &["player", "season"],
            Value::String(season.as_str().to_string()),
        )
    }
}

/// Volume exploitable, la valeur par défaut sinon
pub fn sanitize_volume(raw: Option<f64>) -> f64 {
    match raw {
        Some(v) if v.is_finite() && (0.0..=1.0).contains(&v) => v,
        _ => DEFAULT_VOLUME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> (TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_defaults() {
        let (_dir, config) = config();
        assert_eq!(config.get_player_volume(), DEFAULT_VOLUME);
        assert_eq!(config.get_player_season(), Season::Christmas);
    }

    #[test]
    fn test_round_trip() {
        let (_dir, config) = config();
        config.set_player_volume(0.5).unwrap();
        config.set_player_season(Season::Halloween).unwrap();

        assert_eq!(config.get_player_volume(), 0.5);
        assert_eq!(config.get_player_season(), Season::Halloween);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let (_dir, config) = config();
        config
            .set_value(&["player", "volume"], Value::String("loud".into()))
            .unwrap();
        config
            .set_value(&["player", "season"], Value::String("easter".into()))
            .unwrap();

        assert_eq!(config.get_player_volume(), DEFAULT_VOLUME);
        assert_eq!(config.get_player_season(), Season::Christmas);

        config
            .set_value(&["player", "volume"], Value::Number(Number::from(7.5)))
            .unwrap();
        assert_eq!(config.get_player_volume(), DEFAULT_VOLUME);
    }

    #[test]
    fn test_volume_is_clamped_on_write() {
        let (_dir, config) = config();
        config.set_player_volume(3.0).unwrap();
        assert_eq!(config.get_player_volume(), 1.0);
    }
}
