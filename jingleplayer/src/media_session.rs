//! Intégration aux contrôles multimédia du système hôte
//!
//! Le contrôleur publie le titre du morceau et des libellés dérivés de la
//! saison, et déclare les actions de déplacement qu'il sait traiter. Un hôte
//! sans cette capacité renvoie une erreur que le contrôleur ignore.

use anyhow::Result;
use jinglecatalog::Season;

/// Pas des actions « avancer » et « reculer »
pub const SEEK_STEP_SECONDS: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
}

/// Métadonnées publiées pour un morceau de la saison
///
/// Sans titre, le libellé générique de la saison est utilisé.
///
/// ```
/// use jinglecatalog::Season;
/// use jingleplayer::media_session::season_metadata;
///
/// let meta = season_metadata(Season::Halloween, None);
/// assert_eq!(meta.title, "Spooky Mix");
/// assert_eq!(meta.album, "Halloween");
/// ```
pub fn season_metadata(season: Season, title: Option<&str>) -> MediaMetadata {
    let (fallback, artist, album) = match season {
        Season::Christmas => ("Merry Christmas", "Holiday Mix", "Ambient Xmas"),
        Season::Halloween => ("Spooky Mix", "Autumn Vibes", "Halloween"),
    };
    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(fallback);

    MediaMetadata {
        title: title.to_string(),
        artist: artist.to_string(),
        album: album.to_string(),
    }
}

/// Action de transport reçue depuis les contrôles du système
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaAction {
    SeekTo(f64),
    SeekForward,
    SeekBackward,
}

impl MediaAction {
    pub const SUPPORTED: [&'static str; 3] = ["seekto", "seekforward", "seekbackward"];

    /// Position cible, bornée à `[0, duration]`
    pub fn target(&self, position: f64, duration: f64) -> f64 {
        let wanted = match self {
            MediaAction::SeekTo(t) => *t,
            MediaAction::SeekForward => position + SEEK_STEP_SECONDS,
            MediaAction::SeekBackward => position - SEEK_STEP_SECONDS,
        };
        clamp_position(wanted, duration)
    }
}

/// Borne une position à `[0, duration]` ; une valeur non finie donne 0
pub fn clamp_position(seconds: f64, duration: f64) -> f64 {
    let upper = if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    };
    if seconds.is_finite() {
        seconds.clamp(0.0, upper)
    } else {
        0.0
    }
}

/// Contrôles multimédia du système hôte
pub trait MediaSession {
    fn set_metadata(&mut self, metadata: &MediaMetadata) -> Result<()>;

    /// Déclare les actions traitées ; la durée sert à borner les déplacements
    fn register_actions(&mut self, actions: &[&str], duration: f64) -> Result<()>;
}

/// Hôte sans contrôles multimédia
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMediaSession;

impl MediaSession for NoMediaSession {
    fn set_metadata(&mut self, _metadata: &MediaMetadata) -> Result<()> {
        Ok(())
    }

    fn register_actions(&mut self, _actions: &[&str], _duration: f64) -> Result<()> {
        Ok(())
    }
}
