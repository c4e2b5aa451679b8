//! # jingleplayer - Lecture d'ambiance saisonnière
//!
//! Cette crate fournit la partie lecteur de JingleBox :
//! - la file de lecture aléatoire sans répétition immédiate ([`ShuffleQueue`]) ;
//! - le contrôleur de lecture, piloté par événements ([`PlaybackController`]) ;
//! - l'intégration aux contrôles multimédia du système ([`MediaSession`]) ;
//! - les préférences persistées, volume et saison ([`PreferenceStore`]) ;
//! - le chargement des morceaux d'une saison depuis le serveur ([`SeasonLoader`]).
//!
//! ## Structure des modules
//!
//! ```text
//! jingleplayer/
//! ├── src/
//! │   ├── lib.rs              # Module principal (ce fichier)
//! │   ├── queue.rs            # File de lecture aléatoire
//! │   ├── controller.rs       # Machine à états de lecture
//! │   ├── media_session.rs    # Contrôles multimédia du système
//! │   ├── display.rs          # Libellés affichés
//! │   ├── feed.rs             # Client HTTP et changement de saison
//! │   ├── preferences.rs      # Volume et saison persistés
//! │   ├── config_ext.rs       # Clés player.* de jingleconfig
//! │   └── error.rs            # Gestion des erreurs
//! ```
//!
//! ## Utilisation
//!
//! ```rust,ignore
//! use jinglecatalog::Season;
//! use jingleplayer::{NoMediaSession, PlaybackController, PlayerEvent, SeasonLoader, TrackFeed};
//!
//! let loader = SeasonLoader::new(TrackFeed::new("http://localhost:8080")?);
//! let loaded = loader.load(Season::Halloween).await?;
//!
//! let mut player = PlaybackController::new(audio, NoMediaSession);
//! player.load_tracks(loaded.season, loaded.tracks);
//! player.handle(PlayerEvent::MetadataLoaded { duration: 184.0 });
//! ```

pub mod config_ext;
pub mod controller;
pub mod display;
pub mod error;
pub mod feed;
pub mod media_session;
pub mod preferences;
pub mod queue;

pub use config_ext::PlayerConfigExt;
pub use controller::{
    AudioOutput, Playable, PlaybackController, PlaybackState, PlayerEvent, PlayerStatus,
};
pub use display::format_time;
pub use error::{PlayerError, Result};
pub use feed::{LoadTicket, SeasonLoader, SeasonTracks, TrackFeed};
pub use media_session::{MediaAction, MediaMetadata, MediaSession, NoMediaSession};
pub use preferences::{ConfigPreferences, MemoryPreferences, PreferenceStore};
pub use queue::ShuffleQueue;
