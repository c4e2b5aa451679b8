//! Contrôleur de lecture
//!
//! Le contrôleur possède l'unique sortie audio et la file de lecture. Il
//! évolue uniquement en réponse à des [`PlayerEvent`] : événements de la
//! sortie audio (métadonnées chargées, progression, fin, erreur, issue d'une
//! demande de lecture) et actions de l'utilisateur.
//!
//! ```text
//!            load_tracks / Ended / Error
//!   Idle ──────────────────────────────► Loading
//!                                          │  metadata + play confirmed
//!                     TogglePlay           ▼
//!   Paused ◄─────────────────────────── Playing
//!     │                                    │
//!     └── TogglePlay ──► Loading           │ PlayRejected
//!                                          ▼
//!                     UserGesture       Blocked
//!   Loading ◄──────────────────────────────┘
//! ```
//!
//! Une fin de morceau et une erreur de lecture sont traitées de la même
//! façon : la file avance et le contrôleur repasse en `Loading`. En pause ou
//! bloqué, le nouveau morceau est chargé sans être lancé et l'état est conservé.

use anyhow::Result;
use jinglecatalog::{BareTrack, EnrichedTrack, Season};
use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config_ext::DEFAULT_VOLUME;
use crate::display::{BLOCKED_HINT, LOADING_LABEL};
use crate::media_session::{MediaAction, MediaSession, clamp_position, season_metadata};
use crate::preferences::PreferenceStore;
use crate::queue::ShuffleQueue;

/// Morceau lisible par le contrôleur
pub trait Playable {
    fn title(&self) -> &str;

    /// URL de lecture, absente pour un enregistrement incomplet
    fn source_url(&self) -> Option<&str>;
}

impl Playable for BareTrack {
    fn title(&self) -> &str {
        &self.title
    }

    fn source_url(&self) -> Option<&str> {
        Some(&self.url)
    }
}

impl Playable for EnrichedTrack {
    fn title(&self) -> &str {
        EnrichedTrack::title(self)
    }

    fn source_url(&self) -> Option<&str> {
        self.url()
    }
}

/// Sortie audio pilotée par le contrôleur
///
/// `play` ne fait que demander la lecture : son issue revient sous forme de
/// [`PlayerEvent::PlaySucceeded`] ou [`PlayerEvent::PlayRejected`]. Une
/// erreur renvoyée directement par `play` vaut refus.
pub trait AudioOutput {
    fn load(&mut self, url: &str) -> Result<()>;
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn set_volume(&mut self, volume: f64) -> Result<()>;
    fn seek(&mut self, seconds: f64) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Idle,
    Loading,
    Playing,
    Paused,
    /// Lecture refusée par la politique d'autoplay, en attente d'un geste
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    pub current_track_index: Option<usize>,
    /// Position affichée ; pendant un déplacement, la valeur saisie
    pub position_seconds: f64,
    pub duration_seconds: f64,
    /// Intention de lecture de l'utilisateur
    pub is_playing: bool,
    pub is_seeking: bool,
    pub volume: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_track_index: None,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            is_playing: true,
            is_seeking: false,
            volume: DEFAULT_VOLUME,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    MetadataLoaded { duration: f64 },
    TimeUpdate { position: f64 },
    PlaySucceeded,
    PlayRejected(String),
    Ended,
    Error(String),
    /// Premier geste de l'utilisateur après un refus d'autoplay
    UserGesture,
    TogglePlay,
    SetVolume(f64),
    SeekStart,
    SeekInput(f64),
    SeekCommit,
    MediaAction(MediaAction),
}

pub struct PlaybackController<T, A, M, R = StdRng>
where
    T: Playable,
    A: AudioOutput,
    M: MediaSession,
    R: Rng,
{
    tracks: Vec<T>,
    season: Season,
    queue: ShuffleQueue<R>,
    audio: A,
    media: M,
    preferences: Option<Arc<dyn PreferenceStore>>,
    status: PlayerStatus,
    state: PlaybackState,
    metadata_loaded: bool,
    play_confirmed: bool,
}

impl<T, A, M> PlaybackController<T, A, M, StdRng>
where
    T: Playable,
    A: AudioOutput,
    M: MediaSession,
{
    pub fn new(audio: A, media: M) -> Self {
        Self::with_queue(audio, media, ShuffleQueue::new())
    }
}

impl<T, A, M, R> PlaybackController<T, A, M, R>
where
    T: Playable,
    A: AudioOutput,
    M: MediaSession,
    R: Rng,
{
    pub fn with_queue(mut audio: A, media: M, queue: ShuffleQueue<R>) -> Self {
        let state = PlaybackState::default();
        if let Err(e) = audio.set_volume(state.volume) {
            warn!("Cannot set initial volume: {}", e);
        }
        Self {
            tracks: Vec::new(),
            season: Season::default(),
            queue,
            audio,
            media,
            preferences: None,
            status: PlayerStatus::Idle,
            state,
            metadata_loaded: false,
            play_confirmed: false,
        }
    }

    /// Associe un stockage de préférences et applique le volume enregistré
    pub fn with_preferences(mut self, preferences: Arc<dyn PreferenceStore>) -> Self {
        self.state.volume = preferences.volume();
        if let Err(e) = self.audio.set_volume(self.state.volume) {
            warn!("Cannot set stored volume: {}", e);
        }
        self.preferences = Some(preferences);
        self
    }

    /// Remplace la liste de morceaux et reconstruit la file
    ///
    /// La saison est enregistrée dans les préférences.
    pub fn load_tracks(&mut self, season: Season, tracks: Vec<T>) {
        info!(season = %season, count = tracks.len(), "Loading track list");
        self.season = season;
        self.tracks = tracks;
        if let Some(prefs) = &self.preferences {
            prefs.set_season(season);
        }

        match self.queue.start(self.tracks.len()) {
            Some(index) => self.enter_loading(index),
            None => {
                self.enter_idle();
                self.publish_media();
            }
        }
    }

    pub fn handle(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::MetadataLoaded { duration } => {
                self.state.duration_seconds = if duration.is_finite() && duration > 0.0 {
                    duration
                } else {
                    0.0
                };
                self.metadata_loaded = true;
                self.publish_media();
                self.settle();
            }
            PlayerEvent::TimeUpdate { position } => {
                if !self.state.is_seeking && position.is_finite() {
                    self.state.position_seconds = position;
                }
            }
            PlayerEvent::PlaySucceeded => {
                if self.status == PlayerStatus::Loading {
                    self.play_confirmed = true;
                    self.settle();
                }
            }
            PlayerEvent::PlayRejected(reason) => {
                if matches!(self.status, PlayerStatus::Loading | PlayerStatus::Playing) {
                    self.block(&reason);
                }
            }
            PlayerEvent::Ended => {
                debug!("Track ended");
                self.advance();
            }
            PlayerEvent::Error(reason) => {
                warn!(
                    track = self.current_track().map(|t| t.title()).unwrap_or(""),
                    "Playback error, skipping: {}", reason
                );
                self.advance();
            }
            PlayerEvent::UserGesture => {
                if self.status == PlayerStatus::Blocked {
                    self.resume();
                }
            }
            PlayerEvent::TogglePlay => self.toggle(),
            PlayerEvent::SetVolume(volume) => self.set_volume(volume),
            PlayerEvent::SeekStart => {
                self.state.is_seeking = true;
            }
            PlayerEvent::SeekInput(position) => {
                self.state.is_seeking = true;
                self.state.position_seconds =
                    clamp_position(position, self.state.duration_seconds);
            }
            PlayerEvent::SeekCommit => {
                if self.state.is_seeking {
                    self.state.is_seeking = false;
                    self.seek_audio(self.state.position_seconds);
                }
            }
            PlayerEvent::MediaAction(action) => {
                let target = action.target(
                    self.state.position_seconds,
                    self.state.duration_seconds,
                );
                self.state.position_seconds = target;
                self.seek_audio(target);
            }
        }
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn tracks(&self) -> &[T] {
        &self.tracks
    }

    pub fn current_track(&self) -> Option<&T> {
        self.state
            .current_track_index
            .and_then(|i| self.tracks.get(i))
    }

    pub fn queue(&self) -> &ShuffleQueue<R> {
        &self.queue
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// Titre du morceau courant, ou le libellé de chargement
    pub fn now_playing_label(&self) -> &str {
        self.current_track()
            .map(|t| t.title())
            .unwrap_or(LOADING_LABEL)
    }

    pub fn blocked_hint(&self) -> Option<&'static str> {
        (self.status == PlayerStatus::Blocked).then_some(BLOCKED_HINT)
    }

    // ============ Transitions ============

    fn enter_idle(&mut self) {
        self.status = PlayerStatus::Idle;
        self.state.current_track_index = None;
        self.state.position_seconds = 0.0;
        self.state.duration_seconds = 0.0;
        self.state.is_seeking = false;
        self.metadata_loaded = false;
        self.play_confirmed = false;
    }

    fn enter_loading(&mut self, index: usize) {
        self.status = if self.state.is_playing {
            PlayerStatus::Loading
        } else if self.status == PlayerStatus::Blocked {
            PlayerStatus::Blocked
        } else {
            PlayerStatus::Paused
        };
        self.state.current_track_index = Some(index);
        self.state.position_seconds = 0.0;
        self.state.duration_seconds = 0.0;
        self.state.is_seeking = false;
        self.metadata_loaded = false;
        self.play_confirmed = false;

        let url = self
            .tracks
            .get(index)
            .and_then(|t| t.source_url())
            .map(str::to_string);
        match url {
            Some(url) => {
                debug!(index, url = %url, "Loading track");
                if let Err(e) = self.audio.load(&url) {
                    warn!("Cannot load {}: {}", url, e);
                }
            }
            None => warn!(index, "Track has no playback URL"),
        }

        self.publish_media();
        if self.state.is_playing {
            self.request_play();
        }
    }

    fn advance(&mut self) {
        match self.queue.advance() {
            Some(index) => self.enter_loading(index),
            None => self.enter_idle(),
        }
    }

    /// `Loading → Playing` une fois les métadonnées et la lecture confirmées
    fn settle(&mut self) {
        if self.status == PlayerStatus::Loading && self.metadata_loaded && self.play_confirmed {
            self.status = PlayerStatus::Playing;
            self.state.is_playing = true;
        }
    }

    fn request_play(&mut self) {
        self.play_confirmed = false;
        if let Err(e) = self.audio.play() {
            self.block(&e.to_string());
        }
    }

    fn block(&mut self, reason: &str) {
        debug!("Autoplay blocked: {}", reason);
        self.status = PlayerStatus::Blocked;
        self.state.is_playing = false;
        self.play_confirmed = false;
    }

    fn resume(&mut self) {
        self.state.is_playing = true;
        self.status = PlayerStatus::Loading;
        self.request_play();
    }

    fn toggle(&mut self) {
        match self.status {
            PlayerStatus::Playing | PlayerStatus::Loading if self.state.is_playing => {
                if let Err(e) = self.audio.pause() {
                    warn!("Cannot pause: {}", e);
                }
                self.state.is_playing = false;
                self.play_confirmed = false;
                self.status = PlayerStatus::Paused;
            }
            PlayerStatus::Paused | PlayerStatus::Blocked => self.resume(),
            _ => {}
        }
    }

    fn set_volume(&mut self, volume: f64) {
        if !volume.is_finite() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.state.volume = volume;
        if let Err(e) = self.audio.set_volume(volume) {
            warn!("Cannot set volume: {}", e);
        }
        if let Some(prefs) = &self.preferences {
            prefs.set_volume(volume);
        }
    }

    fn seek_audio(&mut self, seconds: f64) {
        if let Err(e) = self.audio.seek(seconds) {
            warn!("Cannot seek to {}: {}", seconds, e);
        }
    }

    /// Publie le morceau courant dans les contrôles du système
    ///
    /// Un refus de l'hôte est ignoré.
    fn publish_media(&mut self) {
        let title = self.current_track().map(|t| t.title());
        let metadata = season_metadata(self.season, title);

        if let Err(e) = self.media.set_metadata(&metadata) {
            debug!("Media session metadata ignored: {}", e);
        }
        if let Err(e) = self
            .media
            .register_actions(&MediaAction::SUPPORTED, self.state.duration_seconds)
        {
            debug!("Media session actions ignored: {}", e);
        }
    }
}
