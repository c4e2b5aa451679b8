//! Gestion des erreurs du lecteur

use thiserror::Error;

/// Erreurs du lecteur
///
/// Les erreurs de lecture audio ne figurent pas ici : elles font avancer la
/// file comme une fin de morceau.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Le serveur n'a pas fourni de liste exploitable
    #[error("{0}")]
    Feed(String),

    /// Chargement abandonné au profit d'un changement de saison
    #[error("Load cancelled by a newer season request")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl PlayerError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PlayerError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;
