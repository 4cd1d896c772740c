//! Types d'erreurs pour le crate parcelles

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Erreurs pouvant survenir lors du chargement d'une collection de parcelles
#[derive(Debug, Error)]
pub enum LoadError {
    /// Erreur réseau (connexion refusée, délai dépassé, etc.)
    #[error("Transport error: {message}")]
    Transport { message: String, timed_out: bool },

    /// Réponse HTTP hors 2xx
    #[error("HTTP error: {status} - {reason}")]
    Status { status: u16, reason: String },

    /// Corps de réponse illisible ou sans tableau `features`
    #[error("Invalid feature collection: {0}")]
    Parse(String),

    /// Échec d'un lot pendant le chargement par lots
    #[error("Batch {page} failed: {source}")]
    Batch {
        page: usize,
        #[source]
        source: Box<LoadError>,
    },
}

fn transient_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)timed? ?out|too large|too long").ok())
        .as_ref()
}

impl LoadError {
    /// Crée une erreur de transport
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Crée une erreur de transport due à un délai dépassé
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: true,
        }
    }

    /// Crée une erreur de parsing
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Erreur liée à la taille ou à la durée de la requête.
    ///
    /// Une telle erreur déclenche le chargement par lots plutôt que le repli
    /// sur les données embarquées. Les erreurs de transport ne sont classées
    /// que par leur indicateur `timed_out`, jamais par leur texte (qui
    /// contient l'URL demandée).
    pub fn is_transient(&self) -> bool {
        let matches_text = |text: &str| transient_pattern().is_some_and(|re| re.is_match(text));
        match self {
            Self::Transport { timed_out, .. } => *timed_out,
            Self::Status { status, reason } => {
                matches!(status, 408 | 413 | 414 | 504) || matches_text(reason)
            }
            Self::Parse(message) => matches_text(message),
            Self::Batch { .. } => false,
        }
    }
}
