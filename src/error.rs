//! Error taxonomy for the resolution pipeline
//!
//! Every failure site maps to exactly one [`ErrorKind`], so callers and tests
//! can match on the kind instead of the message text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Diagnostic, DiagnosticKind};

/// Resolution error types
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream returned HTTP {status} for {url}")]
    Remote { status: u16, url: String },

    #[error("Unexpected response shape: {0}")]
    Decode(String),

    #[error("Playlist unreachable: {0}")]
    Format(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No playable video sources found ({} diagnostics)", .diagnostics.len())]
    NoPlayableSource { diagnostics: Vec<Diagnostic> },
}

/// Discriminant of [`ResolveError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Remote,
    Decode,
    Format,
    NotFound,
    NoPlayableSource,
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::Network(_) => ErrorKind::Network,
            ResolveError::Remote { .. } => ErrorKind::Remote,
            ResolveError::Decode(_) => ErrorKind::Decode,
            ResolveError::Format(_) => ErrorKind::Format,
            ResolveError::NotFound(_) => ErrorKind::NotFound,
            ResolveError::NoPlayableSource { .. } => ErrorKind::NoPlayableSource,
        }
    }

    /// Diagnostic kind used when this error is recorded instead of propagated
    pub fn diagnostic_kind(&self) -> DiagnosticKind {
        match self {
            ResolveError::Network(_) => DiagnosticKind::Network,
            ResolveError::Remote { .. } => DiagnosticKind::Remote,
            ResolveError::Decode(_) => DiagnosticKind::Decode,
            ResolveError::Format(_) => DiagnosticKind::Format,
            ResolveError::NotFound(_) | ResolveError::NoPlayableSource { .. } => {
                DiagnosticKind::EmptySource
            }
        }
    }

    /// Record this error as a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.diagnostic_kind(), self.to_string())
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ResolveError::Remote {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None if err.is_decode() => ResolveError::Decode(err.to_string()),
            None => ResolveError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        ResolveError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
