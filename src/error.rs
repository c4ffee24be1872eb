//! Error taxonomy for index builds.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::IndexError;

/// Fatal failures that abort a build before any output is written.
///
/// Per-record problems (unparseable lines, missing keys, bad vectors) never
/// surface here; they are folded into the `skipped` tally instead.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Root data path missing or blank.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The vectors dataset produced no records at all.
    #[error("no vectors found in {}", path.display())]
    MissingInput {
        /// Vectors dataset that was read.
        path: PathBuf,
    },

    /// Input was present but nothing usable could be indexed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Filesystem failure on a specific path.
    #[error("failed to access '{}': {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Sidecar JSON could not be encoded or decoded.
    #[error("failed to process sidecar '{}': {source}", path.display())]
    Sidecar {
        /// Sidecar path.
        path: PathBuf,
        /// Underlying serde error.
        source: serde_json::Error,
    },

    /// Index engine failure.
    #[error(transparent)]
    Index(#[from] IndexError),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used across the library.
pub type BuildResult<T> = Result<T, BuildError>;
