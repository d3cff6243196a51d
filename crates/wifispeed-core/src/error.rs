//! Error type shared by the library.
//!
//! Most sampling failures never surface as errors: the wireless sampler
//! degrades to blank fields and the orchestrator contains speed-test
//! failures. What remains here is what a caller has to act on.

use std::path::PathBuf;

/// Errors returned by `wifispeed-core`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not determine the home directory (HOME is not set)")]
    HomeDirUnavailable,

    #[error("speed-test service returned no servers")]
    NoServers,

    #[error("speed-test configuration is missing client information")]
    ClientInfo,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
