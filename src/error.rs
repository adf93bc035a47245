// src/error.rs
// Error types shared by the stopwatch, its format parser and config loader.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = StopwatchError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StopwatchError {
    /// Creating the log directory, or opening/writing the log file, failed.
    #[error("log file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write timing message: {0}")]
    Stdout(#[source] io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("could not read stopwatch config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reasons a printf-style elapsed format can be rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("format spec {0:?} has no conversion for the elapsed seconds")]
    MissingConversion(String),

    #[error("format spec {0:?} has more than one conversion")]
    TooManyConversions(String),

    #[error("format spec {0:?} ends in an incomplete conversion")]
    Incomplete(String),

    #[error("unsupported format character {found:?} in {spec:?}")]
    UnsupportedConversion { spec: String, found: char },
}

impl StopwatchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StopwatchError::Io { path: path.into(), source }
    }
}
