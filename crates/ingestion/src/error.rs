//! Ingestion error types

use std::path::PathBuf;

use thiserror::Error;

/// Loader-specific errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// File could not be read
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Primary recording is not valid JSON of a known layout
    #[error("failed to parse recording '{path}': {source}")]
    Recording {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Event log line is not a valid record
    #[error("invalid event record at {path}:{line}: {source}")]
    EventRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Descriptor CSV could not be read
    #[error("invalid descriptor: {0}")]
    Descriptor(#[from] csv::Error),

    /// Recording parts disagree or are malformed
    #[error("recording '{path}' is malformed: {message}")]
    Shape { path: PathBuf, message: String },

    /// No file name to derive a session from
    #[error("cannot derive session name from '{0}'")]
    SessionName(PathBuf),

    /// Contract violation in loaded data
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),
}

impl IngestionError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn shape(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Shape {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestionError>;
