//! Error types for the session log engine

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by logger construction and by the bulk retention operations.
///
/// Per-entry failures inside archive and prune passes are not errors; they end
/// up in the operation's report instead.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read log directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read creation time of {path}: {source}")]
    BirthTime {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not a log archive")]
    NotAnArchive(PathBuf),

    #[error("key-value store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, LogError>;
