//! Error types shared across the crate

use crate::tree::NodeId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplorerError {
    /// The path exists but cannot be listed (permissions, offline drive, ...)
    #[error("cannot access path: {}", .0.display())]
    Inaccessible(PathBuf),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Ancestor hop `depth` (1-based) could not be matched while revealing a path
    #[error("directory not found at level {depth}: {segment}")]
    RevealFailed { depth: usize, segment: String },

    #[error("unknown tree node {0:?}")]
    UnknownNode(NodeId),
}

impl ExplorerError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ExplorerError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
