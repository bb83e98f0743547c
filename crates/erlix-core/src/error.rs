use crate::types::Location;
use std::path::PathBuf;

/// Unified error type for erlix.
#[derive(Debug, thiserror::Error)]
pub enum ErlixError {
    #[error("File not found in any search root: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read '{}': {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {location}: {reason}")]
    Parse { location: Location, reason: String },

    #[error("Failed to commit {location}: {reason}")]
    Commit { location: Location, reason: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
