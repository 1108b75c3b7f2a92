//! Archive error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors that can occur while staging, comparing or committing snapshots.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// IO error (write, read, rename or delete failed).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive directory structure could not be created.
    #[error("Cannot prepare archive directory {}: {source}", path.display())]
    Layout {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The item identifier cannot be used as a directory name.
    #[error("Invalid item ID: {0}")]
    InvalidItemId(String),
}

impl ArchiveError {
    /// Create a layout error for the given path.
    pub fn layout(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Layout {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid item ID error.
    pub fn invalid_item_id(message: impl Into<String>) -> Self {
        Self::InvalidItemId(message.into())
    }
}
