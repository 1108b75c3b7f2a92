//! Error types for the core crate.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Fetching the item failed.
    #[error("fetch failed: {0}")]
    Source(#[from] itemvault_source::SourceError),

    /// Archiving the item failed.
    #[error("archive failed: {0}")]
    Archive(#[from] itemvault_archive::ArchiveError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid JSON/JSONC syntax.
    #[error("invalid config at {path}: {message}")]
    InvalidJson { path: String, message: String },

    /// Environment variable not found during substitution.
    #[error("environment variable not found: {name}")]
    EnvVarNotFound { name: String },

    /// File reference not found during substitution.
    #[error("file reference not found: {path}")]
    FileRefNotFound { path: String },

    /// A required setting has no value in any source.
    #[error("missing setting: {name} (set it in itemvault.json, via {env}, or on the command line)")]
    Missing { name: String, env: String },
}
