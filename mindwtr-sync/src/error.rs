//! Error types for the sync layer.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network error talking to a remote target.
    #[error("network error: {0}")]
    Network(String),

    /// Local or remote storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored bytes are not a usable snapshot.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// The target rejected our credentials.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Sync configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}
