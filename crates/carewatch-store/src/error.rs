//! Error types for store operations.

use carewatch_protocol::ObservationId;

/// Errors returned by observation and profile stores.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Backend could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Update targeted a document that does not exist.
    #[error("observation not found: {0}")]
    NotFound(ObservationId),
}

impl StorageError {
    /// Whether a read that failed this way is worth repeating.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Io(_) | StorageError::Unavailable(_))
    }
}
