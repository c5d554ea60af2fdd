//! Error types for the check-in pipeline.

use carewatch_protocol::ObservationId;
use carewatch_store::StorageError;
use std::time::Duration;
use thiserror::Error;

/// Longest provider error text kept on an assessment or in a log line.
pub const MAX_ERROR_CHARS: usize = 200;

/// Field-level problems found in a client payload. Every problem is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", messages.join("; "))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

impl ValidationError {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }
}

/// Failures talking to, or understanding, the reasoning provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider timed out after {0:?}")]
    Timeout(Duration),
    /// Transport, rate limit or server-side failure.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("provider returned an empty response")]
    Empty,
    /// Response was not valid JSON for the expected shape.
    #[error("malformed provider response: {0}")]
    Malformed(String),
    /// Response parsed but broke the closed schema.
    #[error("provider contract violation: {0}")]
    ContractViolation(String),
}

/// Errors surfaced by [`crate::CheckinService`].
#[derive(Debug, Error)]
pub enum CheckinError {
    #[error("invalid check-in: {0}")]
    Validation(#[from] ValidationError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("check-in not found: {0}")]
    NotFound(ObservationId),
    /// The observation was saved but its assessment could not be.
    #[error("check-in {observation_id} was saved but its assessment was not: {source}")]
    Enrichment {
        observation_id: ObservationId,
        source: StorageError,
    },
}

/// Cut `message` down to [`MAX_ERROR_CHARS`] characters.
pub(crate) fn truncate_message(message: &str) -> String {
    message.chars().take(MAX_ERROR_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn validation_error_lists_every_message() {
        let err = ValidationError::new(vec![
            "Missing required field: date".to_string(),
            "Missing required field: mood".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing required field: date; Missing required field: mood"
        );
    }

    #[test]
    fn long_messages_are_truncated() {
        let long = "x".repeat(500);
        assert_eq!(truncate_message(&long).chars().count(), MAX_ERROR_CHARS);
        assert_eq!(truncate_message("short"), "short");
    }
}
