//! Typed errors for the pipeline library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can map
//! each failure kind to their own surface (HTTP status, tool error, ...).

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A referenced collection does not exist
    #[error("collection not found: {name}")]
    NotFound { name: String },

    /// The text-generation backend could not produce valid output
    #[error("generation error: {0}")]
    Generation(String),

    /// The collection or task store is unreachable or rejected an operation
    #[error("storage error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The request is malformed (empty inputs, duplicate names, bad items)
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Research task id is unknown (never existed or already purged)
    #[error("research task not found: {id}")]
    TaskNotFound { id: Uuid },

    /// The research backend refused or failed to start a task
    #[error("research backend error: {0}")]
    Research(String),

    /// Content could not be fetched or decoded during ingestion
    #[error("ingest error: {0}")]
    Ingest(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Shorthand for a missing collection.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Shorthand for a rejected request.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Wrap any backend error as a storage failure.
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store(Box::new(err))
    }

    /// Storage failure from a plain message.
    pub fn store_msg(msg: impl Into<String>) -> Self {
        Self::Store(msg.into().into())
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PipelineError::not_found("reviews").to_string(),
            "collection not found: reviews"
        );
        assert_eq!(
            PipelineError::invalid("no inputs").to_string(),
            "invalid request: no inputs"
        );
        assert_eq!(
            PipelineError::store_msg("connection refused").to_string(),
            "storage error: connection refused"
        );
    }
}
