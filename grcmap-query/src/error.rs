//! Error types for query compilation and execution.

use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while parsing filters or running query batches.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Filter text could not be parsed.
    #[error("parse error at {position}: {message}")]
    Parse { position: usize, message: String },

    /// The query execution service failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response does not line up with the submitted batch.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
