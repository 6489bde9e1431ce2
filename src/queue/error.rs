//! Queue Error Types
//!
//! Defines error types specific to the queue system operations.

use thiserror::Error;

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Errors that can occur during queue operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueueError {
    /// Positional access outside the valid range of a container
    #[error("Index {index} out of bounds for container of {count} items")]
    IndexOutOfBounds { index: usize, count: usize },

    /// Configuration values rejected by validation
    #[error("Invalid queue configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration text could not be parsed or rendered
    #[error("Queue configuration error: {0}")]
    Config(String),
}

impl QueueError {
    /// Create an index out of bounds error
    pub fn index_out_of_bounds(index: usize, count: usize) -> Self {
        Self::IndexOutOfBounds { index, count }
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}
