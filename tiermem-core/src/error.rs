//! Error types for tiermem-core.

use std::sync::Arc;

use thiserror::Error;

/// Result type alias using tiermem-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for schema and embedding operations
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("embedding error: {message}")]
    Embedding { message: String },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("serialization error: {0}")]
    Serialization(Arc<serde_json::Error>),
}

impl Error {
    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn is_embedding(&self) -> bool {
        matches!(self, Self::Embedding { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(Arc::new(err))
    }
}
