//! Memory Error Types
//!
//! Defines the error type shared by every tier, store and registry.
//! `MemoryError` is `Clone` so hooks can inspect, keep and re-emit errors.

use std::sync::Arc;

use thiserror::Error;

/// Memory Result type alias
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory subsystem errors
#[derive(Debug, Clone, Error)]
pub enum MemoryError {
    /// A core memory block write exceeded its character limit
    #[error("{block} block exceeds limit: {len} > {limit} characters")]
    LimitExceeded {
        block: String,
        len: usize,
        limit: usize,
    },

    /// `add` was called with differently sized document and embedding slices
    #[error("docs length {docs} does not match embeddings length {embeddings}")]
    LengthMismatch { docs: usize, embeddings: usize },

    /// A collaborator failed; `context` names the component and step
    #[error("{context}: {source}")]
    Dependency {
        context: String,
        #[source]
        source: Box<MemoryError>,
    },

    /// Error from the core crate (embedding, schema)
    #[error(transparent)]
    Core(#[from] tiermem_core::Error),

    /// Storage backend failure
    #[error("backend error: {message}")]
    Backend { message: String },

    /// No provider registered under the name
    #[error("unknown {kind} provider: {name}")]
    UnknownProvider { kind: String, name: String },

    /// Provider name already taken in a registry that rejects duplicates
    #[error("{kind} provider already registered: {name}")]
    DuplicateProvider { kind: String, name: String },

    /// Invalid operation
    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigValidationError),

    /// Database error
    #[cfg(feature = "sqlite")]
    #[error("database error: {0}")]
    Database(Arc<rusqlite::Error>),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(Arc<serde_json::Error>),

    /// Generic error
    #[error("{0}")]
    Other(Arc<anyhow::Error>),
}

impl MemoryError {
    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Wrap a collaborator error with component context
    pub fn dependency(context: impl Into<String>, source: impl Into<MemoryError>) -> Self {
        Self::Dependency {
            context: context.into(),
            source: Box::new(source.into()),
        }
    }

    /// Create an invalid operation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    pub fn unknown_provider(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownProvider {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn duplicate_provider(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateProvider {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Innermost error after unwrapping every `Dependency` layer
    pub fn root_cause(&self) -> &MemoryError {
        let mut current = self;
        while let Self::Dependency { source, .. } = current {
            current = source;
        }
        current
    }

    /// Check if this error is a limit violation
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(self, Self::LimitExceeded { .. })
    }

    /// Check if this error is an unknown provider lookup
    pub fn is_unknown_provider(&self) -> bool {
        matches!(self, Self::UnknownProvider { .. })
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for MemoryError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(Arc::new(err))
    }
}

impl From<serde_json::Error> for MemoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(Arc::new(err))
    }
}

impl From<anyhow::Error> for MemoryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(Arc::new(err))
    }
}
