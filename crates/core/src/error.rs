//! Error types for docqa.
//!
//! This module defines a unified error enum covering every failure category
//! in the application: configuration, storage, the two external services
//! (embeddings and chat completion), and the vector-index lifecycle.

use thiserror::Error;

/// Unified error type for docqa.
///
/// All fallible functions return `Result<T, AppError>`. The indexing path
/// surfaces these to the caller; the retrieval path catches them and
/// degrades to an empty context instead of failing the chat turn.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Read/write failure for a persisted artifact, including corrupt state
    #[error("Storage error: {0}")]
    Storage(String),

    /// Embedding service call failure or malformed response
    #[error("Embedding service error: {0}")]
    Embedding(String),

    /// Chat completion service errors
    #[error("Chat completion error: {0}")]
    Chat(String),

    /// Heterogeneous vector lengths within a single batch
    #[error("inconsistent embedding lengths in batch: expected {expected}, found {found}")]
    InconsistentEmbeddingLength { expected: usize, found: usize },

    /// Persisted index dimension does not match the current batch
    #[error("index dimension mismatch: stored {stored}, requested {requested}")]
    DimensionMismatch { stored: usize, requested: usize },

    /// Vectors were added before the index was trained
    #[error("index must be trained before vectors are added")]
    UntrainedIndex,

    /// Search was attempted with no persisted index on disk
    #[error("no persisted index exists yet")]
    IndexUnavailable,

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
