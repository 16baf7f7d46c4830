//! Error types for DocChat.
//!
//! One enum covers every failure category in the workspace. Collaborator
//! errors (retrieval, generation, classification) are produced here but are
//! converted into degraded-mode output by the answer pipeline before they
//! can reach a caller.

use thiserror::Error;

/// Unified error type for DocChat.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing credentials, bad config files)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generative collaborator errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Retrieval backend errors (timeouts, malformed payloads)
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Corpus indexing errors
    #[error("Index error: {0}")]
    Index(String),

    /// Prompt definition and rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Rejected caller input
    #[error("Invalid input: {0}")]
    Validation(String),

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
