//! Error types for catch-thread

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for catch-thread
#[derive(Debug, Error)]
pub enum CatchThreadError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Feed not found
    #[error("Feed not found: {0}")]
    FeedNotFound(String),

    /// Comment not found
    #[error("Comment not found: {0}")]
    CommentNotFound(String),

    /// A comment with this id is already part of the feed
    #[error("Duplicate comment: {0}")]
    DuplicateComment(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Unsupported schema version
    #[error("Unsupported schema version: {0}")]
    UnsupportedSchemaVersion(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CatchThreadError>,
    },
}

impl CatchThreadError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CatchThreadError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<toml::de::Error> for CatchThreadError {
    fn from(err: toml::de::Error) -> Self {
        CatchThreadError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for CatchThreadError {
    fn from(err: toml::ser::Error) -> Self {
        CatchThreadError::Toml(err.to_string())
    }
}

/// Result type alias for catch-thread
pub type Result<T> = std::result::Result<T, CatchThreadError>;
