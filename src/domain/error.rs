//! Domain-level error types for quote-sync.
//!
//! All errors are typed with `thiserror` and provide meaningful context
//! without exposing internal details to end users.

use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// User input rejected before any state change.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Persisted data under a storage key could not be decoded.
    #[error("Invalid persisted data under '{key}': {message}")]
    PersistenceRead { key: String, message: String },

    /// Import payload is not a valid array of quotes.
    #[error("Import failed: {message}")]
    ImportParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Failed to open or query the database.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON serialization failed.
    #[error("JSON parse error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a database error from rusqlite error.
    pub fn database(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Create a JSON parse error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an import error from a JSON failure.
    pub fn import_parse(err: serde_json::Error) -> Self {
        Self::ImportParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }
}

/// Failures at the remote boundary.
///
/// These never escape the sync coordinator; they are folded into a failed
/// `SyncOutcome` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Transport failure (DNS, connect, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// Remote answered with a non-success status.
    #[error("Remote returned HTTP {0}")]
    Status(u16),

    /// Response body is not a list of title-bearing records.
    #[error("Malformed remote payload: {0}")]
    Malformed(String),
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
