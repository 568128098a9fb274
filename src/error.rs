//! Custom error types for the pastificio backoffice
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for backoffice operations
#[derive(Error, Debug)]
pub enum PastificioError {
    /// Configuration-related errors (including a missing encryption secret)
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models and report windows
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// An archive payload could not be decoded after its inverse pipeline ran
    #[error("Corrupt archive '{filename}': {reason}")]
    CorruptArchive { filename: String, reason: String },

    /// The cipher stage of an archive failed (wrong or missing key, tampering)
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// Encryption errors while producing an archive
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl PastificioError {
    /// Create a "not found" error for orders
    pub fn order_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Order",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for backup archives
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Create a corrupt-archive error
    pub fn corrupt(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptArchive {
            filename: filename.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for PastificioError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PastificioError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for backoffice operations
pub type PastificioResult<T> = Result<T, PastificioError>;
