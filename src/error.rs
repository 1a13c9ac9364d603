//! Custom error types for pocket-ledger
//!
//! Every store operation returns one of these kinds. The caller (CLI or any
//! other front-end) decides how each kind is presented to the user.

use thiserror::Error;

/// The main error type for pocket-ledger operations
#[derive(Error, Debug)]
pub enum PocketError {
    /// The lock guarding a backing file could not be obtained in time
    #[error("Lock unavailable for {resource}: {reason}")]
    LockUnavailable { resource: String, reason: String },

    /// A row does not match its table schema
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Validation errors for caller input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Storage errors with file context
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// CSV encoding/decoding errors
    #[error("CSV error: {0}")]
    Csv(String),
}

impl PocketError {
    /// Create a "lock unavailable" error for a lock resource
    pub fn lock_unavailable(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LockUnavailable {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Create a "malformed row" error
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            line,
            reason: reason.into(),
        }
    }

    /// Create a "not found" error for tasks
    pub fn task_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Task",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a lock timeout
    pub fn is_lock_unavailable(&self) -> bool {
        matches!(self, Self::LockUnavailable { .. })
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a malformed row error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedRow { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for PocketError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PocketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for PocketError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type alias for pocket-ledger operations
pub type PocketResult<T> = Result<T, PocketError>;
