//! Error types for backport-state

use thiserror::Error;

/// Errors that can occur in the state persistence layer
#[derive(Error, Debug)]
pub enum StateError {
    /// Filesystem error
    #[error("State I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization failed for {document}: {reason}")]
    Serialization { document: String, reason: String },

    /// Deserialization error (malformed persisted JSON)
    #[error("Deserialization failed for {document}: {reason}")]
    Deserialization { document: String, reason: String },
}
