//! Error types for issue-tracker

use thiserror::Error;

/// Errors that can occur while talking to an issue tracker
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Transport-level failure (connection, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The tracker answered with a non-success status
    #[error("Tracker request {method} {path} failed with status {status}: {body}")]
    Status {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A payload field was missing or had an unexpected shape
    #[error("Invalid field '{field}' on issue {key}")]
    InvalidField { key: String, field: String },

    /// A tracker enumeration value is not known (issue type, status, priority)
    #[error("Unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },

    /// Issue not found
    #[error("Issue not found: {0}")]
    IssueNotFound(String),

    /// No workflow transition leads to the next required status
    #[error("No transition from {from} towards {to} for issue {key}")]
    TransitionUnavailable {
        key: String,
        from: String,
        to: String,
    },

    /// Bulk load fetched a different number of issues than reported
    #[error("Error loading issues: fetched {loaded} of {total}")]
    IncompleteLoad { loaded: usize, total: usize },

    /// A bulk-load worker panicked or was cancelled
    #[error("Bulk load worker failed: {0}")]
    Worker(String),
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        TrackerError::Http(err.to_string())
    }
}

/// Result type for tracker operations
pub type TrackerResult<T> = std::result::Result<T, TrackerError>;
