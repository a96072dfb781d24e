//! Error taxonomy for backport triage.
//!
//! Business outcomes never show up here: they are recorded as a state and
//! reason on the commit record. These errors abort a run.

use backport_state::StateError;
use issue_tracker::TrackerError;

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("git error: {0}")]
    Git(String),

    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("invalid release version: {0}")]
    InvalidRelease(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("invalid task {task}: {reason}")]
    InvalidTask { task: String, reason: String },

    #[error("test runner error: {0}")]
    TestRunner(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for triage operations.
pub type Result<T> = std::result::Result<T, TriageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triage_error_display() {
        let err = TriageError::Git("not a repository".to_string());
        assert!(err.to_string().contains("git error"));

        let err = TriageError::InvalidRelease("Future GA".to_string());
        assert!(err.to_string().contains("Future GA"));
    }

    #[test]
    fn test_tracker_error_converts() {
        let err: TriageError = TrackerError::IncompleteLoad {
            loaded: 3,
            total: 4,
        }
        .into();
        assert!(matches!(err, TriageError::Tracker(_)));
        assert!(err.to_string().contains("3 of 4"));
    }
}
