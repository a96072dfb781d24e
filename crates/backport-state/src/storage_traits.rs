//! Storage trait definitions for backport triage state
//!
//! The store is a flat namespace of JSON documents identified by
//! [`StateDocument`]. Implementations only move bytes; the typed helpers
//! [`load_document`] and [`store_document`] handle (de)serialization so the
//! trait stays object-safe.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StateError;

/// Result type for storage operations
pub type StateResult<T> = std::result::Result<T, StateError>;

/// The documents persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateDocument {
    /// Known users and their identities in both trackers.
    Users,
    /// Snapshot of the upstream tracker project.
    UpstreamIssues,
    /// Snapshot of the downstream tracker project.
    DownstreamIssues,
    /// Commit records of the last run, reused as confirmations.
    Commits,
    /// Commits needing attention or newly completed.
    Report,
}

impl StateDocument {
    /// File name used by file-backed stores.
    pub fn file_name(&self) -> &'static str {
        match self {
            StateDocument::Users => "users.json",
            StateDocument::UpstreamIssues => "upstream-issues.json",
            StateDocument::DownstreamIssues => "downstream-issues.json",
            StateDocument::Commits => "commits.json",
            StateDocument::Report => "report.json",
        }
    }
}

impl std::fmt::Display for StateDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// Named document store.
///
/// Guarantees:
/// - `write(doc, data)` replaces the whole document atomically.
/// - `read(doc)` returns the exact bytes last written, or `None`.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read a document. Returns `Ok(None)` if it was never written.
    async fn read(&self, document: StateDocument) -> StateResult<Option<Vec<u8>>>;

    /// Replace a document.
    async fn write(&self, document: StateDocument, data: &[u8]) -> StateResult<()>;

    /// Check whether a document exists.
    async fn contains(&self, document: StateDocument) -> StateResult<bool>;
}

/// Load and deserialize a document, `None` if absent.
pub async fn load_document<T: DeserializeOwned>(
    store: &dyn StateStore,
    document: StateDocument,
) -> StateResult<Option<T>> {
    match store.read(document).await? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StateError::Deserialization {
                document: document.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Serialize (pretty-printed) and store a document.
pub async fn store_document<T: Serialize + ?Sized>(
    store: &dyn StateStore,
    document: StateDocument,
    value: &T,
) -> StateResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| StateError::Serialization {
        document: document.to_string(),
        reason: e.to_string(),
    })?;
    store.write(document, &bytes).await?;
    tracing::debug!(document = %document, bytes = bytes.len(), "state document stored");
    Ok(())
}
