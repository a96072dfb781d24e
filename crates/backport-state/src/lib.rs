//! Backport-State: persisted run state for backport triage
//!
//! Every run reads and writes a handful of named JSON documents: the user
//! directory, the upstream and downstream issue snapshots, the commit
//! records of the previous run (the confirmation oracle) and the report.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: durable, atomic writes and typed access to the documents.
//!
//! ## Key Components
//!
//! - `StateStore`: byte-level document store trait
//! - `FsStateStore`: one pretty-printed JSON file per document
//! - `fakes::MemoryStateStore`: in-memory store for tests

mod error;
pub mod fakes;
pub mod fs;
pub mod storage_traits;

pub use error::StateError;
pub use fs::FsStateStore;
pub use storage_traits::{load_document, store_document, StateDocument, StateResult, StateStore};
