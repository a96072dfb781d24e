//! Commit triage.
//!
//! - [`classify`] - pure decisions: issue key extraction, grouping, release
//!   selection, worthiness and consistency checks
//! - [`engine`] - `TriageEngine`, which applies a decision through the
//!   task executor

pub mod classify;
pub mod engine;

pub use classify::{classify, Disposition, Triage, TriageInput};
pub use engine::TriageEngine;
