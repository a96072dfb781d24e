//! Domain models for backport triage.
//!
//! Canonical definitions for the core entities:
//! - `ReleaseVersion`: ordered release identifiers
//! - `Commit`: triage outcome of one upstream commit
//! - `CommitTask`: remediation action attached to a commit
//! - `User`: identity mapping across git and trackers

pub mod commit;
pub mod error;
pub mod release;
pub mod task;
pub mod user;

pub use commit::{Commit, CommitReason, CommitState};
pub use error::{Result, TriageError};
pub use release::ReleaseVersion;
pub use task::{CommitTask, TaskRequest, TaskState, TaskType};
pub use user::User;
