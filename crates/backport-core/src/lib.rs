//! Backport Core: upstream commit triage for a downstream release branch
//!
//! Decides, for every upstream commit missing from the downstream branch,
//! whether it must be cherry-picked, whether a downstream tracking issue
//! must be cloned or created, and whether the tracking issues agree with
//! what was delivered.
//!
//! ## Layer 2 - Domain + Engine
//!
//! - `triage`: pure classification and the `TriageEngine`
//! - `executor`: the only writer of git, the downstream tracker, the issue
//!   registry and the cherry-pick index
//! - `run`: one end-to-end run with state persistence
//! - `git`, `test_gate`: collaborators behind traits, with CLI-backed
//!   defaults and in-memory fakes

pub mod assignee;
pub mod cherry_pick;
pub mod config;
pub mod domain;
pub mod executor;
pub mod fakes;
pub mod git;
pub mod metrics;
pub mod obs;
pub mod registry;
pub mod report;
pub mod run;
pub mod telemetry;
pub mod test_gate;
pub mod triage;

pub use assignee::{AssigneeResolver, UserResolver};
pub use cherry_pick::{CherryPickIndex, CherryPickRecord};
pub use config::{
    Confirmations, TriageConfig, NO_TESTING_NEEDED_LABEL, UPSTREAM_TEST_COVERAGE_LABEL,
};
pub use domain::{
    Commit, CommitReason, CommitState, CommitTask, ReleaseVersion, Result, TaskRequest, TaskState,
    TaskType, TriageError, User,
};
pub use executor::{TaskContext, TaskExecutor};
pub use git::{is_git_repo, CliGitRepository, GitCommit, GitRepository, Identity};
pub use registry::IssueRegistry;
pub use report::{Report, ReportEntry};
pub use run::{run, upstream_commits, Collaborators, RunOutcome, RunSettings};
pub use test_gate::{CommandTestRunner, TestRunner};
pub use triage::{classify, Disposition, Triage, TriageEngine, TriageInput};

pub use metrics::METRICS;
pub use obs::{
    emit_commit_processed, emit_run_finished, emit_run_flush_error, emit_run_started,
    emit_task_executed, run_span, RunSpan,
};
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
