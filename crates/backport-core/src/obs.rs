//! Structured observability hooks for triage run lifecycle events.
//!
//! - Run-scoped tracing spans via [`run_span`] and the [`RunSpan`] RAII guard
//! - Emission functions for run start/finish, per-commit outcomes and task
//!   execution
//!
//! Events are emitted at `info!` level; the state flush error is a warning.

use tracing::info;

use crate::domain::{CommitState, TaskState, TaskType};

/// Span tagging everything logged during one run with its run id.
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("backport.run", run_id = %run_id)
}

/// RAII guard that enters the run span for synchronous sections.
///
/// ```ignore
/// let _span = RunSpan::enter("run-12345");
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(run_id: &str) -> Self {
        Self {
            _span: run_span(run_id).entered(),
        }
    }
}

/// Emit event: run started for a candidate release.
pub fn emit_run_started(run_id: &str, candidate: &str, upstream_commits: usize) {
    info!(
        event = "run.started",
        run_id = %run_id,
        candidate = %candidate,
        upstream_commits = upstream_commits,
    );
}

/// Emit event: one upstream commit triaged.
pub fn emit_commit_processed(commit_id: &str, state: CommitState, tasks: usize) {
    info!(
        event = "commit.processed",
        commit = %commit_id,
        state = %state,
        tasks = tasks,
    );
}

/// Emit event: a task left the executor.
pub fn emit_task_executed(task_type: TaskType, key: &str, state: TaskState) {
    info!(
        event = "task.executed",
        task_type = %task_type,
        key = %key,
        state = ?state,
    );
}

/// Emit event: run finished.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, total_commits: u64, success: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        total_commits = total_commits,
        success = success,
    );
}

/// Emit event: persisting run state failed (warning level).
pub fn emit_run_flush_error(run_id: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "run.flush_error", run_id = %run_id, error = %error);
}
