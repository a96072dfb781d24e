//! One triage run over the upstream commits missing downstream.
//!
//! Loads the user directory and the issue snapshots (bulk-loading and
//! storing them when absent), builds the registry and the cherry-pick index,
//! walks the upstream commits oldest first and finally persists commits,
//! snapshots and the report. State is flushed even when the walk aborts.

use std::sync::Arc;
use std::time::Instant;

use backport_state::{load_document, store_document, StateDocument, StateStore};
use issue_tracker::{Issue, IssueTracker};
use tracing::{info, warn, Instrument};

use crate::assignee::{AssigneeResolver, UserResolver};
use crate::cherry_pick::CherryPickIndex;
use crate::config::{Confirmations, TriageConfig};
use crate::domain::error::Result;
use crate::domain::{Commit, User};
use crate::executor::TaskExecutor;
use crate::git::{GitCommit, GitRepository};
use crate::metrics::METRICS;
use crate::obs::{emit_run_finished, emit_run_flush_error, emit_run_started, run_span};
use crate::registry::IssueRegistry;
use crate::report::Report;
use crate::test_gate::TestRunner;
use crate::triage::TriageEngine;

/// Summary prefix of upstream merge commits, which are never triaged.
pub const MERGE_COMMIT_PREFIX: &str = "Merge pull request";

/// External systems a run talks to.
pub struct Collaborators {
    pub git: Arc<dyn GitRepository>,
    pub upstream: Arc<dyn IssueTracker>,
    pub downstream: Arc<dyn IssueTracker>,
    pub test_runner: Option<Arc<dyn TestRunner>>,
    pub state: Arc<dyn StateStore>,
}

/// Inputs of a run besides its collaborators.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub config: TriageConfig,
    pub default_assignee: String,
    /// Ref of the upstream branch, e.g. `upstream/main`.
    pub upstream_ref: String,
    /// Ref of the downstream branch, e.g. `origin/7.11`.
    pub downstream_ref: String,
    pub confirmations: Confirmations,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: String,
    /// Every commit record in processing order.
    pub commits: Vec<Commit>,
    pub report: Report,
}

/// Upstream commits to triage, oldest first, without merge commits.
pub fn upstream_commits(
    git: &dyn GitRepository,
    upstream_ref: &str,
    downstream_ref: &str,
) -> Result<Vec<GitCommit>> {
    let mut commits: Vec<GitCommit> = git
        .log(upstream_ref, downstream_ref)?
        .into_iter()
        .filter(|c| !c.short_message.starts_with(MERGE_COMMIT_PREFIX))
        .collect();
    commits.reverse();
    Ok(commits)
}

pub async fn run(collaborators: &Collaborators, settings: RunSettings) -> Result<RunOutcome> {
    let run_id = uuid::Uuid::new_v4().to_string();
    let span = run_span(&run_id);
    execute_run(collaborators, settings, run_id).instrument(span).await
}

async fn execute_run(
    collaborators: &Collaborators,
    settings: RunSettings,
    run_id: String,
) -> Result<RunOutcome> {
    let started = Instant::now();
    let state = collaborators.state.as_ref();
    let git = collaborators.git.as_ref();
    let RunSettings {
        config,
        default_assignee,
        upstream_ref,
        downstream_ref,
        confirmations,
    } = settings;

    let users: Vec<User> = load_document(state, StateDocument::Users)
        .await?
        .unwrap_or_else(|| {
            warn!("no user directory, every commit goes to the default assignee");
            Vec::new()
        });
    let users = Arc::new(UserResolver::new(users));

    let upstream_issues = load_issues(
        state,
        StateDocument::UpstreamIssues,
        collaborators.upstream.as_ref(),
    )
    .await?;
    let downstream_issues = load_issues(
        state,
        StateDocument::DownstreamIssues,
        collaborators.downstream.as_ref(),
    )
    .await?;
    let registry = IssueRegistry::from_snapshots(upstream_issues, downstream_issues);
    info!(
        upstream = registry.upstream_len(),
        downstream = registry.downstream_len(),
        "issue registry ready"
    );

    let upstream_commits = upstream_commits(git, &upstream_ref, &downstream_ref)?;
    let downstream_log = git.log(&downstream_ref, &upstream_ref)?;
    let index = CherryPickIndex::build(
        &downstream_log,
        &upstream_commits,
        &config.candidate,
        config.legacy_release_prefix.as_deref(),
    );

    emit_run_started(&run_id, &config.candidate.to_string(), upstream_commits.len());

    let mut executor = TaskExecutor::new(
        Arc::clone(&collaborators.git),
        Arc::clone(&collaborators.downstream),
        registry,
        index,
        config.clone(),
    );
    if let Some(runner) = &collaborators.test_runner {
        executor = executor.with_test_runner(Arc::clone(runner));
    }
    let assignees = AssigneeResolver::new(users, &default_assignee);
    let mut engine = TriageEngine::new(config.clone(), assignees, confirmations, executor)?;

    let mut commits = Vec::with_capacity(upstream_commits.len());
    let mut walk = Ok(());
    for upstream in &upstream_commits {
        match engine.process(upstream).await {
            Ok(commit) => commits.push(commit),
            Err(e) => {
                warn!(commit = %upstream.short_id(), error = %e, "run aborted");
                walk = Err(e);
                break;
            }
        }
    }

    let report = Report::build(&commits, &config.candidate);
    let flushed = flush(state, &commits, engine.executor().registry(), &report).await;

    METRICS.flush();
    emit_run_finished(
        &run_id,
        started.elapsed().as_millis() as u64,
        commits.len() as u64,
        walk.is_ok() && flushed.is_ok(),
    );

    match (walk, flushed) {
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(flush_error)) => {
            emit_run_flush_error(&run_id, &flush_error);
            Err(e)
        }
        (Ok(()), Err(flush_error)) => {
            emit_run_flush_error(&run_id, &flush_error);
            Err(flush_error)
        }
        (Ok(()), Ok(())) => Ok(RunOutcome {
            run_id,
            commits,
            report,
        }),
    }
}

/// Snapshot from the store, or a bulk load from the tracker stored for the
/// next run.
async fn load_issues(
    state: &dyn StateStore,
    document: StateDocument,
    tracker: &dyn IssueTracker,
) -> Result<Vec<Issue>> {
    if let Some(issues) = load_document::<Vec<Issue>>(state, document).await? {
        info!(document = %document, issues = issues.len(), "issue snapshot loaded");
        return Ok(issues);
    }

    info!(project = %tracker.project_key(), "no issue snapshot, loading from tracker");
    let issues = tracker.load_project_issues().await?;
    store_document(state, document, &issues).await?;
    Ok(issues)
}

async fn flush(
    state: &dyn StateStore,
    commits: &[Commit],
    registry: &IssueRegistry,
    report: &Report,
) -> Result<()> {
    let persisted: Vec<&Commit> = commits.iter().filter(|c| c.is_persisted()).collect();
    store_document(state, StateDocument::Commits, &persisted).await?;
    store_document(state, StateDocument::UpstreamIssues, &registry.upstream_snapshot()).await?;
    store_document(
        state,
        StateDocument::DownstreamIssues,
        &registry.downstream_snapshot(),
    )
    .await?;
    store_document(state, StateDocument::Report, report).await?;
    info!(
        commits = persisted.len(),
        completed = report.completed.len(),
        attention = report.attention.len(),
        "run state flushed"
    );
    Ok(())
}
