//! The commit triage engine.
//!
//! Walks one upstream commit at a time: screens it, classifies it against
//! the registry, then asks the executor for every task the disposition
//! requires and folds the task outcomes into the commit's final state.

use issue_tracker::Issue;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::assignee::AssigneeResolver;
use crate::config::{Confirmations, TriageConfig};
use crate::domain::error::{Result, TriageError};
use crate::domain::{
    Commit, CommitReason, CommitState, CommitTask, TaskRequest, TaskState, TaskType,
};
use crate::executor::{TaskContext, TaskExecutor};
use crate::git::GitCommit;
use crate::metrics::METRICS;
use crate::obs::emit_commit_processed;
use crate::triage::classify::{
    classify, commit_tests, consistency_tasks, extract_issue_keys, screen, Disposition, Triage,
    TriageInput,
};

pub struct TriageEngine {
    config: TriageConfig,
    pattern: Regex,
    assignees: AssigneeResolver,
    confirmations: Confirmations,
    executor: TaskExecutor,
}

impl TriageEngine {
    pub fn new(
        config: TriageConfig,
        assignees: AssigneeResolver,
        confirmations: Confirmations,
        executor: TaskExecutor,
    ) -> Result<Self> {
        let pattern = Regex::new(&config.upstream_issue_pattern).map_err(|e| {
            TriageError::InvalidPattern(format!("{}: {e}", config.upstream_issue_pattern))
        })?;
        Ok(Self {
            config,
            pattern,
            assignees,
            confirmations,
            executor,
        })
    }

    pub fn executor(&self) -> &TaskExecutor {
        &self.executor
    }

    pub fn into_executor(self) -> TaskExecutor {
        self.executor
    }

    /// Triage one upstream commit.
    ///
    /// Business outcomes land in the returned record; only collaborator
    /// failures are errors.
    pub async fn process(&mut self, upstream: &GitCommit) -> Result<Commit> {
        info!(commit = %upstream.short_id(), summary = %upstream.short_message, "processing");
        METRICS.inc_commits_processed();

        let mut commit = Commit::new(&upstream.id, &upstream.short_message);
        let keys = extract_issue_keys(&self.pattern, &upstream.short_message);
        let upstream_key = keys.first().cloned();
        let cherry_picked = self.executor.index().get(&upstream.id).cloned();
        commit.upstream_issue = upstream_key.clone();

        let upstream_found = upstream_key
            .as_deref()
            .is_some_and(|k| self.executor.registry().upstream_issue(k).is_some());
        if let Some((state, reason)) =
            screen(&keys, upstream_found, cherry_picked.is_some(), &self.config)
        {
            info!(commit = %upstream.short_id(), %state, %reason, "commit screened out");
            commit.state = state;
            commit.reason = Some(reason);
            emit_commit_processed(&commit.upstream_commit, commit.state, 0);
            return Ok(commit);
        }

        commit.author = Some(upstream.author.name.clone());
        commit.downstream_commit = cherry_picked.as_ref().map(|r| r.downstream_commit.clone());
        let files = self.executor.git().changed_files(upstream)?;
        commit.tests = commit_tests(&files, &self.config);

        let (triage, assignee) = {
            let registry = self.executor.registry();
            let upstream_issue = upstream_key.as_deref().and_then(|k| registry.upstream_issue(k));

            let mut linked: Vec<&Issue> = Vec::new();
            if let Some(issue) = upstream_issue {
                for key in registry.downstream_keys_for(&issue.key) {
                    match registry.downstream_issue(key) {
                        Some(downstream) => linked.push(downstream),
                        None => warn!(issue = %key, "downstream issue not found"),
                    }
                }
            }

            let input = TriageInput {
                summary: &upstream.short_message,
                upstream_issue,
                downstream_issues: linked,
                cherry_picked_release: cherry_picked.as_ref().map(|r| &r.release),
                confirmed_upstream_issues: self.confirmations.upstream_issues.as_ref(),
                confirmed_downstream_issues: self.confirmations.downstream_issues.as_ref(),
            };
            let triage = classify(&input, &self.config);

            let selected: Vec<&Issue> = triage
                .selected
                .iter()
                .filter_map(|k| registry.downstream_issue(k))
                .collect();
            let assignee = self
                .assignees
                .resolve(upstream, upstream_issue, &selected)
                .clone();
            (triage, assignee)
        };
        debug!(disposition = ?triage.disposition, selected = ?triage.selected, "classified");

        commit.release_version = Some(triage.release.to_string());
        commit.downstream_issues = triage.downstream_issues.clone();
        commit.assignee = Some(assignee.username.clone());

        let tests = commit.tests.clone();
        let ctx = TaskContext {
            release: &triage.release,
            release_name: &triage.release_name,
            tests: &tests,
            assignee: Some(&assignee.username),
            downstream_assignee: assignee.downstream_username.as_deref(),
        };

        let Self {
            config,
            confirmations,
            executor,
            ..
        } = self;
        let mut run = TaskRun {
            executor,
            confirmed: confirmations.tasks_for(&upstream.id),
            tasks: Vec::new(),
        };

        let (state, reason) = match &triage.disposition {
            Disposition::Settled { state, reason } => (*state, *reason),
            Disposition::CheckDownstreamIssues => {
                if run.check_downstream_issues(&triage, &ctx, config).await? {
                    (CommitState::Done, None)
                } else {
                    (CommitState::Incomplete, None)
                }
            }
            Disposition::CloneDownstreamIssues { otherwise } => {
                let mut executed = true;
                for key in &triage.selected {
                    let request = TaskRequest::new(TaskType::CloneDownstreamIssue, key, None);
                    executed &= run.run(request, &ctx).await? == TaskState::Executed;
                }
                if executed {
                    (CommitState::Done, None)
                } else {
                    warn!(commit = %upstream.short_id(), "no downstream issues with the required target release");
                    (
                        *otherwise,
                        Some(CommitReason::NoDownstreamIssuesWithRequiredTargetRelease),
                    )
                }
            }
            Disposition::CherryPick { check_after } => {
                let request = TaskRequest::new(
                    TaskType::CherryPickUpstreamCommit,
                    &upstream.id,
                    Some(triage.selected.join(",")),
                );
                match run.run(request, &ctx).await? {
                    TaskState::Executed => {
                        commit.downstream_commit = run
                            .executor
                            .index()
                            .get(&upstream.id)
                            .map(|r| r.downstream_commit.clone());
                        if !*check_after || run.check_downstream_issues(&triage, &ctx, config).await? {
                            (CommitState::Done, None)
                        } else {
                            (CommitState::Incomplete, None)
                        }
                    }
                    TaskState::Failed => (CommitState::Todo, Some(CommitReason::CherryPickFailed)),
                    _ => (CommitState::Todo, None),
                }
            }
            Disposition::CloneUpstreamIssue => {
                if let Some(key) = &commit.upstream_issue {
                    let request = TaskRequest::new(TaskType::CloneUpstreamIssue, key, None);
                    run.run(request, &ctx).await?;
                }
                (CommitState::Blocked, None)
            }
        };

        commit.state = state;
        commit.reason = reason;
        commit.tasks = run.tasks;

        info!(
            commit = %upstream.short_id(),
            state = %commit.state,
            reason = ?commit.reason,
            tasks = commit.tasks.len(),
            "commit triaged"
        );
        emit_commit_processed(&commit.upstream_commit, commit.state, commit.tasks.len());
        Ok(commit)
    }
}

/// Tasks of one commit in discovery order.
struct TaskRun<'a> {
    executor: &'a mut TaskExecutor,
    confirmed: &'a [CommitTask],
    tasks: Vec<CommitTask>,
}

impl TaskRun<'_> {
    async fn run(&mut self, request: TaskRequest, ctx: &TaskContext<'_>) -> Result<TaskState> {
        let task = self.executor.execute(request, ctx, self.confirmed).await?;
        let state = task.state;
        self.tasks.push(task);
        Ok(state)
    }

    /// True when every consistency task spawned for the selected issues
    /// executed.
    async fn check_downstream_issues(
        &mut self,
        triage: &Triage,
        ctx: &TaskContext<'_>,
        config: &TriageConfig,
    ) -> Result<bool> {
        let mut executed = true;
        for key in &triage.selected {
            let requests = match self.executor.registry().downstream_issue(key) {
                Some(issue) => consistency_tasks(
                    issue,
                    &triage.release_name,
                    triage.qualifier(),
                    !ctx.tests.is_empty(),
                    config,
                ),
                None => continue,
            };
            for request in requests {
                executed &= self.run(request, ctx).await? == TaskState::Executed;
            }
        }
        Ok(executed)
    }
}
