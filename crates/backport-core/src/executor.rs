//! Task executor.
//!
//! Owns every side effect of a run: cherry-picks against the downstream
//! branch and mutations of the downstream tracker. It also owns the issue
//! registry and the cherry-pick index and keeps both in step with what it
//! changes, so later commits see the new state.

use std::sync::Arc;

use chrono::Utc;
use issue_tracker::{IssueState, IssueTracker, NewIssue};
use tracing::{info, warn};

use crate::cherry_pick::{CherryPickIndex, CherryPickRecord};
use crate::config::{TriageConfig, UPSTREAM_TEST_COVERAGE_LABEL};
use crate::domain::error::{Result, TriageError};
use crate::domain::{CommitReason, CommitTask, ReleaseVersion, TaskRequest, TaskState, TaskType};
use crate::git::{GitRepository, Identity};
use crate::metrics::METRICS;
use crate::obs::emit_task_executed;
use crate::registry::IssueRegistry;
use crate::test_gate::TestRunner;

/// Per-commit facts a task needs.
#[derive(Debug, Clone, Copy)]
pub struct TaskContext<'a> {
    /// Effective release of the commit.
    pub release: &'a ReleaseVersion,
    pub release_name: &'a str,
    pub tests: &'a [String],
    /// Username recorded on each task.
    pub assignee: Option<&'a str>,
    /// Downstream tracker username for issues created from upstream issues.
    pub downstream_assignee: Option<&'a str>,
}

pub struct TaskExecutor {
    git: Arc<dyn GitRepository>,
    downstream: Arc<dyn IssueTracker>,
    test_runner: Option<Arc<dyn TestRunner>>,
    registry: IssueRegistry,
    index: CherryPickIndex,
    config: TriageConfig,
}

impl TaskExecutor {
    pub fn new(
        git: Arc<dyn GitRepository>,
        downstream: Arc<dyn IssueTracker>,
        registry: IssueRegistry,
        index: CherryPickIndex,
        config: TriageConfig,
    ) -> Self {
        Self {
            git,
            downstream,
            test_runner: None,
            registry,
            index,
            config,
        }
    }

    /// Gate cherry-picks of commits with tests on `runner`.
    pub fn with_test_runner(mut self, runner: Arc<dyn TestRunner>) -> Self {
        self.test_runner = Some(runner);
        self
    }

    pub fn git(&self) -> &dyn GitRepository {
        self.git.as_ref()
    }

    pub fn registry(&self) -> &IssueRegistry {
        &self.registry
    }

    pub fn index(&self) -> &CherryPickIndex {
        &self.index
    }

    pub fn into_parts(self) -> (IssueRegistry, CherryPickIndex) {
        (self.registry, self.index)
    }

    /// Record `request` and perform it when allowed.
    ///
    /// Cherry-picks are always attempted. Other tasks run only when a task
    /// with the same type, key and value appears in `confirmed`.
    pub async fn execute(
        &mut self,
        request: TaskRequest,
        ctx: &TaskContext<'_>,
        confirmed: &[CommitTask],
    ) -> Result<CommitTask> {
        let mut task = CommitTask::unconfirmed(request, ctx.assignee.map(str::to_string));

        if task.task_type == TaskType::CherryPickUpstreamCommit {
            self.cherry_pick(&mut task, ctx)?;
        } else if confirmed.iter().any(|c| c.matches(&task)) {
            if self.config.scratch {
                task.state = TaskState::Scratched;
            } else {
                self.apply(&mut task, ctx).await?;
            }
        }

        if task.is_executed() {
            METRICS.inc_tasks_executed();
        }
        emit_task_executed(task.task_type, &task.key, task.state);
        Ok(task)
    }

    fn cherry_pick(&mut self, task: &mut CommitTask, ctx: &TaskContext<'_>) -> Result<()> {
        let upstream = self.git.resolve_commit(&task.key)?;

        if !self.git.cherry_pick(&upstream)? {
            warn!(commit = %upstream.id, "cherry-pick failed");
            self.git.reset_hard()?;
            METRICS.inc_cherry_picks_failed();
            task.state = TaskState::Failed;
            task.result = Some(CommitReason::CherryPickFailed.as_str().to_string());
            return Ok(());
        }

        if !self.config.skip_commit_test && !ctx.tests.is_empty() {
            if let Some(runner) = &self.test_runner {
                let passed = self.reset_on_error(runner.run_tests(ctx.tests))?;
                if !passed {
                    warn!(commit = %upstream.id, tests = ctx.tests.len(), "commit tests failed");
                    self.git.reset_hard()?;
                    task.state = TaskState::Failed;
                    return Ok(());
                }
            }
        }

        if self.config.scratch {
            self.git.reset_hard()?;
            task.state = TaskState::Scratched;
            return Ok(());
        }

        let message = format!(
            "{}\n(cherry picked from commit {})\n\ndownstream: {}",
            upstream.full_message,
            upstream.id,
            task.value.as_deref().unwrap_or_default()
        );
        let committer = Identity::new(
            &self.config.committer_name,
            &self.config.committer_email,
            Utc::now().fixed_offset(),
        );
        let picked = self.reset_on_error(self.git.commit(&message, &upstream.author, &committer))?;
        self.git.push(&self.config.push_remote)?;

        info!(upstream = %upstream.id, downstream = %picked.id, "cherry-picked");
        self.index.insert(
            &upstream.id,
            CherryPickRecord {
                release: ctx.release.clone(),
                downstream_commit: picked.id.clone(),
            },
        );
        task.state = TaskState::Executed;
        task.result = Some(picked.id);
        Ok(())
    }

    /// Hard-reset the working branch before propagating `result`'s error.
    fn reset_on_error<T>(&self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            if let Err(e) = self.git.reset_hard() {
                warn!(error = %e, "reset after failed cherry-pick step failed");
            }
        }
        result
    }

    async fn apply(&mut self, task: &mut CommitTask, ctx: &TaskContext<'_>) -> Result<()> {
        let key = task.key.clone();

        match task.task_type {
            TaskType::SetDownstreamIssueTargetRelease => {
                let release = required_value(task)?;
                self.downstream.set_target_release(&key, &release).await?;
                if let Some(issue) = self.registry.downstream_issue_mut(&key) {
                    issue.target_release = Some(release);
                }
            }
            TaskType::AddDownstreamIssueLabel => {
                let label = required_value(task)?;
                self.downstream
                    .add_labels(&key, std::slice::from_ref(&label))
                    .await?;
                if let Some(issue) = self.registry.downstream_issue_mut(&key) {
                    issue.add_label(&label);
                }
            }
            TaskType::TransitionDownstreamIssue => {
                let state = required_value(task)?
                    .parse::<IssueState>()
                    .map_err(|e| TriageError::InvalidTask {
                        task: task.task_type.to_string(),
                        reason: e.to_string(),
                    })?;
                self.downstream.transition_issue(&key, state).await?;
                if let Some(issue) = self.registry.downstream_issue_mut(&key) {
                    issue.state = state;
                }
            }
            TaskType::CloneDownstreamIssue => {
                let Some(created) = self.clone_downstream_issue(&key, ctx).await? else {
                    task.state = TaskState::Failed;
                    return Ok(());
                };
                task.result = Some(created);
            }
            TaskType::CloneUpstreamIssue => {
                let Some(created) = self.clone_upstream_issue(&key, ctx).await? else {
                    task.state = TaskState::Failed;
                    return Ok(());
                };
                task.result = Some(created);
            }
            TaskType::CherryPickUpstreamCommit => {
                return Err(TriageError::InvalidTask {
                    task: task.task_type.to_string(),
                    reason: "cherry-picks are not confirmed tasks".to_string(),
                });
            }
        }

        task.state = TaskState::Executed;
        Ok(())
    }

    /// Clone a downstream issue into the current release. `None` when the
    /// source cannot be cloned.
    async fn clone_downstream_issue(
        &mut self,
        key: &str,
        ctx: &TaskContext<'_>,
    ) -> Result<Option<String>> {
        let Some(source) = self.registry.downstream_issue(key).cloned() else {
            warn!(issue = %key, "downstream issue to clone not found");
            return Ok(None);
        };
        let upstream_key = match self.registry.upstream_keys_for(key) {
            [upstream_key] => upstream_key.clone(),
            links => {
                warn!(
                    issue = %key,
                    upstream_links = links.len(),
                    "invalid number of upstream issues to clone"
                );
                return Ok(None);
            }
        };

        let new_issue = NewIssue {
            summary: format!("{} {}", ctx.release.summary_prefix(), source.summary),
            description: source.description.clone(),
            issue_type: source.issue_type,
            assignee: source.assignee.clone(),
            upstream_issue: upstream_key.clone(),
            target_release: ctx.release_name.to_string(),
            labels: source
                .labels
                .iter()
                .filter(|l| !is_qualifier_label(l))
                .cloned()
                .collect(),
        };

        let created = self.downstream.clone_issue(key, &new_issue).await?;
        info!(source = %key, clone = %created.key, "downstream issue cloned");

        let created_key = created.key.clone();
        self.registry.put_downstream(created);
        self.registry.link(&upstream_key, &created_key);
        Ok(Some(created_key))
    }

    /// Create a downstream issue tracking an upstream issue. `None` when the
    /// upstream issue is unknown.
    async fn clone_upstream_issue(
        &mut self,
        key: &str,
        ctx: &TaskContext<'_>,
    ) -> Result<Option<String>> {
        let Some(source) = self.registry.upstream_issue(key).cloned() else {
            warn!(issue = %key, "upstream issue to clone not found");
            return Ok(None);
        };

        let mut labels = vec![ctx.release.qualifier().to_string()];
        if !ctx.tests.is_empty() {
            labels.push(UPSTREAM_TEST_COVERAGE_LABEL.to_string());
        }

        let new_issue = NewIssue {
            summary: source.summary.clone(),
            description: source.description.clone(),
            issue_type: source.issue_type,
            assignee: ctx.downstream_assignee.map(str::to_string),
            upstream_issue: format!(
                "{}/{}",
                self.config.upstream_browse_url.trim_end_matches('/'),
                key
            ),
            target_release: ctx.release_name.to_string(),
            labels,
        };

        let created = self.downstream.create_issue(&new_issue).await?;
        info!(upstream = %key, downstream = %created.key, "downstream issue created");

        let created_key = created.key.clone();
        self.registry.put_downstream(created);
        self.registry.link(key, &created_key);
        Ok(Some(created_key))
    }
}

fn required_value(task: &CommitTask) -> Result<String> {
    task.value.clone().ok_or_else(|| TriageError::InvalidTask {
        task: task.task_type.to_string(),
        reason: format!("missing value for {}", task.key),
    })
}

/// Labels such as `CR1` that name a release candidate.
fn is_qualifier_label(label: &str) -> bool {
    label
        .strip_prefix("CR")
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}
