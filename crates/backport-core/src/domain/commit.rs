//! Commit records produced by the triage engine.

use serde::{Deserialize, Serialize};

use crate::domain::task::{CommitTask, TaskState};

/// Disposition of an upstream commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitState {
    /// Needs a cherry-pick that did not happen.
    Todo,
    Done,
    /// Cherry-picked, tracking issues not consistent yet.
    Incomplete,
    /// Waiting for a release-tracking issue.
    Blocked,
    Skipped,
    Failed,
}

impl CommitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitState::Todo => "TODO",
            CommitState::Done => "DONE",
            CommitState::Incomplete => "INCOMPLETE",
            CommitState::Blocked => "BLOCKED",
            CommitState::Skipped => "SKIPPED",
            CommitState::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for CommitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a commit ended in its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitReason {
    NoUpstreamIssue,
    MultipleUpstreamIssues,
    UpstreamIssueNotFound,
    UpstreamIssueNotSufficient,
    DownstreamIssueNotSufficient,
    NoDownstreamIssues,
    NoDownstreamIssuesWithRequiredTargetRelease,
    CherryPickFailed,
}

impl CommitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitReason::NoUpstreamIssue => "NO_UPSTREAM_ISSUE",
            CommitReason::MultipleUpstreamIssues => "MULTIPLE_UPSTREAM_ISSUES",
            CommitReason::UpstreamIssueNotFound => "UPSTREAM_ISSUE_NOT_FOUND",
            CommitReason::UpstreamIssueNotSufficient => "UPSTREAM_ISSUE_NOT_SUFFICIENT",
            CommitReason::DownstreamIssueNotSufficient => "DOWNSTREAM_ISSUE_NOT_SUFFICIENT",
            CommitReason::NoDownstreamIssues => "NO_DOWNSTREAM_ISSUES",
            CommitReason::NoDownstreamIssuesWithRequiredTargetRelease => {
                "NO_DOWNSTREAM_ISSUES_WITH_REQUIRED_TARGET_RELEASE"
            }
            CommitReason::CherryPickFailed => "CHERRY_PICK_FAILED",
        }
    }
}

impl std::fmt::Display for CommitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of triaging one upstream commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub upstream_commit: String,
    pub summary: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub release_version: Option<String>,
    #[serde(default)]
    pub upstream_issue: Option<String>,
    #[serde(default)]
    pub downstream_issues: Vec<String>,
    #[serde(default)]
    pub downstream_commit: Option<String>,
    /// Test classes touched by the upstream commit.
    #[serde(default)]
    pub tests: Vec<String>,
    pub state: CommitState,
    #[serde(default)]
    pub reason: Option<CommitReason>,
    #[serde(default)]
    pub tasks: Vec<CommitTask>,
}

impl Commit {
    pub fn new(upstream_commit: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            upstream_commit: upstream_commit.into(),
            summary: summary.into(),
            author: None,
            assignee: None,
            release_version: None,
            upstream_issue: None,
            downstream_issues: Vec::new(),
            downstream_commit: None,
            tests: Vec::new(),
            state: CommitState::Done,
            reason: None,
            tasks: Vec::new(),
        }
    }

    pub fn with_state(mut self, state: CommitState, reason: Option<CommitReason>) -> Self {
        self.state = state;
        self.reason = reason;
        self
    }

    pub fn has_tests(&self) -> bool {
        !self.tests.is_empty()
    }

    pub fn has_executed_task(&self) -> bool {
        self.tasks.iter().any(|t| t.state == TaskState::Executed)
    }

    /// Records worth keeping for the next run: anything unsettled, plus
    /// settled commits whose tasks changed something.
    pub fn is_persisted(&self) -> bool {
        match self.state {
            CommitState::Skipped => false,
            CommitState::Done => self.has_executed_task(),
            _ => true,
        }
    }

    /// Records a human should look at.
    pub fn needs_attention(&self) -> bool {
        match self.state {
            CommitState::Skipped => false,
            CommitState::Done => !self.tasks.is_empty(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::{TaskRequest, TaskType};

    fn task(state: TaskState) -> CommitTask {
        let mut task = CommitTask::unconfirmed(
            TaskRequest::new(TaskType::CherryPickUpstreamCommit, "abc", None),
            None,
        );
        task.state = state;
        task
    }

    #[test]
    fn test_persisted_filter() {
        let skipped = Commit::new("a", "s").with_state(CommitState::Skipped, None);
        assert!(!skipped.is_persisted());

        let mut done = Commit::new("b", "s");
        assert!(!done.is_persisted());
        done.tasks.push(task(TaskState::Unconfirmed));
        assert!(!done.is_persisted());
        done.tasks.push(task(TaskState::Executed));
        assert!(done.is_persisted());

        let failed = Commit::new("c", "s").with_state(CommitState::Failed, None);
        assert!(failed.is_persisted());
    }

    #[test]
    fn test_attention_filter() {
        let mut done = Commit::new("b", "s");
        assert!(!done.needs_attention());
        done.tasks.push(task(TaskState::Unconfirmed));
        assert!(done.needs_attention());

        let blocked = Commit::new("c", "s").with_state(
            CommitState::Blocked,
            Some(CommitReason::NoDownstreamIssuesWithRequiredTargetRelease),
        );
        assert!(blocked.needs_attention());
    }

    #[test]
    fn test_reason_serializes_screaming_snake() {
        let json = serde_json::to_string(&CommitReason::NoDownstreamIssuesWithRequiredTargetRelease)
            .unwrap();
        assert_eq!(json, "\"NO_DOWNSTREAM_ISSUES_WITH_REQUIRED_TARGET_RELEASE\"");
        assert_eq!(CommitState::Incomplete.to_string(), "INCOMPLETE");
    }
}
