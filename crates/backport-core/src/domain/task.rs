//! Remediation tasks attached to a commit record.

use serde::{Deserialize, Serialize};

/// What a task does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    CherryPickUpstreamCommit,
    CloneUpstreamIssue,
    CloneDownstreamIssue,
    SetDownstreamIssueTargetRelease,
    AddDownstreamIssueLabel,
    TransitionDownstreamIssue,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::CherryPickUpstreamCommit => "CHERRY_PICK_UPSTREAM_COMMIT",
            TaskType::CloneUpstreamIssue => "CLONE_UPSTREAM_ISSUE",
            TaskType::CloneDownstreamIssue => "CLONE_DOWNSTREAM_ISSUE",
            TaskType::SetDownstreamIssueTargetRelease => "SET_DOWNSTREAM_ISSUE_TARGET_RELEASE",
            TaskType::AddDownstreamIssueLabel => "ADD_DOWNSTREAM_ISSUE_LABEL",
            TaskType::TransitionDownstreamIssue => "TRANSITION_DOWNSTREAM_ISSUE",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// Required but not approved yet.
    Unconfirmed,
    Executed,
    Failed,
    /// Would have executed, suppressed by scratch mode.
    Scratched,
}

/// A task the engine asks the executor to perform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskRequest {
    pub task_type: TaskType,
    pub key: String,
    pub value: Option<String>,
}

impl TaskRequest {
    pub fn new(task_type: TaskType, key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            task_type,
            key: key.into(),
            value,
        }
    }
}

/// A task as recorded on a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitTask {
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    pub state: TaskState,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
}

impl CommitTask {
    pub fn unconfirmed(request: TaskRequest, assignee: Option<String>) -> Self {
        Self {
            task_type: request.task_type,
            key: request.key,
            value: request.value,
            state: TaskState::Unconfirmed,
            assignee,
            result: None,
        }
    }

    /// Same `{type, key, value}`; state and result are ignored.
    pub fn matches(&self, other: &CommitTask) -> bool {
        self.task_type == other.task_type && self.key == other.key && self.value == other.value
    }

    pub fn is_executed(&self) -> bool {
        self.state == TaskState::Executed
    }
}
