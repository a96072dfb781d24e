//! Issue records shared by the upstream and downstream trackers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Target release meaning "no concrete release yet".
pub const FUTURE_GA_RELEASE: &str = "Future GA";

/// Issue type, normalised across both trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    Bug,
    DependencyUpgrade,
    Improvement,
    NewFeature,
    Task,
}

impl IssueType {
    /// Map a tracker issue type name.
    pub fn from_name(name: &str) -> Result<Self, TrackerError> {
        match name {
            "Bug" => Ok(IssueType::Bug),
            "Dependency upgrade" => Ok(IssueType::DependencyUpgrade),
            "Improvement" => Ok(IssueType::Improvement),
            "Enhancement" | "New Feature" | "Wish" | "Test" | "Epic" => Ok(IssueType::NewFeature),
            "Task" | "Sub-task" => Ok(IssueType::Task),
            other => Err(TrackerError::UnknownValue {
                kind: "issue type",
                value: other.to_string(),
            }),
        }
    }

    /// Name used when creating issues in the downstream tracker.
    pub fn to_name(&self) -> &'static str {
        match self {
            IssueType::Bug => "Bug",
            IssueType::DependencyUpgrade => "Dependency upgrade",
            IssueType::Improvement => "Enhancement",
            IssueType::NewFeature => "New Feature",
            IssueType::Task => "Task",
        }
    }
}

/// Workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueState {
    New,
    Todo,
    InProgress,
    ReadyForReview,
    Closed,
    Blocked,
    Reopened,
}

impl IssueState {
    /// Map a tracker status name.
    pub fn from_name(name: &str) -> Result<Self, TrackerError> {
        match name {
            "New" | "Open" => Ok(IssueState::New),
            "Reopened" => Ok(IssueState::Reopened),
            "Closed" | "Resolved" => Ok(IssueState::Closed),
            "In Progress" => Ok(IssueState::InProgress),
            "Blocked" => Ok(IssueState::Blocked),
            "Ready for Review" => Ok(IssueState::ReadyForReview),
            "To Do" => Ok(IssueState::Todo),
            other => Err(TrackerError::UnknownValue {
                kind: "issue status",
                value: other.to_string(),
            }),
        }
    }

    /// Stable identifier, also used as the value of transition tasks.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::New => "NEW",
            IssueState::Todo => "TODO",
            IssueState::InProgress => "IN_PROGRESS",
            IssueState::ReadyForReview => "READY_FOR_REVIEW",
            IssueState::Closed => "CLOSED",
            IssueState::Blocked => "BLOCKED",
            IssueState::Reopened => "REOPENED",
        }
    }

    /// Next state on the forward workflow path, if any.
    pub fn next_forward(&self) -> Option<IssueState> {
        match self {
            IssueState::New => Some(IssueState::Todo),
            IssueState::Todo => Some(IssueState::InProgress),
            IssueState::InProgress => Some(IssueState::ReadyForReview),
            IssueState::ReadyForReview => Some(IssueState::Closed),
            _ => None,
        }
    }
}

impl FromStr for IssueState {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            IssueState::New,
            IssueState::Todo,
            IssueState::InProgress,
            IssueState::ReadyForReview,
            IssueState::Closed,
            IssueState::Blocked,
            IssueState::Reopened,
        ]
        .into_iter()
        .find(|state| state.as_str() == s)
        .ok_or_else(|| TrackerError::UnknownValue {
            kind: "issue state",
            value: s.to_string(),
        })
    }
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer priority, ordered from least to most urgent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerPriority {
    #[default]
    None,
    Low,
    Medium,
    High,
    Urgent,
}

impl FromStr for CustomerPriority {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(CustomerPriority::None),
            "low" => Ok(CustomerPriority::Low),
            "medium" | "normal" => Ok(CustomerPriority::Medium),
            "high" => Ok(CustomerPriority::High),
            "urgent" => Ok(CustomerPriority::Urgent),
            _ => Err(TrackerError::UnknownValue {
                kind: "customer priority",
                value: s.to_string(),
            }),
        }
    }
}

/// Security impact, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityImpact {
    #[default]
    None,
    Low,
    Moderate,
    Important,
    Critical,
}

impl FromStr for SecurityImpact {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(SecurityImpact::None),
            "low" => Ok(SecurityImpact::Low),
            "moderate" => Ok(SecurityImpact::Moderate),
            "important" => Ok(SecurityImpact::Important),
            "critical" => Ok(SecurityImpact::Critical),
            _ => Err(TrackerError::UnknownValue {
                kind: "security impact",
                value: s.to_string(),
            }),
        }
    }
}

/// An issue as loaded from a tracker.
///
/// `issues` holds the keys of linked issues in the *other* tracker as read
/// from the wire or from a snapshot. Once an issue enters the registry the
/// registry's link maps are authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub issue_type: IssueType,
    pub state: IssueState,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub reporter: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub target_release: Option<String>,
    #[serde(default)]
    pub customer: bool,
    #[serde(default)]
    pub customer_priority: CustomerPriority,
    #[serde(default)]
    pub security: bool,
    #[serde(default)]
    pub security_impact: SecurityImpact,
    #[serde(default)]
    pub patch: bool,
}

impl Issue {
    /// Minimal issue, mostly useful for tests and fakes.
    pub fn new(key: impl Into<String>, issue_type: IssueType, summary: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            issue_type,
            state: IssueState::New,
            assignee: None,
            reporter: None,
            creator: None,
            summary: summary.into(),
            description: None,
            labels: Vec::new(),
            issues: Vec::new(),
            target_release: None,
            customer: false,
            customer_priority: CustomerPriority::None,
            security: false,
            security_impact: SecurityImpact::None,
            patch: false,
        }
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Add a label unless already present.
    pub fn add_label(&mut self, label: &str) {
        if !self.has_label(label) {
            self.labels.push(label.to_string());
        }
    }

    /// Target release that names a real release (not empty, not the sentinel).
    pub fn concrete_target_release(&self) -> Option<&str> {
        self.target_release
            .as_deref()
            .filter(|r| !r.is_empty() && *r != FUTURE_GA_RELEASE)
    }
}

/// Fields for creating a new downstream issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIssue {
    pub summary: String,
    pub description: Option<String>,
    pub issue_type: IssueType,
    pub assignee: Option<String>,
    /// Free text for the upstream-link field (issue key or browse URL).
    pub upstream_issue: String,
    pub target_release: String,
    pub labels: Vec<String>,
}
