//! In-memory fake tracker (testing only)
//!
//! `MemoryIssueTracker` keeps issues in a map and records every mutating
//! call so tests can assert on side effects.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{TrackerError, TrackerResult};
use crate::issue::{Issue, IssueState, NewIssue};
use crate::tracker::IssueTracker;

/// A mutating call observed by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    Create { key: String, summary: String },
    Link { key: String, linked_key: String, link_type: String },
    AddLabels { key: String, labels: Vec<String> },
    SetTargetRelease { key: String, target_release: String },
    Transition { key: String, state: IssueState },
}

#[derive(Debug, Default)]
struct Inner {
    issues: BTreeMap<String, Issue>,
    calls: Vec<TrackerCall>,
    next_id: u64,
}

#[derive(Debug)]
pub struct MemoryIssueTracker {
    project_key: String,
    inner: Mutex<Inner>,
}

impl MemoryIssueTracker {
    pub fn new(project_key: impl Into<String>) -> Self {
        Self {
            project_key: project_key.into(),
            inner: Mutex::new(Inner {
                next_id: 1000,
                ..Inner::default()
            }),
        }
    }

    /// Seed an issue.
    pub fn insert(&self, issue: Issue) {
        let mut inner = self.inner.lock().unwrap();
        inner.issues.insert(issue.key.clone(), issue);
    }

    pub fn issue(&self, key: &str) -> Option<Issue> {
        self.inner.lock().unwrap().issues.get(key).cloned()
    }

    /// Mutating calls in the order they happened.
    pub fn calls(&self) -> Vec<TrackerCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn with_issue<R>(&self, key: &str, f: impl FnOnce(&mut Issue) -> R) -> TrackerResult<R> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .issues
            .get_mut(key)
            .map(f)
            .ok_or_else(|| TrackerError::IssueNotFound(key.to_string()))
    }

    fn record(&self, call: TrackerCall) {
        self.inner.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl IssueTracker for MemoryIssueTracker {
    fn project_key(&self) -> &str {
        &self.project_key
    }

    async fn get_issue(&self, key: &str) -> TrackerResult<Option<Issue>> {
        Ok(self.issue(key))
    }

    async fn create_issue(&self, new_issue: &NewIssue) -> TrackerResult<Issue> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let key = format!("{}-{}", self.project_key, inner.next_id);

        let mut issue = Issue::new(&key, new_issue.issue_type, &new_issue.summary);
        issue.description = new_issue.description.clone();
        issue.assignee = new_issue.assignee.clone();
        issue.labels = new_issue.labels.clone();
        issue.target_release = Some(new_issue.target_release.clone());
        issue.issues = vec![new_issue.upstream_issue.clone()];

        inner.issues.insert(key.clone(), issue.clone());
        inner.calls.push(TrackerCall::Create {
            key,
            summary: new_issue.summary.clone(),
        });
        Ok(issue)
    }

    async fn link_issue(&self, key: &str, linked_key: &str, link_type: &str) -> TrackerResult<()> {
        self.record(TrackerCall::Link {
            key: key.to_string(),
            linked_key: linked_key.to_string(),
            link_type: link_type.to_string(),
        });
        Ok(())
    }

    async fn add_labels(&self, key: &str, labels: &[String]) -> TrackerResult<()> {
        self.with_issue(key, |issue| {
            for label in labels {
                issue.add_label(label);
            }
        })?;
        self.record(TrackerCall::AddLabels {
            key: key.to_string(),
            labels: labels.to_vec(),
        });
        Ok(())
    }

    async fn set_target_release(&self, key: &str, target_release: &str) -> TrackerResult<()> {
        self.with_issue(key, |issue| {
            issue.target_release = Some(target_release.to_string())
        })?;
        self.record(TrackerCall::SetTargetRelease {
            key: key.to_string(),
            target_release: target_release.to_string(),
        });
        Ok(())
    }

    async fn transition_issue(&self, key: &str, state: IssueState) -> TrackerResult<()> {
        self.with_issue(key, |issue| issue.state = state)?;
        self.record(TrackerCall::Transition {
            key: key.to_string(),
            state,
        });
        Ok(())
    }

    async fn load_project_issues(&self) -> TrackerResult<Vec<Issue>> {
        Ok(self.inner.lock().unwrap().issues.values().cloned().collect())
    }
}
