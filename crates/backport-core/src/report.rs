//! Run report: commits completed for the candidate release and commits
//! that need a human.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::{Commit, CommitState, ReleaseVersion};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub state: CommitState,
    pub release: Option<String>,
    pub upstream_commit: String,
    pub author: Option<String>,
    pub summary: String,
    pub upstream_issue: Option<String>,
    pub downstream_issues: Vec<String>,
    pub upstream_test_coverage: bool,
}

impl From<&Commit> for ReportEntry {
    fn from(commit: &Commit) -> Self {
        Self {
            state: commit.state,
            release: commit.release_version.clone(),
            upstream_commit: commit.upstream_commit.clone(),
            author: commit.author.clone(),
            summary: commit.summary.clone(),
            upstream_issue: commit.upstream_issue.clone(),
            downstream_issues: commit.downstream_issues.clone(),
            upstream_test_coverage: commit.has_tests(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// DONE commits delivered into the candidate release.
    pub completed: Vec<ReportEntry>,
    /// Commits not SKIPPED or DONE, or DONE with tasks.
    pub attention: Vec<ReportEntry>,
}

impl Report {
    pub fn build(commits: &[Commit], candidate: &ReleaseVersion) -> Self {
        let in_candidate = |commit: &Commit| {
            commit
                .release_version
                .as_deref()
                .and_then(|r| r.parse::<ReleaseVersion>().ok())
                .is_some_and(|r| r.cmp_without_qualifier(candidate) == Ordering::Equal)
        };

        Self {
            completed: commits
                .iter()
                .filter(|c| {
                    c.state == CommitState::Done && c.downstream_commit.is_some() && in_candidate(c)
                })
                .map(ReportEntry::from)
                .collect(),
            attention: commits
                .iter()
                .filter(|c| c.needs_attention())
                .map(ReportEntry::from)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.attention.is_empty()
    }
}
