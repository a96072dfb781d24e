//! Triage policy and the confirmation inputs of a run.

use std::collections::{HashMap, HashSet};

use issue_tracker::{CustomerPriority, SecurityImpact};
use serde::{Deserialize, Serialize};

use crate::domain::{Commit, CommitTask, ReleaseVersion};

/// Label recording that the fix carries upstream tests.
pub const UPSTREAM_TEST_COVERAGE_LABEL: &str = "upstream-test-coverage";
/// Label waiving the test-coverage label.
pub const NO_TESTING_NEEDED_LABEL: &str = "no-testing-needed";

/// Policy knobs for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Release the run prepares, including its qualifier.
    pub candidate: ReleaseVersion,
    /// Product prefix of release names (`AMQ 7.11.0.GA`).
    pub product: String,
    /// Downstream issues must target the exact release. Defaults to true for
    /// z-stream candidates.
    pub require_release_issues: bool,
    /// Regex matching upstream issue keys in commit summaries.
    pub upstream_issue_pattern: String,
    pub customer_priority_threshold: CustomerPriority,
    pub security_impact_threshold: SecurityImpact,
    /// Spawn consistency tasks and flag cherry-picked commits without
    /// downstream issues.
    pub check_incomplete_commits: bool,
    /// Dry run: confirmed tasks and cherry-picks are scratched.
    pub scratch: bool,
    pub skip_commit_test: bool,
    /// Multiple or unknown upstream issues fail the commit instead of skipping
    /// it.
    pub strict_upstream_issues: bool,
    /// Summary prefix of commits that legitimately have no issue.
    pub no_issue_prefix: String,
    /// Short-message prefix of release commits that predate the
    /// `Prepare release` convention.
    #[serde(default)]
    pub legacy_release_prefix: Option<String>,
    pub test_path: String,
    pub test_suffix: String,
    pub committer_name: String,
    pub committer_email: String,
    /// Base of the upstream issue browse URL used in created issues.
    pub upstream_browse_url: String,
    pub push_remote: String,
}

impl TriageConfig {
    pub fn new(candidate: ReleaseVersion) -> Self {
        Self {
            require_release_issues: candidate.is_z_stream(),
            candidate,
            product: "AMQ".to_string(),
            upstream_issue_pattern: "ARTEMIS-[0-9]+".to_string(),
            customer_priority_threshold: CustomerPriority::Low,
            security_impact_threshold: SecurityImpact::Low,
            check_incomplete_commits: true,
            scratch: false,
            skip_commit_test: false,
            strict_upstream_issues: true,
            no_issue_prefix: "NO-JIRA".to_string(),
            legacy_release_prefix: Some("7.8.".to_string()),
            test_path: "src/test/java/".to_string(),
            test_suffix: "Test.java".to_string(),
            committer_name: "rh-messaging-ci".to_string(),
            committer_email: "messaging-infra@redhat.com".to_string(),
            upstream_browse_url: "https://issues.apache.org/jira/browse".to_string(),
            push_remote: "origin".to_string(),
        }
    }

    /// Release name of the candidate.
    pub fn release_name(&self) -> String {
        self.candidate.release_name(&self.product)
    }
}

/// Human approvals carried into a run.
#[derive(Debug, Clone, Default)]
pub struct Confirmations {
    /// Previous run's commit records by upstream commit id.
    pub commits: HashMap<String, Commit>,
    /// When set, replaces the default upstream worthiness policy.
    pub upstream_issues: Option<HashSet<String>>,
    /// When set, replaces the default downstream worthiness policy.
    pub downstream_issues: Option<HashSet<String>>,
}

impl Confirmations {
    pub fn from_commits(commits: Vec<Commit>) -> Self {
        Self {
            commits: commits
                .into_iter()
                .map(|c| (c.upstream_commit.clone(), c))
                .collect(),
            ..Self::default()
        }
    }

    /// Tasks previously recorded for an upstream commit.
    pub fn tasks_for(&self, upstream_commit: &str) -> &[CommitTask] {
        self.commits
            .get(upstream_commit)
            .map(|c| c.tasks.as_slice())
            .unwrap_or_default()
    }
}
