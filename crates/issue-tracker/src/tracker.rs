//! The issue tracker seam.
//!
//! One instance per tracker: the upstream project is only read, the
//! downstream project is also mutated by the task executor.

use async_trait::async_trait;

use crate::error::TrackerResult;
use crate::issue::{Issue, IssueState, NewIssue};

/// Link type used between a cloned issue and its source.
pub const CLONERS_LINK_TYPE: &str = "Cloners";

#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Project key, e.g. `ENTMQBR`.
    fn project_key(&self) -> &str;

    /// Fetch a single issue, `None` if the tracker does not know the key.
    async fn get_issue(&self, key: &str) -> TrackerResult<Option<Issue>>;

    /// Create an issue and return it as stored by the tracker.
    async fn create_issue(&self, new_issue: &NewIssue) -> TrackerResult<Issue>;

    /// Link two issues with a named link type.
    async fn link_issue(&self, key: &str, linked_key: &str, link_type: &str) -> TrackerResult<()>;

    async fn add_labels(&self, key: &str, labels: &[String]) -> TrackerResult<()>;

    async fn set_target_release(&self, key: &str, target_release: &str) -> TrackerResult<()>;

    /// Walk the workflow until the issue reaches `state`.
    async fn transition_issue(&self, key: &str, state: IssueState) -> TrackerResult<()>;

    /// Load every issue of the project.
    async fn load_project_issues(&self) -> TrackerResult<Vec<Issue>>;

    /// Create `new_issue` and link it to `source_key` as a clone.
    async fn clone_issue(&self, source_key: &str, new_issue: &NewIssue) -> TrackerResult<Issue> {
        let clone = self.create_issue(new_issue).await?;
        self.link_issue(&clone.key, source_key, CLONERS_LINK_TYPE)
            .await?;
        Ok(clone)
    }
}
