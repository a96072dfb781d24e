//! Issue-Tracker: upstream and downstream issue tracker access
//!
//! This crate provides the issue model shared by both trackers, the
//! `IssueTracker` seam, a Jira REST client and an in-memory fake.
//!
//! ## Layer 1 - Tracker Collaborator
//!
//! Focus: faithful issue parsing and complete bulk loads.

pub mod error;
pub mod fakes;
pub mod issue;
pub mod jira;
pub mod loader;
pub mod tracker;

pub use error::{TrackerError, TrackerResult};
pub use issue::{
    CustomerPriority, Issue, IssueState, IssueType, NewIssue, SecurityImpact, FUTURE_GA_RELEASE,
};
pub use jira::{parse_issue, JiraClient, JiraConfig};
pub use loader::{default_workers, load_pages, DEFAULT_PAGE_SIZE};
pub use tracker::{IssueTracker, CLONERS_LINK_TYPE};
