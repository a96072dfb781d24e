//! Known users and their identities in git and both trackers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub upstream_username: Option<String>,
    #[serde(default)]
    pub downstream_username: Option<String>,
}

impl User {
    /// A user known only by name, e.g. a default assignee missing from the
    /// directory.
    pub fn named(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            downstream_username: Some(username.clone()),
            username,
            name: None,
            emails: Vec::new(),
            upstream_username: None,
        }
    }
}
