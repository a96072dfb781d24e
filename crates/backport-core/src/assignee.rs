//! Mapping commit authors and issue participants to known users.

use std::collections::HashMap;
use std::sync::Arc;

use issue_tracker::Issue;

use crate::domain::User;
use crate::git::GitCommit;

/// Lookup tables over the user directory.
///
/// Emails match case-insensitively; usernames match exactly.
#[derive(Debug, Clone, Default)]
pub struct UserResolver {
    users: Vec<User>,
    by_email: HashMap<String, usize>,
    by_username: HashMap<String, usize>,
    by_upstream: HashMap<String, usize>,
    by_downstream: HashMap<String, usize>,
}

impl UserResolver {
    pub fn new(users: Vec<User>) -> Self {
        let mut resolver = Self::default();
        for (idx, user) in users.iter().enumerate() {
            for email in &user.emails {
                resolver.by_email.entry(email.to_lowercase()).or_insert(idx);
            }
            resolver.by_username.entry(user.username.clone()).or_insert(idx);
            if let Some(name) = &user.upstream_username {
                resolver.by_upstream.entry(name.clone()).or_insert(idx);
            }
            if let Some(name) = &user.downstream_username {
                resolver.by_downstream.entry(name.clone()).or_insert(idx);
            }
        }
        resolver.users = users;
        resolver
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn by_email(&self, email: &str) -> Option<&User> {
        self.lookup(&self.by_email, &email.to_lowercase())
    }

    pub fn by_username(&self, username: &str) -> Option<&User> {
        self.lookup(&self.by_username, username)
    }

    pub fn by_upstream_username(&self, username: &str) -> Option<&User> {
        self.lookup(&self.by_upstream, username)
    }

    pub fn by_downstream_username(&self, username: &str) -> Option<&User> {
        self.lookup(&self.by_downstream, username)
    }

    fn lookup(&self, index: &HashMap<String, usize>, key: &str) -> Option<&User> {
        index.get(key).map(|&idx| &self.users[idx])
    }
}

/// Picks the user responsible for an upstream commit.
#[derive(Debug, Clone)]
pub struct AssigneeResolver {
    users: Arc<UserResolver>,
    default: User,
}

impl AssigneeResolver {
    /// `default_username` is looked up in the directory and falls back to a
    /// bare [`User::named`].
    pub fn new(users: Arc<UserResolver>, default_username: &str) -> Self {
        let default = users
            .by_username(default_username)
            .or_else(|| users.by_downstream_username(default_username))
            .cloned()
            .unwrap_or_else(|| User::named(default_username));
        Self { users, default }
    }

    pub fn default_assignee(&self) -> &User {
        &self.default
    }

    /// Commit author, committer, then upstream issue participants, then each
    /// downstream issue's participants, then the default.
    pub fn resolve(
        &self,
        commit: &GitCommit,
        upstream: Option<&Issue>,
        downstream: &[&Issue],
    ) -> &User {
        let participants = |issue: &Issue| {
            [&issue.assignee, &issue.reporter, &issue.creator]
                .into_iter()
                .flatten()
                .cloned()
                .collect::<Vec<String>>()
        };

        if let Some(user) = self
            .users
            .by_email(&commit.author.email)
            .or_else(|| self.users.by_email(&commit.committer.email))
        {
            return user;
        }

        if let Some(issue) = upstream {
            for name in participants(issue) {
                if let Some(user) = self.users.by_upstream_username(&name) {
                    return user;
                }
            }
        }

        for issue in downstream {
            for name in participants(issue) {
                if let Some(user) = self.users.by_downstream_username(&name) {
                    return user;
                }
            }
        }

        &self.default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::git_commit;
    use issue_tracker::IssueType;

    fn user(username: &str, email: &str, upstream: &str, downstream: &str) -> User {
        User {
            username: username.to_string(),
            name: None,
            emails: vec![email.to_string()],
            upstream_username: Some(upstream.to_string()),
            downstream_username: Some(downstream.to_string()),
        }
    }

    fn resolver() -> AssigneeResolver {
        let users = UserResolver::new(vec![
            user("alice", "Alice@Example.com", "alice-up", "alice-down"),
            user("bob", "bob@example.com", "bob-up", "bob-down"),
            user("carol", "carol@example.com", "carol-up", "carol-down"),
        ]);
        AssigneeResolver::new(Arc::new(users), "dflt")
    }

    #[test]
    fn test_author_email_wins_case_insensitively() {
        let resolver = resolver();
        let commit = git_commit("1", "ARTEMIS-1 x", "alice@example.COM");
        let mut upstream = Issue::new("ARTEMIS-1", IssueType::Bug, "x");
        upstream.assignee = Some("bob-up".to_string());
        assert_eq!(resolver.resolve(&commit, Some(&upstream), &[]).username, "alice");
    }

    #[test]
    fn test_upstream_reporter_before_downstream() {
        let resolver = resolver();
        let commit = git_commit("1", "ARTEMIS-1 x", "stranger@example.com");
        let mut upstream = Issue::new("ARTEMIS-1", IssueType::Bug, "x");
        upstream.assignee = Some("nobody".to_string());
        upstream.reporter = Some("bob-up".to_string());
        let mut downstream = Issue::new("ENTMQBR-1", IssueType::Bug, "x");
        downstream.assignee = Some("carol-down".to_string());

        let picked = resolver.resolve(&commit, Some(&upstream), &[&downstream]);
        assert_eq!(picked.username, "bob");

        let picked = resolver.resolve(&commit, None, &[&downstream]);
        assert_eq!(picked.username, "carol");
    }

    #[test]
    fn test_falls_back_to_default() {
        let resolver = resolver();
        let commit = git_commit("1", "ARTEMIS-1 x", "stranger@example.com");
        let picked = resolver.resolve(&commit, None, &[]);
        assert_eq!(picked.username, "dflt");
        assert_eq!(picked.downstream_username.as_deref(), Some("dflt"));
    }

    #[test]
    fn test_default_found_in_directory() {
        let users = UserResolver::new(vec![user("alice", "a@example.com", "a-up", "a-down")]);
        let resolver = AssigneeResolver::new(Arc::new(users), "alice");
        assert_eq!(resolver.default_assignee().downstream_username.as_deref(), Some("a-down"));
    }
}
