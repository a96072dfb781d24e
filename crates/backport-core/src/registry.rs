//! In-memory registry of upstream and downstream issues.
//!
//! Cross-links are held as two one-directional maps that are always updated
//! together. The registry is filled once per run and afterwards mutated only
//! by the task executor.

use std::collections::HashMap;

use issue_tracker::Issue;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct IssueRegistry {
    upstream: HashMap<String, Issue>,
    downstream: HashMap<String, Issue>,
    downstream_by_upstream: HashMap<String, Vec<String>>,
    upstream_by_downstream: HashMap<String, Vec<String>>,
}

impl IssueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from tracker snapshots, linking from the keys recorded on both
    /// sides.
    pub fn from_snapshots(upstream: Vec<Issue>, downstream: Vec<Issue>) -> Self {
        let mut registry = Self::new();

        for issue in upstream {
            registry.upstream.insert(issue.key.clone(), issue);
        }

        let mut links = Vec::new();
        for issue in downstream {
            for upstream_key in &issue.issues {
                links.push((upstream_key.clone(), issue.key.clone()));
            }
            registry.downstream.insert(issue.key.clone(), issue);
        }
        for issue in registry.upstream.values() {
            for downstream_key in &issue.issues {
                links.push((issue.key.clone(), downstream_key.clone()));
            }
        }

        for (upstream_key, downstream_key) in links {
            if !registry.upstream.contains_key(&upstream_key) {
                warn!(
                    upstream = %upstream_key,
                    downstream = %downstream_key,
                    "downstream issue links an unknown upstream issue"
                );
            }
            registry.link(&upstream_key, &downstream_key);
        }

        registry
    }

    /// Record a cross-link in both directions. Idempotent.
    pub fn link(&mut self, upstream_key: &str, downstream_key: &str) {
        let downstream = self
            .downstream_by_upstream
            .entry(upstream_key.to_string())
            .or_default();
        if !downstream.iter().any(|k| k == downstream_key) {
            downstream.push(downstream_key.to_string());
        }

        let upstream = self
            .upstream_by_downstream
            .entry(downstream_key.to_string())
            .or_default();
        if !upstream.iter().any(|k| k == upstream_key) {
            upstream.push(upstream_key.to_string());
        }
    }

    pub fn upstream_issue(&self, key: &str) -> Option<&Issue> {
        self.upstream.get(key)
    }

    pub fn downstream_issue(&self, key: &str) -> Option<&Issue> {
        self.downstream.get(key)
    }

    pub fn downstream_issue_mut(&mut self, key: &str) -> Option<&mut Issue> {
        self.downstream.get_mut(key)
    }

    pub fn put_downstream(&mut self, issue: Issue) {
        self.downstream.insert(issue.key.clone(), issue);
    }

    /// Downstream keys linked to an upstream issue, in link order.
    pub fn downstream_keys_for(&self, upstream_key: &str) -> &[String] {
        self.downstream_by_upstream
            .get(upstream_key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn upstream_keys_for(&self, downstream_key: &str) -> &[String] {
        self.upstream_by_downstream
            .get(downstream_key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn upstream_len(&self) -> usize {
        self.upstream.len()
    }

    pub fn downstream_len(&self) -> usize {
        self.downstream.len()
    }

    /// Upstream issues sorted by key with their current links.
    pub fn upstream_snapshot(&self) -> Vec<Issue> {
        Self::snapshot(&self.upstream, &self.downstream_by_upstream)
    }

    /// Downstream issues sorted by key with their current links.
    pub fn downstream_snapshot(&self) -> Vec<Issue> {
        Self::snapshot(&self.downstream, &self.upstream_by_downstream)
    }

    fn snapshot(issues: &HashMap<String, Issue>, links: &HashMap<String, Vec<String>>) -> Vec<Issue> {
        let mut snapshot: Vec<Issue> = issues
            .values()
            .map(|issue| {
                let mut issue = issue.clone();
                issue.issues = links.get(&issue.key).cloned().unwrap_or_default();
                issue
            })
            .collect();
        snapshot.sort_by(|a, b| a.key.cmp(&b.key));
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use issue_tracker::IssueType;

    fn issue(key: &str, links: &[&str]) -> Issue {
        let mut issue = Issue::new(key, IssueType::Bug, key);
        issue.issues = links.iter().map(|k| k.to_string()).collect();
        issue
    }

    #[test]
    fn test_links_are_bidirectional() {
        let registry = IssueRegistry::from_snapshots(
            vec![issue("ARTEMIS-1", &[])],
            vec![
                issue("ENTMQBR-1", &["ARTEMIS-1"]),
                issue("ENTMQBR-2", &["ARTEMIS-1"]),
            ],
        );
        assert_eq!(
            registry.downstream_keys_for("ARTEMIS-1"),
            &["ENTMQBR-1".to_string(), "ENTMQBR-2".to_string()]
        );
        assert_eq!(registry.upstream_keys_for("ENTMQBR-2"), &["ARTEMIS-1".to_string()]);
        assert!(registry.downstream_keys_for("ARTEMIS-9").is_empty());
    }

    #[test]
    fn test_links_from_both_sides_are_deduplicated() {
        let registry = IssueRegistry::from_snapshots(
            vec![issue("ARTEMIS-1", &["ENTMQBR-1"])],
            vec![issue("ENTMQBR-1", &["ARTEMIS-1"])],
        );
        assert_eq!(registry.downstream_keys_for("ARTEMIS-1").len(), 1);
        assert_eq!(registry.upstream_keys_for("ENTMQBR-1").len(), 1);
    }

    #[test]
    fn test_snapshot_reflects_new_links() {
        let mut registry =
            IssueRegistry::from_snapshots(vec![issue("ARTEMIS-1", &[])], vec![]);
        registry.put_downstream(issue("ENTMQBR-7", &[]));
        registry.link("ARTEMIS-1", "ENTMQBR-7");

        let upstream = registry.upstream_snapshot();
        assert_eq!(upstream[0].issues, vec!["ENTMQBR-7".to_string()]);
        let downstream = registry.downstream_snapshot();
        assert_eq!(downstream[0].issues, vec!["ARTEMIS-1".to_string()]);
        assert_eq!(registry.downstream_len(), 1);
    }
}
