//! In-memory git and test-runner fakes (testing only)
//!
//! `MemoryGitRepository` serves canned commits and logs, records every
//! mutation, and fails cherry-picks for commits registered as conflicting.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::Utc;

use crate::domain::error::{Result, TriageError};
use crate::git::{GitCommit, GitRepository, Identity};
use crate::test_gate::TestRunner;

/// Build a commit whose short message is the first line of `message`.
pub fn git_commit(id: impl Into<String>, message: &str, author_email: &str) -> GitCommit {
    let when = Utc::now().fixed_offset();
    let name = author_email.split('@').next().unwrap_or(author_email);
    GitCommit {
        id: id.into(),
        short_message: message.lines().next().unwrap_or_default().to_string(),
        full_message: message.to_string(),
        author: Identity::new(name, author_email, when),
        committer: Identity::new(name, author_email, when),
    }
}

/// Deterministic 40-hex commit id.
pub fn commit_id(n: u64) -> String {
    format!("{n:040x}")
}

#[derive(Debug, Default)]
struct Inner {
    commits: HashMap<String, GitCommit>,
    changed_files: HashMap<String, Vec<String>>,
    logs: HashMap<(String, String), Vec<String>>,
    conflicts: HashSet<String>,
    created: Vec<GitCommit>,
    pushes: Vec<String>,
    resets: usize,
    next_id: u64,
}

#[derive(Debug)]
pub struct MemoryGitRepository {
    inner: Mutex<Inner>,
}

impl Default for MemoryGitRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGitRepository {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 0xd000_0000,
                ..Inner::default()
            }),
        }
    }

    /// Register a commit and the files it touches.
    pub fn add_commit(&self, commit: GitCommit, files: &[&str]) {
        let mut inner = self.inner.lock().unwrap();
        inner.changed_files.insert(
            commit.id.clone(),
            files.iter().map(|f| f.to_string()).collect(),
        );
        inner.commits.insert(commit.id.clone(), commit);
    }

    /// Answer `log(from, excluding)` with `commits` (newest first).
    pub fn set_log(&self, from: &str, excluding: &str, commits: Vec<GitCommit>) {
        let mut inner = self.inner.lock().unwrap();
        let ids = commits.iter().map(|c| c.id.clone()).collect();
        for commit in commits {
            inner.changed_files.entry(commit.id.clone()).or_default();
            inner.commits.insert(commit.id.clone(), commit);
        }
        inner
            .logs
            .insert((from.to_string(), excluding.to_string()), ids);
    }

    /// Make cherry-picks of `id` conflict.
    pub fn add_conflict(&self, id: &str) {
        self.inner.lock().unwrap().conflicts.insert(id.to_string());
    }

    /// Commits created through [`GitRepository::commit`], oldest first.
    pub fn created(&self) -> Vec<GitCommit> {
        self.inner.lock().unwrap().created.clone()
    }

    pub fn pushes(&self) -> Vec<String> {
        self.inner.lock().unwrap().pushes.clone()
    }

    pub fn resets(&self) -> usize {
        self.inner.lock().unwrap().resets
    }
}

impl GitRepository for MemoryGitRepository {
    fn resolve_commit(&self, id: &str) -> Result<GitCommit> {
        self.inner
            .lock()
            .unwrap()
            .commits
            .get(id)
            .cloned()
            .ok_or_else(|| TriageError::Git(format!("commit not found: {id}")))
    }

    fn log(&self, from: &str, excluding: &str) -> Result<Vec<GitCommit>> {
        let inner = self.inner.lock().unwrap();
        let ids = inner
            .logs
            .get(&(from.to_string(), excluding.to_string()))
            .cloned()
            .unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| inner.commits.get(id).cloned())
            .collect())
    }

    fn changed_files(&self, commit: &GitCommit) -> Result<Vec<String>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .changed_files
            .get(&commit.id)
            .cloned()
            .unwrap_or_default())
    }

    fn cherry_pick(&self, commit: &GitCommit) -> Result<bool> {
        Ok(!self.inner.lock().unwrap().conflicts.contains(&commit.id))
    }

    fn commit(&self, message: &str, author: &Identity, committer: &Identity) -> Result<GitCommit> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let commit = GitCommit {
            id: commit_id(inner.next_id),
            short_message: message.lines().next().unwrap_or_default().to_string(),
            full_message: message.to_string(),
            author: author.clone(),
            committer: committer.clone(),
        };
        inner.commits.insert(commit.id.clone(), commit.clone());
        inner.created.push(commit.clone());
        Ok(commit)
    }

    fn push(&self, remote: &str) -> Result<()> {
        self.inner.lock().unwrap().pushes.push(remote.to_string());
        Ok(())
    }

    fn reset_hard(&self) -> Result<()> {
        self.inner.lock().unwrap().resets += 1;
        Ok(())
    }
}

/// Test runner with a fixed verdict that records each invocation.
#[derive(Debug)]
pub struct StaticTestRunner {
    passes: bool,
    runs: Mutex<Vec<Vec<String>>>,
}

impl StaticTestRunner {
    pub fn passing() -> Self {
        Self {
            passes: true,
            runs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            passes: false,
            runs: Mutex::new(Vec::new()),
        }
    }

    pub fn runs(&self) -> Vec<Vec<String>> {
        self.runs.lock().unwrap().clone()
    }
}

impl TestRunner for StaticTestRunner {
    fn run_tests(&self, tests: &[String]) -> Result<bool> {
        self.runs.lock().unwrap().push(tests.to_vec());
        Ok(self.passes)
    }
}
