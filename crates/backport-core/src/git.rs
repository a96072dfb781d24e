//! Git collaborator.
//!
//! The engine only talks to [`GitRepository`]; [`CliGitRepository`] shells
//! out to the `git` binary of the working copy holding the downstream
//! branch.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::{Result, TriageError};

/// Name, email and timestamp of an author or committer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
    pub when: DateTime<FixedOffset>,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>, when: DateTime<FixedOffset>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            when,
        }
    }
}

/// An immutable commit as read from the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitCommit {
    /// Full 40-hex id.
    pub id: String,
    pub short_message: String,
    pub full_message: String,
    pub author: Identity,
    pub committer: Identity,
}

impl GitCommit {
    /// Abbreviated id for log lines.
    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(10)]
    }
}

/// Operations the triage engine needs from git.
pub trait GitRepository: Send + Sync {
    fn resolve_commit(&self, id: &str) -> Result<GitCommit>;

    /// Commits reachable from `from` but not from `excluding`, newest first.
    fn log(&self, from: &str, excluding: &str) -> Result<Vec<GitCommit>>;

    /// Paths touched by `commit`.
    fn changed_files(&self, commit: &GitCommit) -> Result<Vec<String>>;

    /// Apply `commit` to the index without committing. `Ok(false)` on
    /// conflict; the caller resets.
    fn cherry_pick(&self, commit: &GitCommit) -> Result<bool>;

    fn commit(&self, message: &str, author: &Identity, committer: &Identity) -> Result<GitCommit>;

    fn push(&self, remote: &str) -> Result<()>;

    fn reset_hard(&self) -> Result<()>;
}

const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';
const FORMAT: &str = "--format=%H%x1f%an%x1f%ae%x1f%aI%x1f%cn%x1f%ce%x1f%cI%x1f%s%x1f%B%x1e";

/// [`GitRepository`] backed by the `git` command line.
pub struct CliGitRepository {
    dir: PathBuf,
}

impl CliGitRepository {
    /// Open an existing working copy.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !is_git_repo(&dir) {
            return Err(TriageError::Git(format!(
                "not a git repository: {}",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn fetch(&self, remote: &str) -> Result<()> {
        self.run(&["fetch", remote], &[]).map(|_| ())
    }

    /// Check out `branch`, resetting it to `start_point`.
    pub fn checkout_branch(&self, branch: &str, start_point: &str) -> Result<()> {
        self.run(&["checkout", "-B", branch, start_point], &[])
            .map(|_| ())
    }

    pub fn head(&self) -> Result<String> {
        let sha = self.run(&["rev-parse", "HEAD"], &[])?.trim().to_string();
        if sha.is_empty() {
            return Err(TriageError::Git(
                "git rev-parse HEAD returned empty output".to_string(),
            ));
        }
        Ok(sha)
    }

    fn command(&self, args: &[&str], envs: &[(&str, String)]) -> Result<std::process::Output> {
        debug!(args = ?args, "git");
        Command::new("git")
            .args(args)
            .envs(envs.iter().map(|(k, v)| (*k, v.as_str())))
            .current_dir(&self.dir)
            .output()
            .map_err(|e| TriageError::Git(format!("failed to run git: {e}")))
    }

    fn run(&self, args: &[&str], envs: &[(&str, String)]) -> Result<String> {
        let output = self.command(args, envs)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TriageError::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl GitRepository for CliGitRepository {
    fn resolve_commit(&self, id: &str) -> Result<GitCommit> {
        let out = self.run(&["show", "-s", FORMAT, id], &[])?;
        parse_log(&out)?
            .into_iter()
            .next()
            .ok_or_else(|| TriageError::Git(format!("commit not found: {id}")))
    }

    fn log(&self, from: &str, excluding: &str) -> Result<Vec<GitCommit>> {
        let excluded = format!("^{excluding}");
        let out = self.run(&["log", FORMAT, from, &excluded], &[])?;
        parse_log(&out)
    }

    fn changed_files(&self, commit: &GitCommit) -> Result<Vec<String>> {
        let out = self.run(
            &["diff-tree", "--root", "--no-commit-id", "--name-only", "-r", &commit.id],
            &[],
        )?;
        Ok(out
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn cherry_pick(&self, commit: &GitCommit) -> Result<bool> {
        let output = self.command(&["cherry-pick", "--no-commit", &commit.id], &[])?;
        if !output.status.success() {
            debug!(
                commit = %commit.id,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "cherry-pick did not apply"
            );
        }
        Ok(output.status.success())
    }

    fn commit(&self, message: &str, author: &Identity, committer: &Identity) -> Result<GitCommit> {
        let envs = [
            ("GIT_AUTHOR_NAME", author.name.clone()),
            ("GIT_AUTHOR_EMAIL", author.email.clone()),
            ("GIT_AUTHOR_DATE", author.when.to_rfc3339()),
            ("GIT_COMMITTER_NAME", committer.name.clone()),
            ("GIT_COMMITTER_EMAIL", committer.email.clone()),
            ("GIT_COMMITTER_DATE", committer.when.to_rfc3339()),
        ];
        self.run(&["commit", "--allow-empty", "--cleanup=verbatim", "-m", message], &envs)?;
        self.resolve_commit("HEAD")
    }

    fn push(&self, remote: &str) -> Result<()> {
        self.run(&["push", remote, "HEAD"], &[]).map(|_| ())
    }

    fn reset_hard(&self) -> Result<()> {
        self.run(&["reset", "--hard", "HEAD"], &[]).map(|_| ())
    }
}

/// Check whether a directory is inside a git work tree.
pub fn is_git_repo(dir: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn parse_log(out: &str) -> Result<Vec<GitCommit>> {
    out.split(RECORD_SEP)
        .map(|record| record.trim_start_matches('\n'))
        .filter(|record| !record.trim().is_empty())
        .map(parse_record)
        .collect()
}

fn parse_record(record: &str) -> Result<GitCommit> {
    let fields: Vec<&str> = record.splitn(9, FIELD_SEP).collect();
    let [id, an, ae, ad, cn, ce, cd, subject, body] = fields[..] else {
        return Err(TriageError::Git(format!("malformed log record: {record:?}")));
    };

    let when = |s: &str| {
        DateTime::parse_from_rfc3339(s)
            .map_err(|e| TriageError::Git(format!("bad commit date {s:?}: {e}")))
    };

    Ok(GitCommit {
        id: id.to_string(),
        short_message: subject.to_string(),
        full_message: body.trim_end().to_string(),
        author: Identity::new(an, ae, when(ad)?),
        committer: Identity::new(cn, ce, when(cd)?),
    })
}
