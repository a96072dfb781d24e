//! Index of upstream commits already cherry-picked downstream.
//!
//! Built once per run from the downstream branch history and extended by the
//! executor after each successful cherry-pick.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{error, info, warn};

use crate::domain::ReleaseVersion;
use crate::git::GitCommit;

/// Where an upstream commit landed downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CherryPickRecord {
    pub release: ReleaseVersion,
    pub downstream_commit: String,
}

fn prepare_release_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Prepare release ([0-9]+\.[0-9]+\.[0-9]+.[0-9A-Za-z]+)")
            .expect("prepare release pattern is valid")
    })
}

fn cherry_picked_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"cherry picked from commit ([0-9a-f]{40})")
            .expect("cherry picked pattern is valid")
    })
}

#[derive(Debug, Clone, Default)]
pub struct CherryPickIndex {
    records: HashMap<String, CherryPickRecord>,
}

impl CherryPickIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the downstream log (newest first).
    ///
    /// A `Prepare release X` commit attributes release `X` to every older
    /// commit until the next such marker; commits newer than the first marker
    /// belong to `candidate`. A commit whose short message starts with
    /// `legacy_release_prefix` is a marker too, naming the release itself.
    /// When the recorded upstream id is unknown, an upstream commit with the
    /// same short message is used instead.
    pub fn build(
        downstream_log: &[GitCommit],
        upstream_commits: &[GitCommit],
        candidate: &ReleaseVersion,
        legacy_release_prefix: Option<&str>,
    ) -> Self {
        let by_id: HashMap<&str, &GitCommit> = upstream_commits
            .iter()
            .map(|c| (c.id.as_str(), c))
            .collect();

        let mut index = Self::new();
        let mut release = candidate.clone();

        for commit in downstream_log {
            if let Some(captures) = prepare_release_pattern().captures(&commit.short_message) {
                match captures[1].parse::<ReleaseVersion>() {
                    Ok(parsed) => {
                        info!(commit = %commit.short_id(), release = %parsed, "prepare release commit found");
                        release = parsed;
                    }
                    Err(e) => warn!(commit = %commit.short_id(), error = %e, "unparseable release commit"),
                }
            } else if legacy_release_prefix.is_some_and(|p| commit.short_message.starts_with(p)) {
                match commit.short_message.trim().parse::<ReleaseVersion>() {
                    Ok(parsed) => {
                        info!(commit = %commit.short_id(), release = %parsed, "legacy release commit found");
                        release = parsed;
                    }
                    Err(e) => warn!(commit = %commit.short_id(), error = %e, "unparseable legacy release commit"),
                }
            }

            let Some(captures) = cherry_picked_pattern().captures(&commit.full_message) else {
                continue;
            };
            let picked_id = &captures[1];

            let upstream = match by_id.get(picked_id) {
                Some(upstream) => Some(*upstream),
                None => {
                    error!(
                        picked = %picked_id,
                        summary = %commit.short_message,
                        "cherry-picked commit not found upstream"
                    );
                    let similar = upstream_commits
                        .iter()
                        .find(|c| c.short_message == commit.short_message);
                    if let Some(similar) = similar {
                        warn!(
                            upstream = %similar.id,
                            summary = %similar.short_message,
                            "similar cherry-picked commit found"
                        );
                    }
                    similar
                }
            };

            if let Some(upstream) = upstream {
                index.insert(
                    &upstream.id,
                    CherryPickRecord {
                        release: release.clone(),
                        downstream_commit: commit.id.clone(),
                    },
                );
            }
        }

        info!(cherry_picked = index.len(), "cherry-pick index built");
        index
    }

    pub fn get(&self, upstream_commit: &str) -> Option<&CherryPickRecord> {
        self.records.get(upstream_commit)
    }

    pub fn insert(&mut self, upstream_commit: &str, record: CherryPickRecord) {
        self.records.insert(upstream_commit.to_string(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
