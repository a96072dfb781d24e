//! Pure triage decisions.
//!
//! Nothing here touches git or a tracker: the inputs are the already loaded
//! issues and the cherry-pick record, the output is what the engine must do.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use issue_tracker::{Issue, IssueState, IssueType, FUTURE_GA_RELEASE};
use regex::Regex;
use tracing::warn;

use crate::config::{TriageConfig, NO_TESTING_NEEDED_LABEL, UPSTREAM_TEST_COVERAGE_LABEL};
use crate::domain::{CommitReason, CommitState, ReleaseVersion, TaskRequest, TaskType};

/// Upstream issue keys in a commit summary, in order of appearance.
pub fn extract_issue_keys(pattern: &Regex, summary: &str) -> Vec<String> {
    pattern
        .find_iter(summary)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Dotted class names of the test sources among `files`.
///
/// The file extension is taken from the configured test suffix.
pub fn commit_tests(files: &[String], config: &TriageConfig) -> Vec<String> {
    let extension = config
        .test_suffix
        .rfind('.')
        .map(|i| &config.test_suffix[i..]);
    files
        .iter()
        .filter(|f| f.ends_with(&config.test_suffix))
        .filter_map(|f| {
            let start = f.find(&config.test_path)? + config.test_path.len();
            let source = &f[start..];
            let path = extension
                .and_then(|e| source.strip_suffix(e))
                .unwrap_or(source);
            Some(path.replace('/', "."))
        })
        .collect()
}

/// Early exit for commits whose upstream issue cannot be determined.
///
/// Cherry-picked commits are never stopped here.
pub fn screen(
    upstream_keys: &[String],
    upstream_found: bool,
    cherry_picked: bool,
    config: &TriageConfig,
) -> Option<(CommitState, CommitReason)> {
    if cherry_picked {
        return None;
    }
    let unresolved = if config.strict_upstream_issues {
        CommitState::Failed
    } else {
        CommitState::Skipped
    };

    match upstream_keys.len() {
        0 => Some((CommitState::Skipped, CommitReason::NoUpstreamIssue)),
        1 if !upstream_found => Some((unresolved, CommitReason::UpstreamIssueNotFound)),
        1 => None,
        _ => Some((unresolved, CommitReason::MultipleUpstreamIssues)),
    }
}

/// Group issues by target release.
///
/// Empty and sentinel targets fall under the sentinel when release issues are
/// required, otherwise under `release_name`. Link order is kept within a
/// group.
pub fn group_by_target_release<'a>(
    issues: &[&'a Issue],
    release_name: &str,
    require_release_issues: bool,
) -> BTreeMap<String, Vec<&'a Issue>> {
    let mut groups: BTreeMap<String, Vec<&'a Issue>> = BTreeMap::new();
    for issue in issues {
        let target = match issue.concrete_target_release() {
            Some(target) => target.to_string(),
            None if require_release_issues => FUTURE_GA_RELEASE.to_string(),
            None => {
                warn!(issue = %issue.key, "downstream issue without target release");
                release_name.to_string()
            }
        };
        groups.entry(target).or_default().push(issue);
    }
    groups
}

/// Pick the target release whose issues drive the decision.
///
/// The exact release wins; otherwise any concrete release beats the sentinel
/// and the highest concrete release wins.
pub fn select_release<'a, I>(releases: I, release_name: &str) -> Option<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut selected: Option<&String> = None;
    for release in releases {
        if release == release_name {
            return Some(release.clone());
        }
        selected = match selected {
            None => Some(release),
            Some(current) if compare_targets(release, current) == Ordering::Greater => {
                Some(release)
            }
            keep => keep,
        };
    }
    selected.cloned()
}

/// Sentinel lowest, then parsed release order, then plain string order.
fn compare_targets(a: &str, b: &str) -> Ordering {
    let rank = |s: &str| (s != FUTURE_GA_RELEASE, s.parse::<ReleaseVersion>().ok());
    rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
}

/// Whether any downstream issue justifies cherry-picking.
///
/// An explicit confirmation list replaces the default policy: a Bug that is
/// customer-impacted at or above the priority threshold, security-sensitive
/// at or above the impact threshold, or flagged as a customer patch.
pub fn requires_cherry_pick(
    issues: &[&Issue],
    config: &TriageConfig,
    confirmed: Option<&HashSet<String>>,
) -> bool {
    issues.iter().any(|issue| match confirmed {
        Some(confirmed) => confirmed.contains(&issue.key),
        None => {
            issue.issue_type == IssueType::Bug
                && ((issue.customer
                    && issue.customer_priority >= config.customer_priority_threshold)
                    || (issue.security
                        && issue.security_impact >= config.security_impact_threshold)
                    || issue.patch)
        }
    })
}

/// Whether an upstream issue without downstream issues deserves one.
pub fn upstream_issue_worthy(issue: &Issue, confirmed: Option<&HashSet<String>>) -> bool {
    match confirmed {
        Some(confirmed) => confirmed.contains(&issue.key),
        None => issue.issue_type == IssueType::Bug,
    }
}

/// Tasks that bring a downstream issue in line with a delivered commit.
pub fn consistency_tasks(
    issue: &Issue,
    release_name: &str,
    qualifier: &str,
    has_tests: bool,
    config: &TriageConfig,
) -> Vec<TaskRequest> {
    if !config.check_incomplete_commits {
        return Vec::new();
    }

    let mut tasks = Vec::new();
    let key = &issue.key;

    if issue.target_release.as_deref() != Some(release_name) {
        tasks.push(TaskRequest::new(
            TaskType::SetDownstreamIssueTargetRelease,
            key,
            Some(release_name.to_string()),
        ));
    }
    if !issue.has_label(qualifier) {
        tasks.push(TaskRequest::new(
            TaskType::AddDownstreamIssueLabel,
            key,
            Some(qualifier.to_string()),
        ));
    }
    if has_tests
        && !issue.has_label(UPSTREAM_TEST_COVERAGE_LABEL)
        && !issue.has_label(NO_TESTING_NEEDED_LABEL)
    {
        tasks.push(TaskRequest::new(
            TaskType::AddDownstreamIssueLabel,
            key,
            Some(UPSTREAM_TEST_COVERAGE_LABEL.to_string()),
        ));
    }
    if !matches!(issue.state, IssueState::ReadyForReview | IssueState::Closed) {
        tasks.push(TaskRequest::new(
            TaskType::TransitionDownstreamIssue,
            key,
            Some(IssueState::ReadyForReview.as_str().to_string()),
        ));
    }
    tasks
}

/// What the engine must do with a commit that passed [`screen`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Final state without any task.
    Settled {
        state: CommitState,
        reason: Option<CommitReason>,
    },
    /// Run the consistency check on the selected issues; DONE when every
    /// spawned task executed, else INCOMPLETE.
    CheckDownstreamIssues,
    /// Clone every selected issue into the release; DONE when all clones
    /// executed, else `otherwise` with
    /// `NO_DOWNSTREAM_ISSUES_WITH_REQUIRED_TARGET_RELEASE`.
    CloneDownstreamIssues { otherwise: CommitState },
    /// Cherry-pick; on success optionally run the consistency check.
    CherryPick { check_after: bool },
    /// Create a downstream issue from the upstream one; always BLOCKED.
    CloneUpstreamIssue,
}

impl Disposition {
    fn settled(state: CommitState, reason: Option<CommitReason>) -> Self {
        Disposition::Settled { state, reason }
    }
}

/// Everything [`classify`] looks at.
#[derive(Debug, Clone)]
pub struct TriageInput<'a> {
    pub summary: &'a str,
    pub upstream_issue: Option<&'a Issue>,
    /// Downstream issues linked to the upstream issue, in link order.
    pub downstream_issues: Vec<&'a Issue>,
    /// Release recorded in the cherry-pick index, if already picked.
    pub cherry_picked_release: Option<&'a ReleaseVersion>,
    pub confirmed_upstream_issues: Option<&'a HashSet<String>>,
    pub confirmed_downstream_issues: Option<&'a HashSet<String>>,
}

/// Outcome of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triage {
    /// Effective release: the cherry-pick release or the candidate.
    pub release: ReleaseVersion,
    pub release_name: String,
    pub selected_release: Option<String>,
    /// Keys of the issues in the selected group.
    pub selected: Vec<String>,
    /// Keys of every grouped downstream issue.
    pub downstream_issues: Vec<String>,
    pub disposition: Disposition,
}

impl Triage {
    pub fn qualifier(&self) -> &str {
        self.release.qualifier()
    }
}

/// Decide what to do with one upstream commit.
pub fn classify(input: &TriageInput<'_>, config: &TriageConfig) -> Triage {
    let cherry_picked = input.cherry_picked_release.is_some();
    let release = input
        .cherry_picked_release
        .unwrap_or(&config.candidate)
        .clone();
    let release_name = release.release_name(&config.product);
    let other_release = release.cmp_without_qualifier(&config.candidate) != Ordering::Equal;

    let groups = group_by_target_release(
        &input.downstream_issues,
        &release_name,
        config.require_release_issues,
    );
    let selected_release = select_release(groups.keys(), &release_name);
    let selected: Vec<&Issue> = selected_release
        .as_ref()
        .and_then(|r| groups.get(r))
        .cloned()
        .unwrap_or_default();
    let all: Vec<&Issue> = groups.values().flatten().copied().collect();

    let mut downstream_issues: Vec<String> = Vec::with_capacity(all.len());
    for issue in &all {
        if !downstream_issues.contains(&issue.key) {
            downstream_issues.push(issue.key.clone());
        }
    }

    let target_matches = selected_release.as_deref() == Some(release_name.as_str());

    let disposition = match (selected.is_empty(), cherry_picked) {
        (_, true) if other_release => Disposition::settled(CommitState::Done, None),
        (false, true) if target_matches => Disposition::CheckDownstreamIssues,
        (false, true) if config.require_release_issues => Disposition::CloneDownstreamIssues {
            otherwise: CommitState::Incomplete,
        },
        (false, true) => Disposition::settled(CommitState::Done, None),
        (false, false) if target_matches => Disposition::CherryPick { check_after: true },
        (false, false) => {
            if !requires_cherry_pick(&all, config, input.confirmed_downstream_issues) {
                Disposition::settled(
                    CommitState::Skipped,
                    Some(CommitReason::DownstreamIssueNotSufficient),
                )
            } else if config.require_release_issues {
                Disposition::CloneDownstreamIssues {
                    otherwise: CommitState::Blocked,
                }
            } else {
                Disposition::CherryPick { check_after: false }
            }
        }
        (true, true) => {
            if input.summary.starts_with(&config.no_issue_prefix)
                || !config.check_incomplete_commits
            {
                Disposition::settled(CommitState::Done, None)
            } else {
                Disposition::settled(
                    CommitState::Incomplete,
                    Some(CommitReason::NoDownstreamIssues),
                )
            }
        }
        (true, false) => match input.upstream_issue {
            Some(issue) if upstream_issue_worthy(issue, input.confirmed_upstream_issues) => {
                Disposition::CloneUpstreamIssue
            }
            Some(_) => Disposition::settled(
                CommitState::Skipped,
                Some(CommitReason::UpstreamIssueNotSufficient),
            ),
            None => Disposition::settled(
                CommitState::Skipped,
                Some(CommitReason::UpstreamIssueNotFound),
            ),
        },
    };

    Triage {
        release,
        release_name,
        selected_release,
        selected: selected.iter().map(|i| i.key.clone()).collect(),
        downstream_issues,
        disposition,
    }
}
