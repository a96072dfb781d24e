//! End-to-end triage of single commits against in-memory git and tracker
//! fakes.

use std::collections::HashSet;
use std::sync::Arc;

use backport_core::fakes::{commit_id, git_commit, MemoryGitRepository, StaticTestRunner};
use backport_core::{
    AssigneeResolver, CherryPickIndex, CherryPickRecord, Commit, CommitReason, CommitState,
    CommitTask, Confirmations, GitCommit, IssueRegistry, TaskExecutor, TaskState, TaskType,
    TestRunner, TriageConfig, TriageEngine, TriageError, User, UserResolver,
    UPSTREAM_TEST_COVERAGE_LABEL,
};
use issue_tracker::fakes::{MemoryIssueTracker, TrackerCall};
use issue_tracker::{CustomerPriority, Issue, IssueState, IssueType, CLONERS_LINK_TYPE};

const RELEASE: &str = "AMQ 7.11.0.GA";
const UPSTREAM_KEY: &str = "ARTEMIS-1234";

struct Fixture {
    git: Arc<MemoryGitRepository>,
    downstream: Arc<MemoryIssueTracker>,
    upstream_issues: Vec<Issue>,
    downstream_issues: Vec<Issue>,
    users: Vec<User>,
    index: CherryPickIndex,
    config: TriageConfig,
    test_runner: Option<Arc<dyn TestRunner>>,
}

impl Fixture {
    fn new(candidate: &str) -> Self {
        Self {
            git: Arc::new(MemoryGitRepository::new()),
            downstream: Arc::new(MemoryIssueTracker::new("ENTMQBR")),
            upstream_issues: vec![Issue::new(UPSTREAM_KEY, IssueType::Bug, "Fix leak")],
            downstream_issues: Vec::new(),
            users: Vec::new(),
            index: CherryPickIndex::new(),
            config: TriageConfig::new(candidate.parse().unwrap()),
            test_runner: None,
        }
    }

    /// A downstream issue linked to the upstream issue.
    fn add_downstream(&mut self, key: &str, target: Option<&str>) -> &mut Issue {
        let mut issue = Issue::new(key, IssueType::Bug, "Fix leak");
        issue.target_release = target.map(str::to_string);
        issue.issues = vec![UPSTREAM_KEY.to_string()];
        self.downstream_issues.push(issue);
        self.downstream_issues.last_mut().unwrap()
    }

    fn commit(&self, n: u64, summary: &str, files: &[&str]) -> GitCommit {
        let commit = git_commit(commit_id(n), summary, "dev@example.com");
        self.git.add_commit(commit.clone(), files);
        commit
    }

    fn engine(&self, confirmations: Confirmations) -> TriageEngine {
        for issue in &self.downstream_issues {
            self.downstream.insert(issue.clone());
        }
        let registry = IssueRegistry::from_snapshots(
            self.upstream_issues.clone(),
            self.downstream_issues.clone(),
        );
        let mut executor = TaskExecutor::new(
            self.git.clone(),
            self.downstream.clone(),
            registry,
            self.index.clone(),
            self.config.clone(),
        );
        if let Some(runner) = &self.test_runner {
            executor = executor.with_test_runner(runner.clone());
        }
        let assignees =
            AssigneeResolver::new(Arc::new(UserResolver::new(self.users.clone())), "triager");
        TriageEngine::new(self.config.clone(), assignees, confirmations, executor).unwrap()
    }

    async fn process(&self, commit: &GitCommit, confirmations: Confirmations) -> Commit {
        self.engine(confirmations).process(commit).await.unwrap()
    }
}

/// A test command that cannot be started.
struct MissingTestCommand;

impl TestRunner for MissingTestCommand {
    fn run_tests(&self, _tests: &[String]) -> backport_core::Result<bool> {
        Err(TriageError::TestRunner("failed to run mvn: not found".to_string()))
    }
}

fn summary(tasks: &[CommitTask]) -> Vec<(TaskType, &str, Option<&str>, TaskState)> {
    tasks
        .iter()
        .map(|t| (t.task_type, t.key.as_str(), t.value.as_deref(), t.state))
        .collect()
}

fn confirm(previous: &Commit) -> Confirmations {
    Confirmations::from_commits(vec![previous.clone()])
}

/// The single-issue scenario: target release matches, issue ready for review,
/// qualifier label missing.
fn ready_fixture() -> Fixture {
    let mut fixture = Fixture::new("7.11.0.CR1");
    fixture
        .add_downstream("ENTMQBR-1", Some(RELEASE))
        .state = IssueState::ReadyForReview;
    fixture
}

#[tokio::test]
async fn test_commit_without_issue_key_is_skipped() {
    let fixture = Fixture::new("7.11.0.CR1");
    let commit = fixture.commit(1, "Fix typo in README", &[]);

    let result = fixture.process(&commit, Confirmations::default()).await;

    assert_eq!(result.state, CommitState::Skipped);
    assert_eq!(result.reason, Some(CommitReason::NoUpstreamIssue));
    assert!(result.tasks.is_empty());
    assert!(fixture.git.created().is_empty());
}

#[tokio::test]
async fn test_commit_with_two_issue_keys() {
    let mut fixture = Fixture::new("7.11.0.CR1");
    let commit = fixture.commit(1, "ARTEMIS-1234 ARTEMIS-1235 Fix leaks", &[]);

    let strict = fixture.process(&commit, Confirmations::default()).await;
    assert_eq!(strict.state, CommitState::Failed);
    assert_eq!(strict.reason, Some(CommitReason::MultipleUpstreamIssues));
    assert_eq!(strict.upstream_issue.as_deref(), Some(UPSTREAM_KEY));

    fixture.config.strict_upstream_issues = false;
    let lenient = fixture.process(&commit, Confirmations::default()).await;
    assert_eq!(lenient.state, CommitState::Skipped);
    assert_eq!(lenient.reason, Some(CommitReason::MultipleUpstreamIssues));
}

#[tokio::test]
async fn test_unknown_upstream_issue_fails() {
    let fixture = Fixture::new("7.11.0.CR1");
    let commit = fixture.commit(1, "ARTEMIS-9999 Unknown", &[]);

    let result = fixture.process(&commit, Confirmations::default()).await;

    assert_eq!(result.state, CommitState::Failed);
    assert_eq!(result.reason, Some(CommitReason::UpstreamIssueNotFound));
}

#[tokio::test]
async fn test_matching_issue_is_cherry_picked_and_labelled() {
    let fixture = ready_fixture();
    let commit = fixture.commit(1, "ARTEMIS-1234 Fix leak", &[]);

    let mut previous = Commit::new(&commit.id, &commit.short_message);
    previous.tasks = vec![CommitTask::unconfirmed(
        backport_core::TaskRequest::new(
            TaskType::AddDownstreamIssueLabel,
            "ENTMQBR-1",
            Some("CR1".to_string()),
        ),
        None,
    )];

    let result = fixture.process(&commit, confirm(&previous)).await;

    assert_eq!(result.state, CommitState::Done);
    assert_eq!(result.reason, None);
    assert_eq!(
        summary(&result.tasks),
        vec![
            (
                TaskType::CherryPickUpstreamCommit,
                commit.id.as_str(),
                Some("ENTMQBR-1"),
                TaskState::Executed
            ),
            (
                TaskType::AddDownstreamIssueLabel,
                "ENTMQBR-1",
                Some("CR1"),
                TaskState::Executed
            ),
        ]
    );

    let created = fixture.git.created();
    assert_eq!(created.len(), 1);
    assert_eq!(result.downstream_commit.as_deref(), Some(created[0].id.as_str()));
    assert_eq!(result.tasks[0].result.as_deref(), Some(created[0].id.as_str()));
    assert_eq!(
        created[0].full_message,
        format!(
            "ARTEMIS-1234 Fix leak\n(cherry picked from commit {})\n\ndownstream: ENTMQBR-1",
            commit.id
        )
    );
    assert_eq!(created[0].author, commit.author);
    assert_eq!(created[0].committer.name, "rh-messaging-ci");
    assert_eq!(fixture.git.pushes(), vec!["origin".to_string()]);

    assert_eq!(
        fixture.downstream.calls(),
        vec![TrackerCall::AddLabels {
            key: "ENTMQBR-1".to_string(),
            labels: vec!["CR1".to_string()],
        }]
    );
    assert!(fixture.downstream.issue("ENTMQBR-1").unwrap().has_label("CR1"));
    assert_eq!(result.assignee.as_deref(), Some("triager"));
    assert!(result.tasks.iter().all(|t| t.assignee.as_deref() == Some("triager")));
}

#[tokio::test]
async fn test_unconfirmed_consistency_tasks_leave_commit_incomplete() {
    let fixture = ready_fixture();
    let commit = fixture.commit(
        1,
        "ARTEMIS-1234 Fix leak",
        &["tests/src/test/java/org/apache/LeakTest.java"],
    );

    let result = fixture.process(&commit, Confirmations::default()).await;

    assert_eq!(result.state, CommitState::Incomplete);
    assert_eq!(result.tests, vec!["org.apache.LeakTest".to_string()]);
    assert_eq!(
        summary(&result.tasks[1..]),
        vec![
            (
                TaskType::AddDownstreamIssueLabel,
                "ENTMQBR-1",
                Some("CR1"),
                TaskState::Unconfirmed
            ),
            (
                TaskType::AddDownstreamIssueLabel,
                "ENTMQBR-1",
                Some(UPSTREAM_TEST_COVERAGE_LABEL),
                TaskState::Unconfirmed
            ),
        ]
    );
    assert!(fixture.downstream.calls().is_empty());
}

#[tokio::test]
async fn test_future_ga_issue_requires_release_clone() {
    let mut fixture = Fixture::new("7.11.0.CR1");
    fixture.config.require_release_issues = true;
    {
        let issue = fixture.add_downstream("ENTMQBR-1", Some("Future GA"));
        issue.customer = true;
        issue.customer_priority = CustomerPriority::High;
    }
    fixture.add_downstream("ENTMQBR-2", Some(""));
    let commit = fixture.commit(1, "ARTEMIS-1234 Fix leak", &[]);

    let result = fixture.process(&commit, Confirmations::default()).await;

    assert_eq!(result.state, CommitState::Blocked);
    assert_eq!(
        result.reason,
        Some(CommitReason::NoDownstreamIssuesWithRequiredTargetRelease)
    );
    assert_eq!(
        summary(&result.tasks),
        vec![
            (
                TaskType::CloneDownstreamIssue,
                "ENTMQBR-1",
                None,
                TaskState::Unconfirmed
            ),
            (
                TaskType::CloneDownstreamIssue,
                "ENTMQBR-2",
                None,
                TaskState::Unconfirmed
            ),
        ]
    );
    assert_eq!(result.downstream_issues, vec!["ENTMQBR-1", "ENTMQBR-2"]);
    assert!(fixture.git.created().is_empty());
}

#[tokio::test]
async fn test_confirmed_release_clone_is_created_and_linked() {
    let mut fixture = Fixture::new("7.11.1.CR1");
    {
        let issue = fixture.add_downstream("ENTMQBR-1", Some("AMQ 7.11.0.GA"));
        issue.patch = true;
        issue.assignee = Some("owner".to_string());
        issue.description = Some("Leak details".to_string());
        issue.labels = vec!["CR2".to_string(), "customer".to_string()];
    }
    let commit = fixture.commit(1, "ARTEMIS-1234 Fix leak", &[]);

    let first = fixture.process(&commit, Confirmations::default()).await;
    assert_eq!(first.state, CommitState::Blocked);

    let mut engine = fixture.engine(confirm(&first));
    let second = engine.process(&commit).await.unwrap();

    assert_eq!(second.state, CommitState::Done);
    assert_eq!(second.tasks[0].state, TaskState::Executed);
    let clone_key = second.tasks[0].result.clone().unwrap();

    let clone = fixture.downstream.issue(&clone_key).unwrap();
    assert_eq!(clone.summary, "[7.11] Fix leak");
    assert_eq!(clone.description.as_deref(), Some("Leak details"));
    assert_eq!(clone.assignee.as_deref(), Some("owner"));
    assert_eq!(clone.target_release.as_deref(), Some("AMQ 7.11.1.GA"));
    assert_eq!(clone.labels, vec!["customer".to_string()]);
    assert_eq!(clone.issues, vec![UPSTREAM_KEY.to_string()]);

    assert!(fixture.downstream.calls().contains(&TrackerCall::Link {
        key: clone_key.clone(),
        linked_key: "ENTMQBR-1".to_string(),
        link_type: CLONERS_LINK_TYPE.to_string(),
    }));

    let registry = engine.executor().registry();
    assert!(registry
        .downstream_keys_for(UPSTREAM_KEY)
        .contains(&clone_key));
    assert_eq!(registry.upstream_keys_for(&clone_key), &[UPSTREAM_KEY.to_string()]);
}

#[tokio::test]
async fn test_clone_of_issue_with_several_upstream_links_fails() {
    let mut fixture = Fixture::new("7.11.1.CR1");
    fixture
        .upstream_issues
        .push(Issue::new("ARTEMIS-1", IssueType::Bug, "Other"));
    {
        let issue = fixture.add_downstream("ENTMQBR-1", Some("AMQ 7.11.0.GA"));
        issue.patch = true;
        issue.issues.push("ARTEMIS-1".to_string());
    }
    let commit = fixture.commit(1, "ARTEMIS-1234 Fix leak", &[]);
    let first = fixture.process(&commit, Confirmations::default()).await;

    let second = fixture.process(&commit, confirm(&first)).await;

    assert_eq!(second.state, CommitState::Blocked);
    assert_eq!(second.tasks[0].state, TaskState::Failed);
    assert!(fixture.downstream.calls().is_empty());
}

#[tokio::test]
async fn test_unworthy_issue_in_other_release_is_skipped() {
    let mut fixture = Fixture::new("7.11.1.CR1");
    fixture.add_downstream("ENTMQBR-1", Some("AMQ 7.11.0.GA"));
    let commit = fixture.commit(1, "ARTEMIS-1234 Fix leak", &[]);

    let result = fixture.process(&commit, Confirmations::default()).await;
    assert_eq!(result.state, CommitState::Skipped);
    assert_eq!(result.reason, Some(CommitReason::DownstreamIssueNotSufficient));

    let confirmations = Confirmations {
        downstream_issues: Some(HashSet::from(["ENTMQBR-1".to_string()])),
        ..Confirmations::default()
    };
    let result = fixture.process(&commit, confirmations).await;
    assert_eq!(result.state, CommitState::Blocked);
}

#[tokio::test]
async fn test_conflicting_cherry_pick_is_reset() {
    let fixture = ready_fixture();
    let commit = fixture.commit(1, "ARTEMIS-1234 Fix leak", &[]);
    fixture.git.add_conflict(&commit.id);

    let result = fixture.process(&commit, Confirmations::default()).await;

    assert_eq!(result.state, CommitState::Todo);
    assert_eq!(result.reason, Some(CommitReason::CherryPickFailed));
    assert_eq!(result.tasks.len(), 1);
    assert_eq!(result.tasks[0].state, TaskState::Failed);
    assert_eq!(result.tasks[0].result.as_deref(), Some("CHERRY_PICK_FAILED"));
    assert_eq!(fixture.git.resets(), 1);
    assert!(fixture.git.created().is_empty());
    assert!(result.downstream_commit.is_none());
}

#[tokio::test]
async fn test_failing_commit_tests_reset_the_branch() {
    let mut fixture = ready_fixture();
    let runner = Arc::new(StaticTestRunner::failing());
    fixture.test_runner = Some(runner.clone());
    let commit = fixture.commit(
        1,
        "ARTEMIS-1234 Fix leak",
        &["src/test/java/org/apache/LeakTest.java"],
    );

    let result = fixture.process(&commit, Confirmations::default()).await;

    assert_eq!(result.state, CommitState::Todo);
    assert_eq!(result.tasks[0].state, TaskState::Failed);
    assert_eq!(runner.runs(), vec![vec!["org.apache.LeakTest".to_string()]]);
    assert_eq!(fixture.git.resets(), 1);
    assert!(fixture.git.created().is_empty());
}

#[tokio::test]
async fn test_test_runner_error_resets_the_branch() {
    let mut fixture = ready_fixture();
    fixture.test_runner = Some(Arc::new(MissingTestCommand));
    let commit = fixture.commit(
        1,
        "ARTEMIS-1234 Fix leak",
        &["src/test/java/org/apache/LeakTest.java"],
    );

    let err = fixture
        .engine(Confirmations::default())
        .process(&commit)
        .await
        .unwrap_err();

    assert!(matches!(err, TriageError::TestRunner(_)));
    assert_eq!(fixture.git.resets(), 1);
    assert!(fixture.git.created().is_empty());
}

#[tokio::test]
async fn test_skip_commit_test_bypasses_runner() {
    let mut fixture = ready_fixture();
    let runner = Arc::new(StaticTestRunner::failing());
    fixture.test_runner = Some(runner.clone());
    fixture.config.skip_commit_test = true;
    let commit = fixture.commit(
        1,
        "ARTEMIS-1234 Fix leak",
        &["src/test/java/org/apache/LeakTest.java"],
    );

    let result = fixture.process(&commit, Confirmations::default()).await;

    assert_eq!(result.tasks[0].state, TaskState::Executed);
    assert!(runner.runs().is_empty());
}

#[tokio::test]
async fn test_scratch_mode_performs_no_side_effects() {
    let mut fixture = ready_fixture();
    fixture.config.scratch = true;
    let commit = fixture.commit(1, "ARTEMIS-1234 Fix leak", &[]);
    let first = fixture.process(&commit, Confirmations::default()).await;

    let result = fixture.process(&commit, confirm(&first)).await;

    assert_eq!(result.state, CommitState::Todo);
    assert_eq!(result.tasks.len(), 1);
    assert_eq!(result.tasks[0].state, TaskState::Scratched);
    assert!(fixture.git.created().is_empty());
    assert!(fixture.git.pushes().is_empty());
    assert!(fixture.downstream.calls().is_empty());
}

#[tokio::test]
async fn test_scratch_mode_scratches_confirmed_issue_tasks() {
    let mut fixture = Fixture::new("7.11.0.CR1");
    fixture.add_downstream("ENTMQBR-1", Some(RELEASE));
    fixture.index.insert(
        &commit_id(1),
        CherryPickRecord {
            release: "7.11.0.CR1".parse().unwrap(),
            downstream_commit: commit_id(0x51),
        },
    );
    let commit = fixture.commit(1, "ARTEMIS-1234 Fix leak", &[]);
    let first = fixture.process(&commit, Confirmations::default()).await;
    assert_eq!(first.state, CommitState::Incomplete);

    fixture.config.scratch = true;
    let result = fixture.process(&commit, confirm(&first)).await;

    assert_eq!(result.state, CommitState::Incomplete);
    assert!(result.tasks.iter().all(|t| t.state == TaskState::Scratched));
    assert!(fixture.downstream.calls().is_empty());
}

#[tokio::test]
async fn test_upstream_bug_without_downstream_issue_is_blocked() {
    let mut fixture = Fixture::new("7.11.0.CR1");
    fixture.users = vec![User {
        username: "dev".to_string(),
        name: Some("Dev".to_string()),
        emails: vec!["dev@example.com".to_string()],
        upstream_username: Some("dev-apache".to_string()),
        downstream_username: Some("dev-rh".to_string()),
    }];
    fixture.upstream_issues[0].description = Some("Leak".to_string());
    let commit = fixture.commit(
        1,
        "ARTEMIS-1234 Fix leak",
        &["src/test/java/org/apache/LeakTest.java"],
    );

    let first = fixture.process(&commit, Confirmations::default()).await;
    assert_eq!(first.state, CommitState::Blocked);
    assert_eq!(first.reason, None);
    assert_eq!(first.assignee.as_deref(), Some("dev"));
    assert_eq!(
        summary(&first.tasks),
        vec![(
            TaskType::CloneUpstreamIssue,
            UPSTREAM_KEY,
            None,
            TaskState::Unconfirmed
        )]
    );

    let second = fixture.process(&commit, confirm(&first)).await;
    assert_eq!(second.state, CommitState::Blocked);
    let created_key = second.tasks[0].result.clone().unwrap();
    let created = fixture.downstream.issue(&created_key).unwrap();
    assert_eq!(created.summary, "Fix leak");
    assert_eq!(created.assignee.as_deref(), Some("dev-rh"));
    assert_eq!(created.target_release.as_deref(), Some(RELEASE));
    assert_eq!(
        created.labels,
        vec!["CR1".to_string(), UPSTREAM_TEST_COVERAGE_LABEL.to_string()]
    );
    assert_eq!(
        created.issues,
        vec![format!("https://issues.apache.org/jira/browse/{UPSTREAM_KEY}")]
    );
}

#[tokio::test]
async fn test_upstream_task_without_downstream_issue_is_skipped() {
    let mut fixture = Fixture::new("7.11.0.CR1");
    fixture.upstream_issues[0].issue_type = IssueType::Improvement;
    let commit = fixture.commit(1, "ARTEMIS-1234 Improve logging", &[]);

    let result = fixture.process(&commit, Confirmations::default()).await;

    assert_eq!(result.state, CommitState::Skipped);
    assert_eq!(result.reason, Some(CommitReason::UpstreamIssueNotSufficient));
}

#[tokio::test]
async fn test_later_commit_sees_issue_created_earlier_in_run() {
    let mut fixture = Fixture::new("7.11.0.CR1");
    let first_commit = fixture.commit(1, "ARTEMIS-1234 Fix leak", &[]);
    let second_commit = fixture.commit(2, "ARTEMIS-1234 Fix leak in tests", &[]);

    let mut previous = Commit::new(&first_commit.id, &first_commit.short_message);
    previous.tasks = vec![CommitTask::unconfirmed(
        backport_core::TaskRequest::new(TaskType::CloneUpstreamIssue, UPSTREAM_KEY, None),
        None,
    )];
    fixture.config.check_incomplete_commits = false;

    let mut engine = fixture.engine(confirm(&previous));
    let first = engine.process(&first_commit).await.unwrap();
    let second = engine.process(&second_commit).await.unwrap();

    assert_eq!(first.state, CommitState::Blocked);
    let created_key = first.tasks[0].result.clone().unwrap();
    assert_eq!(second.state, CommitState::Done);
    assert_eq!(second.downstream_issues, vec![created_key.clone()]);
    assert_eq!(second.tasks[0].task_type, TaskType::CherryPickUpstreamCommit);
    assert_eq!(second.tasks[0].value.as_deref(), Some(created_key.as_str()));
}

#[tokio::test]
async fn test_cherry_picked_commit_with_consistent_issue_is_done() {
    let mut fixture = Fixture::new("7.11.0.CR2");
    {
        let issue = fixture.add_downstream("ENTMQBR-1", Some(RELEASE));
        issue.labels = vec!["CR1".to_string()];
        issue.state = IssueState::Closed;
    }
    fixture.index.insert(
        &commit_id(1),
        CherryPickRecord {
            release: "7.11.0.CR1".parse().unwrap(),
            downstream_commit: commit_id(0x51),
        },
    );
    let commit = fixture.commit(1, "ARTEMIS-1234 Fix leak", &[]);

    let result = fixture.process(&commit, Confirmations::default()).await;

    assert_eq!(result.state, CommitState::Done);
    assert!(result.tasks.is_empty());
    assert_eq!(result.release_version.as_deref(), Some("7.11.0.CR1"));
    assert_eq!(result.downstream_commit, Some(commit_id(0x51)));
}

#[tokio::test]
async fn test_cherry_picked_commit_without_downstream_issue() {
    let mut fixture = Fixture::new("7.11.0.CR1");
    for n in [1, 2] {
        fixture.index.insert(
            &commit_id(n),
            CherryPickRecord {
                release: "7.11.0.CR1".parse().unwrap(),
                downstream_commit: commit_id(0x50 + n),
            },
        );
    }
    let tracked = fixture.commit(1, "ARTEMIS-1234 Fix leak", &[]);
    let untracked = fixture.commit(2, "NO-JIRA Bump version", &[]);

    let result = fixture.process(&tracked, Confirmations::default()).await;
    assert_eq!(result.state, CommitState::Incomplete);
    assert_eq!(result.reason, Some(CommitReason::NoDownstreamIssues));

    let result = fixture.process(&untracked, Confirmations::default()).await;
    assert_eq!(result.state, CommitState::Done);
}

#[tokio::test]
async fn test_rerun_with_same_confirmations_is_idempotent() {
    let run = |confirmations: Confirmations| async move {
        let fixture = ready_fixture();
        let commit = fixture.commit(1, "ARTEMIS-1234 Fix leak", &[]);
        fixture.process(&commit, confirmations).await
    };

    let first = run(Confirmations::default()).await;
    assert_eq!(first.state, CommitState::Incomplete);

    let second = run(confirm(&first)).await;
    let third = run(confirm(&second)).await;
    let again = run(confirm(&first)).await;

    assert_eq!(second.state, CommitState::Done);
    assert_eq!(third.state, second.state);
    assert_eq!(third.tasks, second.tasks);
    assert_eq!(again.tasks, second.tasks);
}
