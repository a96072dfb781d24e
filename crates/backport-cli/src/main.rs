//! Backport - upstream commit triage CLI
//!
//! The `backport` command walks the upstream commits missing from a
//! downstream release branch, cherry-picks what the downstream tracker asks
//! for, and records every remaining action as a task for a human to confirm.
//!
//! ## Commands
//!
//! - `triage`: run the triage and persist commits, snapshots and the report
//! - `report`: print the report of the last run

use anyhow::{Context, Result};
use backport_core::{
    run, CliGitRepository, Collaborators, Commit, CommandTestRunner, Confirmations, Report,
    ReportEntry, ReleaseVersion, RunSettings, TestRunner, TriageConfig,
};
use backport_state::{load_document, FsStateStore, StateDocument};
use clap::{Args, Parser, Subcommand};
use issue_tracker::{CustomerPriority, JiraClient, JiraConfig, SecurityImpact};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "backport")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Upstream commit triage for downstream release branches", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Triage the upstream commits missing from the downstream branch
    Triage(TriageArgs),

    /// Print the report of the last run
    Report {
        /// Directory holding the run state documents
        #[arg(long, default_value = ".backport")]
        state_dir: PathBuf,

        /// Print the raw report document
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Args)]
struct TriageArgs {
    /// Default assignee, i.e. jdoe
    #[arg(short, long)]
    assignee: String,

    /// Release to prepare, i.e. "AMQ 7.11.0.GA"
    #[arg(short, long)]
    release: ReleaseVersion,

    /// Release candidate qualifier, i.e. CR1
    #[arg(short, long)]
    qualifier: String,

    /// Upstream branch to cherry-pick from
    #[arg(short, long, default_value = "main")]
    upstream_branch: String,

    /// Downstream branch to cherry-pick to, i.e. 2.28.0.jbossorg-x
    #[arg(short, long)]
    downstream_branch: String,

    #[arg(long, default_value = "upstream")]
    upstream_remote: String,

    #[arg(long, default_value = "origin")]
    downstream_remote: String,

    /// Working copy with both remotes configured
    #[arg(long, default_value = ".")]
    repo_dir: PathBuf,

    /// Directory holding the run state documents
    #[arg(long, default_value = ".backport")]
    state_dir: PathBuf,

    /// Use the remote refs as they are
    #[arg(long)]
    no_fetch: bool,

    #[arg(
        long,
        env = "UPSTREAM_ISSUES_URL",
        default_value = "https://issues.apache.org/jira/rest/api/2"
    )]
    upstream_issues_url: String,

    #[arg(long, env = "UPSTREAM_ISSUES_PROJECT", default_value = "ARTEMIS")]
    upstream_issues_project: String,

    #[arg(long, env = "UPSTREAM_ISSUES_TOKEN", hide_env_values = true)]
    upstream_issues_token: Option<String>,

    #[arg(
        long,
        env = "DOWNSTREAM_ISSUES_URL",
        default_value = "https://issues.redhat.com/rest/api/2"
    )]
    downstream_issues_url: String,

    #[arg(long, env = "DOWNSTREAM_ISSUES_PROJECT", default_value = "ENTMQBR")]
    downstream_issues_project: String,

    #[arg(long, env = "DOWNSTREAM_ISSUES_TOKEN", hide_env_values = true)]
    downstream_issues_token: Option<String>,

    /// Commit records of a previous run whose tasks are confirmed
    #[arg(long)]
    confirmed_commits: Option<PathBuf>,

    /// Upstream issues worth a downstream issue; others are skipped
    #[arg(long, value_delimiter = ',')]
    confirmed_upstream_issues: Option<Vec<String>>,

    /// Downstream issues worth a cherry-pick; others are skipped
    #[arg(long, value_delimiter = ',')]
    confirmed_downstream_issues: Option<Vec<String>>,

    /// Lowest customer priority that justifies a cherry-pick
    #[arg(long, default_value = "low")]
    customer_priority_threshold: CustomerPriority,

    /// Lowest security impact that justifies a cherry-pick
    #[arg(long, default_value = "low")]
    security_impact_threshold: SecurityImpact,

    /// Check the tasks of cherry-picked commits
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    check_incomplete_commits: bool,

    /// Only skip commits with several or unknown upstream issues
    #[arg(long)]
    lenient: bool,

    /// Perform nothing, record what would have been done
    #[arg(long)]
    scratch: bool,

    /// Cherry-pick without running the commit tests
    #[arg(long)]
    skip_commit_test: bool,

    /// Test command, `{tests}` expands to the comma-separated test classes
    #[arg(long)]
    test_command: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    backport_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Triage(args) => cmd_triage(args).await,
        Commands::Report { state_dir, raw } => cmd_report(&state_dir, raw).await,
    }
}

async fn cmd_triage(args: TriageArgs) -> Result<()> {
    let config = triage_config(&args);
    let confirmations = load_confirmations(
        args.confirmed_commits.as_deref(),
        args.confirmed_upstream_issues.clone(),
        args.confirmed_downstream_issues.clone(),
    )?;

    let upstream_ref = format!("{}/{}", args.upstream_remote, args.upstream_branch);
    let downstream_ref = format!("{}/{}", args.downstream_remote, args.downstream_branch);

    let git = CliGitRepository::open(&args.repo_dir)
        .with_context(|| format!("Failed to open repository {:?}", args.repo_dir))?;
    if !args.no_fetch {
        git.fetch(&args.downstream_remote)?;
        git.fetch(&args.upstream_remote)?;
    }
    git.checkout_branch(&args.downstream_branch, &downstream_ref)
        .with_context(|| format!("Failed to check out {}", args.downstream_branch))?;
    info!(branch = %args.downstream_branch, head = %git.head()?, "downstream branch ready");

    let test_runner: Arc<dyn TestRunner> = match &args.test_command {
        Some(line) => Arc::new(CommandTestRunner::from_command_line(line, &args.repo_dir)?),
        None => Arc::new(CommandTestRunner::maven(&args.repo_dir)),
    };

    let mut upstream = JiraConfig::new(&args.upstream_issues_url, &args.upstream_issues_project);
    if let Some(token) = &args.upstream_issues_token {
        upstream = upstream.with_token(token);
    }
    let mut downstream =
        JiraConfig::new(&args.downstream_issues_url, &args.downstream_issues_project)
            .with_custom_fields(&config.upstream_issue_pattern);
    if let Some(token) = &args.downstream_issues_token {
        downstream = downstream.with_token(token);
    }

    let state = FsStateStore::new(&args.state_dir)
        .with_context(|| format!("Failed to open state directory {:?}", args.state_dir))?;

    let collaborators = Collaborators {
        git: Arc::new(git),
        upstream: Arc::new(JiraClient::new(upstream)?),
        downstream: Arc::new(JiraClient::new(downstream)?),
        test_runner: Some(test_runner),
        state: Arc::new(state),
    };
    let settings = RunSettings {
        config,
        default_assignee: args.assignee.clone(),
        upstream_ref,
        downstream_ref,
        confirmations,
    };

    let outcome = run(&collaborators, settings)
        .await
        .context("Triage run failed")?;

    let mut states: BTreeMap<String, usize> = BTreeMap::new();
    for commit in &outcome.commits {
        *states.entry(commit.state.to_string()).or_default() += 1;
    }

    println!("Run ID: {}", outcome.run_id);
    println!("Commits: {}", outcome.commits.len());
    for (state, count) in &states {
        println!("  {:<12} {}", state, count);
    }
    println!();
    println!(
        "Report: {} completed, {} need attention",
        outcome.report.completed.len(),
        outcome.report.attention.len()
    );
    println!("State saved to {:?}", args.state_dir);

    Ok(())
}

async fn cmd_report(state_dir: &Path, raw: bool) -> Result<()> {
    let state = FsStateStore::new(state_dir)?;
    let report: Report = load_document(&state, StateDocument::Report)
        .await?
        .with_context(|| format!("No report in {:?}, run `backport triage` first", state_dir))?;

    if raw {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

fn triage_config(args: &TriageArgs) -> TriageConfig {
    let mut config = TriageConfig::new(args.release.with_qualifier(&args.qualifier));
    config.customer_priority_threshold = args.customer_priority_threshold;
    config.security_impact_threshold = args.security_impact_threshold;
    config.check_incomplete_commits = args.check_incomplete_commits;
    config.strict_upstream_issues = !args.lenient;
    config.scratch = args.scratch;
    config.skip_commit_test = args.skip_commit_test;
    config.push_remote = args.downstream_remote.clone();
    config
}

fn load_confirmations(
    commits_file: Option<&Path>,
    upstream_issues: Option<Vec<String>>,
    downstream_issues: Option<Vec<String>>,
) -> Result<Confirmations> {
    let commits: Vec<Commit> = match commits_file {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read confirmed commits {:?}", path))?;
            serde_json::from_str(&data)
                .with_context(|| format!("Failed to parse confirmed commits {:?}", path))?
        }
        None => Vec::new(),
    };

    let key_set = |keys: Option<Vec<String>>| {
        keys.map(|keys| {
            keys.into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect::<HashSet<String>>()
        })
    };

    Ok(Confirmations {
        upstream_issues: key_set(upstream_issues),
        downstream_issues: key_set(downstream_issues),
        ..Confirmations::from_commits(commits)
    })
}

fn render_report(report: &Report) -> String {
    let mut out = String::new();
    for (title, entries) in [
        ("Completed", &report.completed),
        ("Attention", &report.attention),
    ] {
        out.push_str(&format!("{} ({}):\n", title, entries.len()));
        for entry in entries {
            out.push_str(&render_entry(entry));
            out.push('\n');
        }
    }
    out
}

fn render_entry(entry: &ReportEntry) -> String {
    format!(
        "  {:<10} {:<12} {} {:<14} {}{}{}",
        entry.state.to_string(),
        entry.release.as_deref().unwrap_or("-"),
        truncate(&entry.upstream_commit, 10),
        entry.upstream_issue.as_deref().unwrap_or("-"),
        truncate(&entry.summary, 60),
        if entry.downstream_issues.is_empty() {
            String::new()
        } else {
            format!(" [{}]", entry.downstream_issues.join(","))
        },
        if entry.upstream_test_coverage {
            " (tests)"
        } else {
            ""
        },
    )
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
