//! Post-cherry-pick test gate.
//!
//! After a cherry-pick applies cleanly the tests touched by the upstream
//! commit can be run against the working tree before committing. Only the
//! exit status matters.

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, info};

use crate::domain::error::{Result, TriageError};

/// Placeholder replaced by the comma-separated test list.
pub const TESTS_PLACEHOLDER: &str = "{tests}";

/// Runs a set of tests against the working tree.
pub trait TestRunner: Send + Sync {
    /// `Ok(true)` when every test passed.
    fn run_tests(&self, tests: &[String]) -> Result<bool>;
}

/// Runs an external command, substituting [`TESTS_PLACEHOLDER`] in its
/// arguments.
#[derive(Debug, Clone)]
pub struct CommandTestRunner {
    program: String,
    args: Vec<String>,
    dir: PathBuf,
}

impl CommandTestRunner {
    pub fn new(program: impl Into<String>, args: Vec<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            dir: dir.into(),
        }
    }

    /// Maven build running only the selected tests.
    pub fn maven(dir: impl Into<PathBuf>) -> Self {
        Self::new(
            "mvn",
            vec![
                "--show-version".to_string(),
                "--define=failIfNoTests=false".to_string(),
                format!("--define=test={TESTS_PLACEHOLDER}"),
                "clean".to_string(),
                "package".to_string(),
            ],
            dir,
        )
    }

    /// Parse a whitespace-separated command line such as
    /// `"mvn -Dtest={tests} verify"`.
    pub fn from_command_line(line: &str, dir: impl Into<PathBuf>) -> Result<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| TriageError::TestRunner("empty test command".to_string()))?;
        Ok(Self::new(program, parts.collect(), dir))
    }

    fn expanded_args(&self, tests: &[String]) -> Vec<String> {
        let joined = tests.join(",");
        self.args
            .iter()
            .map(|a| a.replace(TESTS_PLACEHOLDER, &joined))
            .collect()
    }
}

impl TestRunner for CommandTestRunner {
    fn run_tests(&self, tests: &[String]) -> Result<bool> {
        let args = self.expanded_args(tests);
        info!(program = %self.program, tests = tests.len(), "running commit tests");
        let status = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.dir)
            .status()
            .map_err(|e| TriageError::TestRunner(format!("failed to run {}: {e}", self.program)))?;
        debug!(status = ?status.code(), "test command finished");
        Ok(status.success())
    }
}
