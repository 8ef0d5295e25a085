//! Test utilities and mocks for bindpack unit tests.
//!
//! The packaging pipeline reaches external tools only through the
//! [`Executor`] trait, so tests drive it with a [`MockExecutor`] that records
//! every invocation and answers with scripted outputs.
//!
//! # Example
//!
//! ```rust,ignore
//! use bindpack::test_support::{MockExecutor, MockProcessOutput};
//!
//! #[test]
//! fn test_example() {
//!     let exec = MockExecutor::new();
//!     exec.expect_prefix("make -C", MockProcessOutput::failure(2, "no rule"));
//!     exec.set_default(MockProcessOutput::success(""));
//!
//!     // Run the pipeline with `&exec`, then inspect `exec.calls()`.
//! }
//! ```

pub mod fixtures;

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::util::process::{Executor, ProcessBuilder, ProcessOutput};

pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    fn to_output(&self) -> ProcessOutput {
        ProcessOutput {
            code: Some(self.status),
            stdout: self.stdout.clone().into_bytes(),
            stderr: self.stderr.clone().into_bytes(),
        }
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
    /// Match using a regex pattern.
    Regex(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(cmd))
                .unwrap_or(false),
            CommandPattern::Any => true,
        }
    }
}

/// Expectation for a command execution.
#[derive(Debug, Clone)]
pub struct CommandExpectation {
    /// Pattern to match against commands.
    pub pattern: CommandPattern,
    /// Output to return when matched.
    pub output: MockProcessOutput,
    /// Number of times this expectation can be used (None = unlimited).
    pub times: Option<usize>,
    /// Number of times this expectation has been used.
    pub used: usize,
    /// Fail as if the program could not be spawned.
    pub spawn_error: bool,
    /// Files written when the command runs, standing in for tool side effects.
    pub creates: Vec<PathBuf>,
}

impl CommandExpectation {
    /// Create a new expectation.
    pub fn new(pattern: CommandPattern, output: MockProcessOutput) -> Self {
        CommandExpectation {
            pattern,
            output,
            times: None,
            used: 0,
            spawn_error: false,
            creates: Vec::new(),
        }
    }

    /// Set the number of times this expectation can be used.
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    /// Make the matched command fail to spawn.
    pub fn spawn_error(mut self) -> Self {
        self.spawn_error = true;
        self
    }

    /// Write an empty file at `path` when the command runs.
    pub fn creating(mut self, path: impl Into<PathBuf>) -> Self {
        self.creates.push(path.into());
        self
    }

    /// Check if this expectation can still be used.
    pub fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    expectations: Vec<CommandExpectation>,
    calls: Vec<ProcessBuilder>,
    default_output: Option<MockProcessOutput>,
}

/// Mock process executor for testing command execution.
///
/// Records every command it is asked to run and answers with the first
/// available matching expectation.
#[derive(Debug, Default)]
pub struct MockExecutor {
    state: Mutex<MockState>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&self, cmd: &str, output: MockProcessOutput) -> &Self {
        self.expect_pattern(CommandExpectation::new(
            CommandPattern::Exact(cmd.to_string()),
            output,
        ))
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&self, prefix: &str, output: MockProcessOutput) -> &Self {
        self.expect_pattern(CommandExpectation::new(
            CommandPattern::StartsWith(prefix.to_string()),
            output,
        ))
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&self, substring: &str, output: MockProcessOutput) -> &Self {
        self.expect_pattern(CommandExpectation::new(
            CommandPattern::Contains(substring.to_string()),
            output,
        ))
    }

    /// Add a custom expectation.
    pub fn expect_pattern(&self, expectation: CommandExpectation) -> &Self {
        self.lock().expectations.push(expectation);
        self
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&self, output: MockProcessOutput) -> &Self {
        self.lock().default_output = Some(output);
        self
    }

    /// Get all commands that were called, as display strings.
    pub fn calls(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .map(ProcessBuilder::display_command)
            .collect()
    }

    /// Get all commands that were called, with their environment.
    pub fn invocations(&self) -> Vec<ProcessBuilder> {
        self.lock().calls.clone()
    }

    /// Count calls whose display string contains `needle`.
    pub fn count_containing(&self, needle: &str) -> usize {
        self.calls().iter().filter(|c| c.contains(needle)).count()
    }

    /// Verify that all expectations with a specific count were satisfied.
    pub fn verify(&self) -> Result<()> {
        for (i, exp) in self.lock().expectations.iter().enumerate() {
            if let Some(expected) = exp.times {
                if exp.used != expected {
                    bail!(
                        "expectation {} was used {} times, expected {}",
                        i,
                        exp.used,
                        expected
                    );
                }
            }
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Executor for MockExecutor {
    fn run(&self, cmd: &ProcessBuilder) -> io::Result<ProcessOutput> {
        let full_cmd = cmd.display_command();
        let mut state = self.lock();
        state.calls.push(cmd.clone());

        for exp in &mut state.expectations {
            if exp.pattern.matches(&full_cmd) && exp.available() {
                exp.used += 1;
                if exp.spawn_error {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("mock spawn failure: {}", full_cmd),
                    ));
                }
                for path in &exp.creates {
                    std::fs::write(path, "")?;
                }
                return Ok(exp.output.to_output());
            }
        }

        if let Some(ref default) = state.default_output {
            return Ok(default.to_output());
        }

        Err(io::Error::other(format!("unexpected command: {}", full_cmd)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_records_calls() {
        let exec = MockExecutor::new();
        exec.set_default(MockProcessOutput::success("ok"));

        let out = exec.run(&ProcessBuilder::new("make").arg("-C").arg("lib")).unwrap();
        assert!(out.success());
        assert_eq!(exec.calls(), vec!["make -C lib"]);
    }

    #[test]
    fn test_mock_executor_times() {
        let exec = MockExecutor::new();
        exec.expect_pattern(
            CommandExpectation::new(
                CommandPattern::StartsWith("make".into()),
                MockProcessOutput::failure(2, "boom"),
            )
            .times(1),
        );
        exec.set_default(MockProcessOutput::success(""));

        let first = exec.run(&ProcessBuilder::new("make")).unwrap();
        let second = exec.run(&ProcessBuilder::new("make")).unwrap();
        assert!(!first.success());
        assert!(second.success());
        exec.verify().unwrap();
    }

    #[test]
    fn test_mock_executor_unexpected_command() {
        let exec = MockExecutor::new();
        let err = exec.run(&ProcessBuilder::new("patchelf")).unwrap_err();
        assert!(err.to_string().contains("unexpected command"));
    }

    #[test]
    fn test_mock_executor_spawn_error() {
        let exec = MockExecutor::new();
        exec.expect_pattern(
            CommandExpectation::new(CommandPattern::Any, MockProcessOutput::default())
                .spawn_error(),
        );
        let err = exec.run(&ProcessBuilder::new("gmake")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_regex_pattern() {
        let pattern = CommandPattern::Regex(r"^make -C .*/swig/python$".into());
        assert!(pattern.matches("make -C /src/gensio/swig/python"));
        assert!(!pattern.matches("make -C /src/gensio"));
    }
}
