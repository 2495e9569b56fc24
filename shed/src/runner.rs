//! Process execution with bounded timeout
//!
//! Runs a fully resolved command line as a child process: the command is
//! split into argv words (no shell, so no pipes, redirects, or globbing),
//! stdout/stderr are captured lossily, and the wait is bounded by a timeout
//! after which the child is killed. Failures are classified into diagnostic
//! text rather than raised - one invocation is always one attempt, and the
//! caller decides what to do with a failed outcome.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, error, info};

/// Default timeout for tool invocations
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Success/failure classification of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Captured outcome of one process execution
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Stdout on success, diagnostic text on failure
    pub text: String,
    pub status: RunStatus,
}

impl RunOutput {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: RunStatus::Success,
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: RunStatus::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}

/// Executes resolved command lines as child processes
#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run a command, optionally in a working directory
    pub async fn run(&self, command: &str, cwd: Option<&Path>) -> RunOutput {
        let Some(argv) = shlex::split(command).filter(|argv| !argv.is_empty()) else {
            error!(%command, "Malformed command line");
            return RunOutput::failure(format!("Error: Malformed command (unmatched quotes): {}", command));
        };
        let program = argv[0].clone();

        info!(%command, cwd = ?cwd, "Running command");

        let mut cmd = tokio::process::Command::new(&program);
        cmd.args(&argv[1..])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!(%program, "Command not found");
                return RunOutput::failure(format!(
                    "Error: The command '{}' was not found. Is it installed and in PATH?",
                    program
                ));
            }
            Err(e) => {
                error!(%program, %e, "Failed to launch command");
                return RunOutput::failure(format!("An unexpected error occurred: {}", e));
            }
        };

        // Dropping the wait future on timeout kills the child (kill_on_drop)
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!(%program, %e, "Failed waiting for command");
                return RunOutput::failure(format!("An unexpected error occurred: {}", e));
            }
            Err(_) => {
                error!(%program, timeout_secs = self.timeout.as_secs(), "Command timed out");
                return RunOutput::failure(format!(
                    "Error: Command '{}' timed out after {} seconds.",
                    program,
                    self.timeout.as_secs()
                ));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(status = ?output.status, stdout_len = stdout.len(), stderr_len = stderr.len(), "Command completed");

        if output.status.success() {
            return RunOutput::success(stdout.into_owned());
        }

        let mut diagnostic = format!("Error (Code {})", output.status.code().unwrap_or(-1));
        if !stderr.is_empty() {
            diagnostic.push_str(&format!("\nStderr:\n{}", stderr));
        }
        if !stdout.is_empty() {
            diagnostic.push_str(&format!("\nStdout (may contain error details):\n{}", stdout));
        }
        error!(%program, "Command failed: {}", diagnostic);
        RunOutput::failure(diagnostic.trim().to_string())
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_success_returns_stdout() {
        let runner = CommandRunner::default();
        let output = runner.run("echo hello", None).await;

        assert!(output.is_success());
        assert_eq!(output.text.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_nonzero_exit_is_diagnostic() {
        let runner = CommandRunner::default();
        let output = runner.run(r#"sh -c "exit 7""#, None).await;

        assert_eq!(output.status, RunStatus::Error);
        assert!(output.text.contains("7"));
    }

    #[tokio::test]
    async fn test_run_captures_stderr_in_diagnostic() {
        let runner = CommandRunner::default();
        let output = runner.run(r#"sh -c "echo boom >&2; exit 1""#, None).await;

        assert_eq!(output.status, RunStatus::Error);
        assert!(output.text.contains("Stderr:"));
        assert!(output.text.contains("boom"));
    }

    #[tokio::test]
    async fn test_run_timeout_names_duration() {
        let runner = CommandRunner::new(Duration::from_millis(200));
        let output = runner.run("sleep 10", None).await;

        assert_eq!(output.status, RunStatus::Error);
        assert!(output.text.contains("timed out"));
        assert!(output.text.contains("sleep"));
    }

    #[tokio::test]
    async fn test_run_missing_executable_is_named() {
        let runner = CommandRunner::default();
        let output = runner.run("definitely-not-a-real-command-xyz", None).await;

        assert_eq!(output.status, RunStatus::Error);
        assert!(output.text.contains("definitely-not-a-real-command-xyz"));
        assert!(output.text.contains("was not found"));
    }

    #[tokio::test]
    async fn test_run_malformed_command() {
        let runner = CommandRunner::default();
        let output = runner.run(r#"echo "unclosed"#, None).await;

        assert_eq!(output.status, RunStatus::Error);
        assert!(output.text.contains("Malformed"));
    }

    #[tokio::test]
    async fn test_run_in_working_directory() {
        let temp = tempfile::tempdir().unwrap();
        let canonical = temp.path().canonicalize().unwrap();
        let runner = CommandRunner::default();

        let output = runner.run("pwd", Some(&canonical)).await;

        assert!(output.is_success());
        assert_eq!(output.text.trim(), canonical.to_string_lossy());
    }

    #[tokio::test]
    async fn test_quoted_argument_stays_single_word() {
        let runner = CommandRunner::default();
        let output = runner.run(r#"echo 'a; b | c'"#, None).await;

        // No shell is involved, so metacharacters are literal text
        assert!(output.is_success());
        assert_eq!(output.text.trim(), "a; b | c");
    }

    #[test]
    fn test_run_status_display() {
        assert_eq!(RunStatus::Success.to_string(), "success");
        assert_eq!(RunStatus::Error.to_string(), "error");
    }
}
