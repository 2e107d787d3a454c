//! Launching assembled invocations.

use crate::command::CommandInvocation;
use crate::error::{CommandError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::process::Stdio;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// Result of one launched command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    /// Tool name.
    pub tool: String,

    /// Exit code (0 = success).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl CommandOutcome {
    /// Whether the command exited with code 0.
    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }
}

/// Launches invocations and waits for them to finish.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, invocation: &CommandInvocation) -> Result<CommandOutcome>;
}

/// Runs invocations as child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    /// Timeout in seconds; 0 waits indefinitely.
    pub timeout_secs: u64,
}

impl ProcessRunner {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn execute(&self, invocation: &CommandInvocation) -> Result<CommandOutcome> {
        let start = Instant::now();

        let Some((program, args)) = invocation.args.split_first() else {
            return Err(CommandError::EmptyCommand(invocation.tool.clone()));
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .envs(&invocation.env)
            .envs(&invocation.secret_env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &invocation.working_dir {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|source| CommandError::Spawn {
            tool: invocation.tool.clone(),
            source,
        })?;

        let output = if self.timeout_secs > 0 {
            tokio::time::timeout(
                Duration::from_secs(self.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| CommandError::Timeout {
                tool: invocation.tool.clone(),
                secs: self.timeout_secs,
            })??
        } else {
            child.wait_with_output().await?
        };

        let duration_ms = start.elapsed().as_millis() as u64;

        // No exit code means the process died from a signal.
        let exit_code = output.status.code().ok_or_else(|| CommandError::Interrupted {
            tool: invocation.tool.clone(),
        })?;

        debug!(tool = %invocation.tool, exit_code, duration_ms, "Command finished");

        Ok(CommandOutcome {
            tool: invocation.tool.clone(),
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms,
        })
    }
}

/// Test double that records invocations instead of launching them.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    exit_code: i32,
    invocations: Mutex<Vec<CommandInvocation>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded invocation "exits" with `exit_code`.
    pub fn with_exit_code(exit_code: i32) -> Self {
        Self {
            exit_code,
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn executed_count(&self) -> usize {
        self.lock().len()
    }

    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<CommandInvocation> {
        self.lock().last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CommandInvocation>> {
        self.invocations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn execute(&self, invocation: &CommandInvocation) -> Result<CommandOutcome> {
        self.lock().push(invocation.clone());
        Ok(CommandOutcome {
            tool: invocation.tool.clone(),
            exit_code: self.exit_code,
            stdout: String::new(),
            stderr: String::new(),
            duration_ms: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(args: &[&str]) -> CommandInvocation {
        CommandInvocation::new(
            args.first().copied().unwrap_or("empty"),
            args.iter().map(|a| a.to_string()).collect(),
        )
    }

    #[test]
    fn test_outcome_passed() {
        let outcome = CommandOutcome {
            tool: "cov-analyze".to_string(),
            exit_code: 0,
            stdout: "".to_string(),
            stderr: "".to_string(),
            duration_ms: 100,
        };
        assert!(outcome.passed());

        let failed = CommandOutcome {
            exit_code: 2,
            ..outcome
        };
        assert!(!failed.passed());
    }

    #[tokio::test]
    async fn test_execute_simple_command() {
        let result = ProcessRunner::new(60)
            .execute(&invocation(&["echo", "hello"]))
            .await
            .expect("execute failed");
        assert!(result.passed());
        assert!(result.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_execute_failing_command() {
        let result = ProcessRunner::default()
            .execute(&invocation(&["false"]))
            .await
            .expect("execute failed");
        assert!(!result.passed());
    }

    #[tokio::test]
    async fn test_environment_is_passed() {
        let mut inv = invocation(&["printenv", "P4PORT"]);
        inv.env.insert("P4PORT".to_string(), "1234".to_string());

        let result = ProcessRunner::default().execute(&inv).await.expect("execute failed");
        assert!(result.passed());
        assert_eq!(result.stdout.trim(), "1234");
    }

    #[tokio::test]
    async fn test_secret_environment_is_passed() {
        let mut inv = invocation(&["printenv", "COVERITY_PASSPHRASE"]);
        inv.secret_env
            .insert("COVERITY_PASSPHRASE".to_string(), "pw".to_string());

        let result = ProcessRunner::default().execute(&inv).await.expect("execute failed");
        assert!(result.passed());
        assert_eq!(result.stdout.trim(), "pw");
    }

    #[tokio::test]
    async fn test_working_dir_is_applied() {
        let mut inv = invocation(&["pwd"]);
        inv.working_dir = Some(std::env::temp_dir());

        let result = ProcessRunner::default().execute(&inv).await.expect("execute failed");
        assert!(result.passed());
        assert!(!result.stdout.trim().is_empty());
    }

    #[tokio::test]
    async fn test_empty_command_rejected() {
        let err = ProcessRunner::default()
            .execute(&invocation(&[]))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::EmptyCommand(_)));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let err = ProcessRunner::default()
            .execute(&invocation(&["cov-definitely-not-installed"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_surfaces_as_interrupted() {
        let err = ProcessRunner::default()
            .execute(&invocation(&["sh", "-c", "kill -9 $$"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Interrupted { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout() {
        let err = ProcessRunner::new(1)
            .execute(&invocation(&["sleep", "5"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Timeout { secs: 1, .. }));
    }

    #[tokio::test]
    async fn test_recording_runner_counts() {
        let runner = RecordingRunner::with_exit_code(3);
        assert_eq!(runner.executed_count(), 0);

        let outcome = runner.execute(&invocation(&["cov-analyze"])).await.unwrap();
        assert_eq!(outcome.exit_code, 3);
        assert_eq!(runner.executed_count(), 1);
        assert_eq!(runner.last().unwrap().tool, "cov-analyze");
    }
}
