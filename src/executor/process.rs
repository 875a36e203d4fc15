//! External process invocation
//!
//! Every action becomes one [`CommandInvocation`]: a program, an argument
//! vector and the display it targets. Arguments go straight to process
//! creation, never through a shell.

use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command as AsyncCommand;

use crate::error::{ComputerUseError, Result};

/// One external-process call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// Value passed as `DISPLAY` to the child
    pub display: String,
    /// Time the tool is expected to spend on purpose (typing delays, holds),
    /// added on top of the runner's base timeout
    pub allowance: Duration,
}

impl CommandInvocation {
    pub fn new(program: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            display: display.into(),
            allowance: Duration::ZERO,
        }
    }

    pub fn allow(mut self, allowance: Duration) -> Self {
        self.allowance = self.allowance.saturating_add(allowance);
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandInvocation {
    /// Renders as a copy-pasteable shell line, for logs and error messages only
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DISPLAY={} {}", shell_quote(&self.display), shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

/// Quote a string for single-quoted POSIX shell syntax
///
/// Every `'` becomes `'\''` (close quote, escaped literal quote, reopen).
/// Strings made only of safe characters are returned bare.
pub fn shell_quote(s: &str) -> String {
    let is_safe = |c: char| c.is_ascii_alphanumeric() || "-_.,:/+=@%".contains(c);
    if !s.is_empty() && s.chars().all(is_safe) {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Runs invocations and returns trimmed standard output
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &CommandInvocation) -> Result<String>;
}

/// Runs invocations as real child processes
///
/// Each call is bounded by the base timeout plus the invocation's allowance,
/// so paced work finishes while a hung tool is still cut off.
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &CommandInvocation) -> Result<String> {
        let command = invocation.to_string();
        tracing::debug!("Executing: {}", command);

        let child = AsyncCommand::new(&invocation.program)
            .args(&invocation.args)
            .env("DISPLAY", &invocation.display)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let timeout = self.timeout.saturating_add(invocation.allowance);

        // On timeout the output future is dropped, which kills the child
        let output = match tokio::time::timeout(timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::error!("Failed to spawn {}: {}", invocation.program, e);
                return Err(ComputerUseError::ExternalTool {
                    command,
                    detail: format!("failed to spawn: {e}"),
                    stderr: String::new(),
                });
            }
            Err(_) => {
                tracing::error!("Command timed out after {:?}: {}", timeout, command);
                return Err(ComputerUseError::Timeout { command, timeout });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!("Command failed ({}): {}", output.status, command);
            if !stderr.is_empty() {
                tracing::error!("stderr: {}", stderr);
            }
            return Err(ComputerUseError::ExternalTool {
                command,
                detail: output.status.to_string(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandInvocation {
        CommandInvocation::new("sh", ":99").args(["-c", script])
    }

    #[test]
    fn quote_leaves_plain_words_bare() {
        assert_eq!(shell_quote("mousemove"), "mousemove");
        assert_eq!(shell_quote("ctrl+c"), "ctrl+c");
        assert_eq!(shell_quote("-5"), "-5");
    }

    #[test]
    fn quote_escapes_single_quotes() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("$(rm -rf /)"), "'$(rm -rf /)'");
    }

    #[tokio::test]
    async fn quoted_text_survives_a_real_shell() {
        let text = "it's a \\ $HOME `id` \"q\"\nline two";
        let script = format!("printf %s {}", shell_quote(text));
        let runner = ProcessRunner::new(Duration::from_secs(5));

        let out = runner.run(&sh(&script)).await.unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn display_renders_quoted_command_line() {
        let invocation = CommandInvocation::new("xdotool", ":1").args(["type", "--", "it's"]);
        assert_eq!(invocation.to_string(), r"DISPLAY=:1 xdotool type -- 'it'\''s'");
    }

    #[tokio::test]
    async fn returns_trimmed_stdout() {
        let runner = ProcessRunner::new(Duration::from_secs(5));
        let out = runner.run(&sh("echo '  hello  '")).await.unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn passes_display_override() {
        let runner = ProcessRunner::new(Duration::from_secs(5));
        let out = runner.run(&sh("echo $DISPLAY")).await.unwrap();
        assert_eq!(out, ":99");
    }

    #[tokio::test]
    async fn args_are_not_shell_interpreted() {
        let runner = ProcessRunner::new(Duration::from_secs(5));
        let invocation =
            CommandInvocation::new("printf", ":99").args(["%s", "a'b; echo pwned $(id)"]);
        let out = runner.run(&invocation).await.unwrap();
        assert_eq!(out, "a'b; echo pwned $(id)");
    }

    #[tokio::test]
    async fn nonzero_exit_is_external_tool_failure() {
        let runner = ProcessRunner::new(Duration::from_secs(5));
        let err = runner.run(&sh("echo boom >&2; exit 3")).await.unwrap_err();
        match err {
            ComputerUseError::ExternalTool { command, stderr, .. } => {
                assert!(command.starts_with("DISPLAY=:99 sh -c"));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_external_tool_failure() {
        let runner = ProcessRunner::new(Duration::from_secs(5));
        let invocation = CommandInvocation::new("xpilot-definitely-not-installed", ":99");
        let err = runner.run(&invocation).await.unwrap_err();
        assert!(matches!(err, ComputerUseError::ExternalTool { .. }));
    }

    #[tokio::test]
    async fn hung_process_times_out() {
        let runner = ProcessRunner::new(Duration::from_millis(100));
        let invocation = CommandInvocation::new("sleep", ":99").arg("5");
        let err = runner.run(&invocation).await.unwrap_err();
        assert!(matches!(err, ComputerUseError::Timeout { .. }));
    }

    #[tokio::test]
    async fn allowance_extends_timeout_for_paced_work() {
        let runner = ProcessRunner::new(Duration::from_millis(150));
        let paced = CommandInvocation::new("sleep", ":99")
            .arg("0.4")
            .allow(Duration::from_millis(600));
        runner.run(&paced).await.unwrap();
    }

    #[tokio::test]
    async fn timeout_reports_effective_bound() {
        let runner = ProcessRunner::new(Duration::from_millis(100));
        let invocation = CommandInvocation::new("sleep", ":99")
            .arg("5")
            .allow(Duration::from_millis(200));
        match runner.run(&invocation).await.unwrap_err() {
            ComputerUseError::Timeout { timeout, .. } => {
                assert_eq!(timeout, Duration::from_millis(300))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
