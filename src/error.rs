//! Error types for the action layer

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComputerUseError {
    /// The external tool exited non-zero or could not be spawned
    #[error("command failed: {command}: {detail}{}", stderr_suffix(.stderr))]
    ExternalTool {
        command: String,
        detail: String,
        stderr: String,
    },

    #[error("command timed out after {}ms: {command}", .timeout.as_millis())]
    Timeout { command: String, timeout: Duration },

    /// Tool output did not have the expected shape
    #[error("could not parse tool output: {output:?}")]
    UnparseableOutput { output: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(" (stderr: {stderr})")
    }
}

pub type Result<T> = std::result::Result<T, ComputerUseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_tool_message_includes_stderr() {
        let err = ComputerUseError::ExternalTool {
            command: "xdotool key enter".to_string(),
            detail: "exit status: 1".to_string(),
            stderr: "Can't open display".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "command failed: xdotool key enter: exit status: 1 (stderr: Can't open display)"
        );
    }

    #[test]
    fn unparseable_output_carries_raw_text() {
        let err = ComputerUseError::UnparseableOutput {
            output: "garbage".to_string(),
        };
        assert!(err.to_string().contains("garbage"));
    }
}
