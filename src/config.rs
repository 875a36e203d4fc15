//! Runtime configuration
//!
//! Everything is read from the environment (optionally seeded from a `.env`
//! file by the binary). Unset variables fall back to defaults suitable for a
//! Webtop-style container running its desktop on `:1`.

use std::time::Duration;

use anyhow::Context;

pub const DISPLAY_VAR: &str = "XPILOT_DISPLAY";
pub const COMMAND_TIMEOUT_VAR: &str = "XPILOT_COMMAND_TIMEOUT_MS";
pub const SCREENSHOT_SETTLE_VAR: &str = "XPILOT_SCREENSHOT_SETTLE_MS";
pub const INPUT_TOOL_VAR: &str = "XPILOT_INPUT_TOOL";
pub const CAPTURE_TOOL_VAR: &str = "XPILOT_CAPTURE_TOOL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// X display every invocation targets, passed as `DISPLAY`
    pub display: String,
    /// Upper bound on a single external invocation
    pub command_timeout: Duration,
    /// Pause between the capture tool exiting and reading its output file
    pub screenshot_settle: Duration,
    /// Input-simulation program (xdotool-compatible command line)
    pub input_tool: String,
    /// Screen-capture program (scrot-compatible command line)
    pub capture_tool: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: ":1".to_string(),
            command_timeout: Duration::from_secs(30),
            screenshot_settle: Duration::from_millis(500),
            input_tool: "xdotool".to_string(),
            capture_tool: "scrot".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let millis = |name: &str, default: Duration| -> anyhow::Result<Duration> {
            match non_empty(name) {
                Some(raw) => {
                    let ms: u64 = raw.trim().parse().with_context(|| {
                        format!("{name} must be a whole number of milliseconds, got {raw:?}")
                    })?;
                    Ok(Duration::from_millis(ms))
                }
                None => Ok(default),
            }
        };

        Ok(Self {
            display: non_empty(DISPLAY_VAR).unwrap_or(defaults.display),
            command_timeout: millis(COMMAND_TIMEOUT_VAR, defaults.command_timeout)?,
            screenshot_settle: millis(SCREENSHOT_SETTLE_VAR, defaults.screenshot_settle)?,
            input_tool: non_empty(INPUT_TOOL_VAR).unwrap_or(defaults.input_tool),
            capture_tool: non_empty(CAPTURE_TOOL_VAR).unwrap_or(defaults.capture_tool),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.display, ":1");
        assert_eq!(config.command_timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_from_environment() {
        let config = Config::from_lookup(lookup(&[
            (DISPLAY_VAR, ":0"),
            (COMMAND_TIMEOUT_VAR, "1500"),
            (SCREENSHOT_SETTLE_VAR, "0"),
            (CAPTURE_TOOL_VAR, "/usr/local/bin/scrot"),
        ]))
        .unwrap();

        assert_eq!(config.display, ":0");
        assert_eq!(config.command_timeout, Duration::from_millis(1500));
        assert_eq!(config.screenshot_settle, Duration::ZERO);
        assert_eq!(config.input_tool, "xdotool");
        assert_eq!(config.capture_tool, "/usr/local/bin/scrot");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[(DISPLAY_VAR, "  ")])).unwrap();
        assert_eq!(config.display, ":1");
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let err = Config::from_lookup(lookup(&[(COMMAND_TIMEOUT_VAR, "soon")])).unwrap_err();
        assert!(err.to_string().contains(COMMAND_TIMEOUT_VAR));
    }
}
