//! Command Executor - actions as xdotool/scrot invocations
//!
//! This module owns the mapping between a semantic action and the command
//! line that performs it: button codes, scroll repeat counts, the composite
//! drag sequence, cursor-query parsing and the screenshot file lifecycle.
//! Every call targets the configured display regardless of the caller's own
//! environment.

pub mod process;

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use rmcp::schemars;
use serde::Deserialize;

use crate::config::Config;
use crate::core::pointer::Point;
use crate::error::{ComputerUseError, Result};
use crate::screenshot::{Screenshot, TempArtifact};

pub use process::{CommandInvocation, CommandRunner, ProcessRunner, shell_quote};

/// Scroll amount covered by one wheel click
const SCROLL_STEP: u32 = 50;
const MAX_SCROLL_REPEAT: u32 = 10;
/// xdotool's default pause between `--repeat` iterations
const REPEAT_DELAY_MS: u64 = 100;

static MOUSE_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"x:(-?\d+)\s+y:(-?\d+)").expect("valid regex"));

/// Mouse button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    #[default]
    Left,
    Middle,
    Right,
}

impl Button {
    /// X11 button number
    pub fn code(self) -> u8 {
        match self {
            Button::Left => 1,
            Button::Middle => 2,
            Button::Right => 3,
        }
    }
}

impl std::fmt::Display for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Button::Left => "left",
            Button::Middle => "middle",
            Button::Right => "right",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScrollAxis {
    #[default]
    #[serde(alias = "v")]
    Vertical,
    #[serde(alias = "h")]
    Horizontal,
}

/// Number of wheel clicks for a scroll amount: `clamp(round(|amount| / 50), 1, 10)`
pub fn scroll_repeat_count(amount: i32) -> u32 {
    ((amount.unsigned_abs() + SCROLL_STEP / 2) / SCROLL_STEP).clamp(1, MAX_SCROLL_REPEAT)
}

/// Time a tool spends on purpose pausing `steps` times for `ms_per_step`
fn paced(ms_per_step: u64, steps: u64) -> Duration {
    Duration::from_millis(ms_per_step.saturating_mul(steps))
}

/// Milliseconds as fractional seconds for `xdotool sleep`
fn as_seconds_arg(ms: u64) -> String {
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

/// Extract the pointer position from `xdotool getmouselocation` output
///
/// Expected shape: `x:<int> y:<int> screen:<int> window:<int>`.
pub fn parse_mouse_location(output: &str) -> Result<Point> {
    let unparseable = || ComputerUseError::UnparseableOutput {
        output: output.to_string(),
    };
    let caps = MOUSE_LOCATION.captures(output).ok_or_else(unparseable)?;
    let x = caps[1].parse().map_err(|_| unparseable())?;
    let y = caps[2].parse().map_err(|_| unparseable())?;
    Ok(Point::new(x, y))
}

/// Translates actions into external-tool invocations against one display
#[derive(Clone)]
pub struct X11Executor {
    runner: Arc<dyn CommandRunner>,
    display: String,
    input_tool: String,
    capture_tool: String,
    screenshot_settle: Duration,
}

impl X11Executor {
    pub fn new(config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            display: config.display.clone(),
            input_tool: config.input_tool.clone(),
            capture_tool: config.capture_tool.clone(),
            screenshot_settle: config.screenshot_settle,
        }
    }

    /// Executor that spawns real processes with the configured timeout
    pub fn from_config(config: &Config) -> Self {
        Self::new(config, Arc::new(ProcessRunner::new(config.command_timeout)))
    }

    fn input(&self) -> CommandInvocation {
        CommandInvocation::new(&self.input_tool, &self.display)
    }

    /// Press a key or space-separated sequence of keys (xdotool keysym syntax)
    pub async fn send_key(&self, key: &str) -> Result<String> {
        tracing::info!("Sending key: {}", key);
        let invocation = self.input().args(["key", "--"]).args(key.split_ascii_whitespace());
        self.runner.run(&invocation).await
    }

    /// Type text; the text is passed as a single argument, unmodified
    pub async fn type_text(&self, text: &str, delay_ms: u64) -> Result<String> {
        let chars = text.chars().count() as u64;
        tracing::info!("Typing {} characters", chars);
        let invocation = self
            .input()
            .args(["type", "--delay", &delay_ms.to_string(), "--", text])
            .allow(paced(delay_ms, chars));
        self.runner.run(&invocation).await
    }

    pub async fn mouse_move(&self, x: i32, y: i32) -> Result<String> {
        tracing::info!("Moving mouse to: ({}, {})", x, y);
        let invocation = self
            .input()
            .args(["mousemove".to_string(), x.to_string(), y.to_string()]);
        self.runner.run(&invocation).await
    }

    /// Press (`pressed = true`) or release a button without clicking
    pub async fn mouse_button(&self, button: Button, pressed: bool) -> Result<String> {
        let action = if pressed { "mousedown" } else { "mouseup" };
        tracing::info!("Mouse {} button {}", button, action);
        let invocation = self.input().args([action.to_string(), button.code().to_string()]);
        self.runner.run(&invocation).await
    }

    pub async fn click(&self, button: Button, delay_ms: u64) -> Result<String> {
        tracing::info!("Clicking {} mouse button", button);
        let invocation = self
            .input()
            .args([
                "click".to_string(),
                "--delay".to_string(),
                delay_ms.to_string(),
                button.code().to_string(),
            ])
            .allow(paced(delay_ms, 1));
        self.runner.run(&invocation).await
    }

    pub async fn double_click(&self, delay_ms: u64) -> Result<String> {
        tracing::info!("Performing double click");
        let invocation = self
            .input()
            .args([
                "click".to_string(),
                "--repeat".to_string(),
                "2".to_string(),
                "--delay".to_string(),
                delay_ms.to_string(),
                Button::Left.code().to_string(),
            ])
            .allow(paced(delay_ms, 2));
        self.runner.run(&invocation).await
    }

    /// Left-button drag as one chained invocation:
    /// move, press, hold, move, release
    pub async fn drag(&self, start: Point, end: Point, hold_ms: u64) -> Result<String> {
        tracing::info!("Dragging from {} to {}", start, end);
        let left = Button::Left.code().to_string();
        let invocation = self
            .input()
            .args([
                "mousemove".to_string(),
                start.x.to_string(),
                start.y.to_string(),
                "mousedown".to_string(),
                left.clone(),
                "sleep".to_string(),
                as_seconds_arg(hold_ms),
                "mousemove".to_string(),
                end.x.to_string(),
                end.y.to_string(),
                "mouseup".to_string(),
                left,
            ])
            .allow(Duration::from_millis(hold_ms));
        self.runner.run(&invocation).await
    }

    /// Scroll the wheel; positive amounts scroll up (vertical) or left (horizontal)
    pub async fn scroll(&self, axis: ScrollAxis, amount: i32) -> Result<String> {
        let repeat = scroll_repeat_count(amount);
        let pacing = paced(REPEAT_DELAY_MS, u64::from(repeat));
        let count = repeat.to_string();

        match axis {
            ScrollAxis::Vertical => {
                let button = if amount > 0 { "4" } else { "5" };
                tracing::info!("Scrolling vertically with button {}, count {}", button, count);
                let invocation = self
                    .input()
                    .args(["click", "--repeat", &count, button])
                    .allow(pacing);
                self.runner.run(&invocation).await
            }
            ScrollAxis::Horizontal => {
                let button = if amount > 0 { "6" } else { "7" };
                tracing::info!("Scrolling horizontally with button {}, count {}", button, count);
                let invocation = self
                    .input()
                    .args(["click", "--repeat", &count, button])
                    .allow(pacing);

                match self.runner.run(&invocation).await {
                    Err(ComputerUseError::ExternalTool { detail, .. }) => {
                        // Not every X server maps buttons 6/7; arrow keys get close enough
                        let key = if amount > 0 { "Left" } else { "Right" };
                        tracing::warn!(
                            "Horizontal wheel buttons failed ({}), falling back to key {} x{}",
                            detail,
                            key,
                            count
                        );
                        let fallback = self
                            .input()
                            .args(["key", "--repeat", &count, key])
                            .allow(pacing);
                        self.runner.run(&fallback).await
                    }
                    other => other,
                }
            }
        }
    }

    pub async fn cursor_position(&self) -> Result<Point> {
        tracing::info!("Getting cursor position");
        let output = self.runner.run(&self.input().arg("getmouselocation")).await?;
        parse_mouse_location(&output)
    }

    /// Capture the whole screen
    ///
    /// The temporary file is removed on every path out of this function,
    /// including capture and read failures.
    pub async fn screenshot(&self) -> Result<Screenshot> {
        let artifact = TempArtifact::unique("xpilot-screen", "png");
        tracing::info!("Taking screenshot to {}", artifact.path().display());

        let invocation = CommandInvocation::new(&self.capture_tool, &self.display)
            .arg("-z")
            .arg(artifact.path().to_string_lossy());
        self.runner.run(&invocation).await?;

        if !self.screenshot_settle.is_zero() {
            tokio::time::sleep(self.screenshot_settle).await;
        }

        let bytes = tokio::fs::read(artifact.path()).await.inspect_err(|e| {
            tracing::error!("Screenshot error: {}", e);
        })?;
        tracing::info!("Screenshot captured: {} bytes", bytes.len());

        Ok(Screenshot::from_bytes(bytes))
    }
}
