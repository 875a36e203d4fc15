//! Action Facade
//!
//! One method per semantic action. Each delegates to the [`X11Executor`] and
//! hands back its result unchanged; errors propagate to the caller except in
//! [`ComputerUse::cursor_position`], which falls back to the tracked value.
//!
//! Moves and drags record their target in the Pointer State before the
//! invocation runs, so a failed move still leaves the new position tracked.

use crate::config::Config;
use crate::core::pointer::{Point, PointerState};
use crate::error::Result;
use crate::executor::{Button, ScrollAxis, X11Executor};
use crate::screenshot::Screenshot;

pub const DEFAULT_TYPE_DELAY_MS: u64 = 100;
pub const DEFAULT_CLICK_DELAY_MS: u64 = 100;
pub const DEFAULT_DRAG_HOLD_MS: u64 = 100;

pub struct ComputerUse {
    executor: X11Executor,
    pointer: PointerState,
}

impl ComputerUse {
    pub fn new(executor: X11Executor) -> Self {
        Self {
            executor,
            pointer: PointerState::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(X11Executor::from_config(config))
    }

    /// Last tracked pointer position, without asking the toolchain
    pub async fn tracked_position(&self) -> Point {
        self.pointer.get().await
    }

    /// Send a key event, e.g. `"Return"`, `"ctrl+c"`
    pub async fn key(&self, key: &str) -> Result<String> {
        self.executor.send_key(key).await
    }

    /// Type text with `delay_ms` between keystrokes (default 100)
    pub async fn type_text(&self, text: &str, delay_ms: Option<u64>) -> Result<String> {
        self.executor
            .type_text(text, delay_ms.unwrap_or(DEFAULT_TYPE_DELAY_MS))
            .await
    }

    pub async fn mouse_move(&self, x: i32, y: i32) -> Result<String> {
        self.pointer.set(Point::new(x, y)).await;
        self.executor.mouse_move(x, y).await
    }

    pub async fn left_click(&self) -> Result<String> {
        self.click(Button::Left).await
    }

    pub async fn right_click(&self) -> Result<String> {
        self.click(Button::Right).await
    }

    pub async fn middle_click(&self) -> Result<String> {
        self.click(Button::Middle).await
    }

    /// Clicks land wherever the real pointer is; the tracked value is only logged
    async fn click(&self, button: Button) -> Result<String> {
        tracing::debug!("Tracked pointer before {} click: {}", button, self.pointer.get().await);
        self.executor.click(button, DEFAULT_CLICK_DELAY_MS).await
    }

    pub async fn double_click(&self, delay_ms: Option<u64>) -> Result<String> {
        tracing::debug!("Tracked pointer before double click: {}", self.pointer.get().await);
        self.executor
            .double_click(delay_ms.unwrap_or(DEFAULT_CLICK_DELAY_MS))
            .await
    }

    /// Press the left button at the start, hold `hold_ms`, move, release
    pub async fn left_click_drag(
        &self,
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
        hold_ms: Option<u64>,
    ) -> Result<String> {
        let start = Point::new(start_x, start_y);
        let end = Point::new(end_x, end_y);
        self.pointer.set(end).await;
        self.executor
            .drag(start, end, hold_ms.unwrap_or(DEFAULT_DRAG_HOLD_MS))
            .await
    }

    pub async fn mouse_down(&self, button: Button) -> Result<String> {
        self.executor.mouse_button(button, true).await
    }

    pub async fn mouse_up(&self, button: Button) -> Result<String> {
        self.executor.mouse_button(button, false).await
    }

    /// Capture the screen; see [`Screenshot::data_uri`] for the wire shape
    pub async fn screenshot(&self) -> Result<Screenshot> {
        self.executor.screenshot().await
    }

    /// Query the real pointer position, falling back to the tracked one
    ///
    /// Never fails: a query or parse error is logged and the last tracked
    /// value is returned unchanged.
    pub async fn cursor_position(&self) -> Point {
        match self.executor.cursor_position().await {
            Ok(actual) => self.pointer.set(actual).await,
            Err(e) => tracing::warn!("Failed to get actual cursor position: {}", e),
        }

        let position = self.pointer.get().await;
        tracing::info!("Returning cursor position: {}", position);
        position
    }

    /// Positive amounts scroll up (vertical) or left (horizontal)
    pub async fn scroll(&self, amount: i32, axis: ScrollAxis) -> Result<String> {
        self.executor.scroll(axis, amount).await
    }
}
