//! MCP Server implementation for xpilot
//!
//! Exposes each desktop action as an MCP tool. Tool handlers only translate
//! parameters and results; all behavior lives in [`ComputerUse`].

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars, serde,
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use serde_json::json;
use std::sync::Arc;

use crate::computer::ComputerUse;
use crate::config::Config;
use crate::error::ComputerUseError;
use crate::executor::{Button, ScrollAxis};

/// Parameters for the key tool
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct KeyParams {
    /// Key in xdotool syntax (e.g. "Return", "ctrl+c", "alt+Tab"); several
    /// space-separated keys are pressed in sequence
    pub key: String,
}

/// Parameters for the type tool
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct TypeParams {
    /// Text to type, delivered verbatim
    pub text: String,
    /// Delay between keystrokes in milliseconds (default 100)
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

/// Parameters for the mouse_move tool
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct MouseMoveParams {
    /// Absolute X coordinate
    pub x: i32,
    /// Absolute Y coordinate
    pub y: i32,
}

/// Parameters for the double_click tool
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct DoubleClickParams {
    /// Delay between the two clicks in milliseconds (default 100)
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

/// Parameters for the left_click_drag tool
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct DragParams {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    /// How long to hold the button before moving, in milliseconds (default 100)
    #[serde(default)]
    pub hold_ms: Option<u64>,
}

/// Parameters for the mouse_down and mouse_up tools
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct MouseButtonParams {
    /// Mouse button: "left" (default), "right", "middle"
    #[serde(default)]
    pub button: Button,
}

/// Parameters for the scroll tool
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ScrollParams {
    /// Scroll amount; positive scrolls up/left, negative down/right.
    /// Every 50 units is one wheel click, between 1 and 10 clicks.
    pub amount: i32,
    /// "vertical" / "v" (default) or "horizontal" / "h"
    #[serde(default)]
    pub axis: ScrollAxis,
}

/// xpilot MCP Server
///
/// Provides mouse, keyboard and screen tools for one X11 display.
#[derive(Clone)]
pub struct XPilotServer {
    computer: Arc<ComputerUse>,
    /// MCP tool router
    tool_router: ToolRouter<XPilotServer>,
}

fn action_result(action: &str, result: Result<String, ComputerUseError>) -> CallToolResult {
    match result {
        Ok(output) => CallToolResult::success(vec![Content::text(
            json!({
                "success": true,
                "action": action,
                "output": output
            })
            .to_string(),
        )]),
        Err(e) => error_result(action, &e),
    }
}

fn error_result(action: &str, e: &ComputerUseError) -> CallToolResult {
    CallToolResult::error(vec![Content::text(
        json!({
            "error": format!("Failed to {}", action.replace('_', " ")),
            "details": e.to_string()
        })
        .to_string(),
    )])
}

#[tool_router]
impl XPilotServer {
    /// Create a server driving the configured display
    pub fn new(config: &Config) -> Self {
        Self::with_computer(Arc::new(ComputerUse::from_config(config)))
    }

    pub fn with_computer(computer: Arc<ComputerUse>) -> Self {
        Self {
            computer,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Press a key or key combination (xdotool syntax, e.g. \"Return\", \"ctrl+c\")")]
    async fn key(&self, params: Parameters<KeyParams>) -> Result<CallToolResult, McpError> {
        Ok(action_result("key", self.computer.key(&params.0.key).await))
    }

    #[tool(name = "type", description = "Type text into the focused window")]
    async fn type_text(&self, params: Parameters<TypeParams>) -> Result<CallToolResult, McpError> {
        let result = self
            .computer
            .type_text(&params.0.text, params.0.delay_ms)
            .await;
        Ok(action_result("type", result))
    }

    #[tool(description = "Move the mouse pointer to absolute screen coordinates")]
    async fn mouse_move(
        &self,
        params: Parameters<MouseMoveParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.computer.mouse_move(params.0.x, params.0.y).await;
        Ok(action_result("mouse_move", result))
    }

    #[tool(description = "Left click at the current pointer position")]
    async fn left_click(&self) -> Result<CallToolResult, McpError> {
        Ok(action_result("left_click", self.computer.left_click().await))
    }

    #[tool(description = "Right click at the current pointer position")]
    async fn right_click(&self) -> Result<CallToolResult, McpError> {
        Ok(action_result("right_click", self.computer.right_click().await))
    }

    #[tool(description = "Middle click at the current pointer position")]
    async fn middle_click(&self) -> Result<CallToolResult, McpError> {
        Ok(action_result("middle_click", self.computer.middle_click().await))
    }

    #[tool(description = "Double left click at the current pointer position")]
    async fn double_click(
        &self,
        params: Parameters<DoubleClickParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.computer.double_click(params.0.delay_ms).await;
        Ok(action_result("double_click", result))
    }

    #[tool(description = "Press the left button at the start point, drag to the end point and release")]
    async fn left_click_drag(
        &self,
        params: Parameters<DragParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = self
            .computer
            .left_click_drag(p.start_x, p.start_y, p.end_x, p.end_y, p.hold_ms)
            .await;
        Ok(action_result("left_click_drag", result))
    }

    #[tool(description = "Press and hold a mouse button")]
    async fn mouse_down(
        &self,
        params: Parameters<MouseButtonParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(action_result("mouse_down", self.computer.mouse_down(params.0.button).await))
    }

    #[tool(description = "Release a held mouse button")]
    async fn mouse_up(
        &self,
        params: Parameters<MouseButtonParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(action_result("mouse_up", self.computer.mouse_up(params.0.button).await))
    }

    #[tool(description = "Scroll the mouse wheel vertically or horizontally")]
    async fn scroll(&self, params: Parameters<ScrollParams>) -> Result<CallToolResult, McpError> {
        let result = self.computer.scroll(params.0.amount, params.0.axis).await;
        Ok(action_result("scroll", result))
    }

    #[tool(description = "Capture a screenshot of the whole display")]
    async fn screenshot(&self) -> Result<CallToolResult, McpError> {
        match self.computer.screenshot().await {
            Ok(shot) => Ok(CallToolResult::success(vec![Content::image(
                shot.base64(),
                shot.mime_type,
            )])),
            Err(e) => Ok(error_result("screenshot", &e)),
        }
    }

    #[tool(description = "Get the current mouse pointer position as {x, y}")]
    async fn cursor_position(&self) -> Result<CallToolResult, McpError> {
        let position = self.computer.cursor_position().await;
        Ok(CallToolResult::success(vec![Content::text(
            json!({ "x": position.x, "y": position.y }).to_string(),
        )]))
    }
}

#[tool_handler]
impl ServerHandler for XPilotServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "xpilot controls an X11 desktop. Use screenshot to see the screen, \
                 mouse_move and the click tools to point and click, key and type for \
                 keyboard input, and cursor_position to read the pointer location."
                    .to_string(),
            ),
        }
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        Ok(self.get_info())
    }
}
