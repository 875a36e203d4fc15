//! xpilot - X11 computer-use MCP server
//!
//! This library lets an external agent drive an X11 desktop session through
//! a small set of actions, each translated into an `xdotool` or `scrot`
//! invocation against a fixed display.
//!
//! ## Features
//!
//! - Keyboard input (key chords, verbatim text typing)
//! - Pointer control (move, click, double click, drag, button press/release)
//! - Wheel scrolling on both axes
//! - Full-screen screenshots as base64 data URIs
//! - Cursor position queries with a tracked fallback
//!
//! ## Layers
//!
//! - [`computer::ComputerUse`] - one method per action, tracks the pointer
//! - [`executor::X11Executor`] - builds and runs the command lines
//! - [`server::XPilotServer`] - MCP tools over stdio

pub mod computer;
pub mod config;
pub mod core;
pub mod error;
pub mod executor;
pub mod screenshot;
pub mod server;
