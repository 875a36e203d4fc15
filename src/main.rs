//! xpilot - X11 computer-use MCP server
//!
//! Serves mouse, keyboard and screenshot tools for one X11 display over stdio.

use rmcp::ServiceExt;
use rmcp::transport::io::stdio;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xpilot::config::Config;
use xpilot::server::XPilotServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment and defaults still apply
    let _ = dotenvy::dotenv();

    // Initialize tracing (stderr to keep stdout clean for MCP protocol)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        display = %config.display,
        input_tool = %config.input_tool,
        capture_tool = %config.capture_tool,
        "Starting xpilot MCP Server"
    );

    let server = XPilotServer::new(&config);

    // Run with stdio transport
    let transport = stdio();

    tracing::info!("xpilot MCP Server ready, listening on stdio");

    let service = server.serve(transport).await?;

    // Wait for graceful shutdown
    service.waiting().await?;

    tracing::info!("xpilot MCP Server shutting down");
    Ok(())
}
