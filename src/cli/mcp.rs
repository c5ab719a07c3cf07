//! MCP server commands

use super::helpers::{build_tool_handler, print_json};
use clap::Subcommand;
use ramorie_core::error::Result;
use ramorie_core::mcp::{catalog, server::SERVER_NAME, McpServer};
use serde_json::json;
use tracing::info;

#[derive(Subcommand)]
pub enum McpAction {
    /// Start the MCP server (stdio mode)
    Serve,

    /// Print the tool catalog as JSON
    Tools,

    /// Print an example MCP client configuration
    Config,
}

/// Handle MCP command
pub async fn handle(action: McpAction) -> Result<()> {
    match action {
        McpAction::Serve => serve().await,
        McpAction::Tools => print_json(&catalog::catalog()),
        McpAction::Config => print_json(&client_config()),
    }
}

async fn serve() -> Result<()> {
    let server = McpServer::new(build_tool_handler()?);

    // Run server with graceful shutdown on signals
    tokio::select! {
        result = server.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, stopping MCP server...");
        }
    }

    info!("MCP server shut down complete");
    Ok(())
}

fn client_config() -> serde_json::Value {
    json!({
        "mcpServers": {
            SERVER_NAME: {
                "command": "ramorie",
                "args": ["mcp", "serve"]
            }
        }
    })
}
