//! MCP server exposing Lark Bitable operations over stdio, SSE and stateless HTTP.
//!
//! Every transport shares one [`dispatch::McpHandler`], so tool resolution and error mapping behave
//! the same regardless of how a request arrived.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod jsonrpc;
pub mod logging;
pub mod mcp;
pub mod stdio;

use config::{Args, TransportMode};
use dispatch::{McpHandler, ServerInfo};
use lark_bitable_http_tools::{GatewayClient, ToolCatalog};
use std::sync::Arc;

/// Build the shared handler from parsed arguments.
///
/// # Errors
///
/// Returns a configuration error if the gateway URL is invalid.
pub fn build_handler(args: &Args) -> error::Result<McpHandler> {
    let gateway = GatewayClient::new(args.gateway_url.clone())?;
    Ok(McpHandler::new(
        Arc::new(ToolCatalog::bitable()),
        Arc::new(gateway),
        ServerInfo {
            name: args.server_name.clone(),
            version: args.server_version.clone(),
        },
    ))
}

/// Run the selected transport until it finishes.
///
/// # Errors
///
/// Propagates configuration, startup and I/O failures.
pub async fn run(args: Args) -> error::Result<()> {
    let handler = build_handler(&args)?;
    match args.transport {
        TransportMode::Stdio => stdio::serve_stdio(handler).await,
        TransportMode::Http => {
            let state = mcp::McpState::new(handler, args.auth_secret());
            mcp::serve(state, args.bind).await
        }
    }
}
