use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

pub const DEFAULT_GATEWAY_URL: &str = "https://larksuite-hype-server.hypelive.workers.dev";
pub const DEFAULT_SERVER_NAME: &str = "lark-bitable-mcp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportMode {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    Stdio,
    /// HTTP server with `/sse`, `/messages`, `/mcp` and `/health`.
    #[value(alias = "sse")]
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "lark-bitable-mcp", version, about = "MCP server for Lark Bitable")]
pub struct Args {
    #[arg(long, env = "MCP_TRANSPORT", value_enum, default_value = "stdio")]
    pub transport: TransportMode,

    #[arg(long, env = "MCP_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    #[arg(long, env = "GATEWAY_URL", default_value = DEFAULT_GATEWAY_URL)]
    pub gateway_url: String,

    #[arg(long, env = "MCP_SERVER_NAME", default_value = DEFAULT_SERVER_NAME)]
    pub server_name: String,

    #[arg(long, env = "MCP_SERVER_VERSION", default_value = env!("CARGO_PKG_VERSION"))]
    pub server_version: String,

    /// Bearer secret required on every non-health HTTP request. Unset or empty disables the check.
    #[arg(long, env = "MCP_AUTH_SECRET", hide_env_values = true)]
    pub auth_secret: Option<String>,

    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "MCP_LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

impl Args {
    /// Configured secret, treating an empty value as absent.
    #[must_use]
    pub fn auth_secret(&self) -> Option<&str> {
        self.auth_secret.as_deref().filter(|s| !s.is_empty())
    }
}
