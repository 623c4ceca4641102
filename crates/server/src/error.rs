//! Error types for the server binary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration errors (bad gateway URL, bad bind address)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Startup errors (listener failed to bind)
    #[error("Startup error: {0}")]
    Startup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<lark_bitable_http_tools::ToolError> for ServerError {
    fn from(value: lark_bitable_http_tools::ToolError) -> Self {
        Self::Config(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
