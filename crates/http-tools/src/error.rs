//! Error taxonomy shared by every transport.
//!
//! Adapters never invent their own error shapes: they render a [`ToolError`] through
//! [`ToolError::to_body`] and wrap the result in whatever their wire format needs.

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool catalog itself is inconsistent, or the gateway base URL is unusable.
    #[error("config error: {0}")]
    Config(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Missing path argument '{argument}' for tool '{tool}'")]
    MissingPathArgument { tool: String, argument: String },
    /// The value is empty or a dot segment, so it cannot address a single path segment.
    #[error("Invalid path argument '{argument}' for tool '{tool}': {value:?} is not a usable path segment")]
    InvalidPathArgument {
        tool: String,
        argument: String,
        value: String,
    },
    /// The gateway answered with a non-2xx status. `detail` is the raw response text.
    #[error("Gateway error ({status}): {detail}")]
    Gateway { status: u16, detail: String },
    #[error("Failed to call gateway: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, ToolError>;

impl From<reqwest::Error> for ToolError {
    fn from(value: reqwest::Error) -> Self {
        // `without_url` keeps query strings and hosts out of caller-visible errors.
        Self::Transport(value.without_url().to_string())
    }
}

/// Wire shape of a tool error: `{ kind, message, detail? }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl ToolError {
    /// Stable snake_case tag for this error.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::UnknownTool(_) => "unknown_tool",
            Self::MissingPathArgument { .. } => "missing_path_argument",
            Self::InvalidPathArgument { .. } => "invalid_path_argument",
            Self::Gateway { .. } => "gateway_error",
            Self::Transport(_) => "transport_error",
        }
    }

    /// True when the caller, not the gateway or the network, is at fault.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownTool(_)
                | Self::MissingPathArgument { .. }
                | Self::InvalidPathArgument { .. }
        )
    }

    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        let detail = match self {
            Self::Config(_) | Self::Transport(_) => None,
            Self::UnknownTool(name) => Some(json!({ "tool": name })),
            Self::MissingPathArgument { tool, argument } => {
                Some(json!({ "tool": tool, "argument": argument }))
            }
            Self::InvalidPathArgument {
                tool,
                argument,
                value,
            } => Some(json!({ "tool": tool, "argument": argument, "value": value })),
            Self::Gateway { status, detail } => Some(json!({ "status": status, "body": detail })),
        };
        ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_error_body_carries_status_and_raw_text() {
        let err = ToolError::Gateway {
            status: 500,
            detail: "boom".to_string(),
        };
        let body = serde_json::to_value(err.to_body()).expect("serialize");
        assert_eq!(body["kind"], "gateway_error");
        assert_eq!(body["message"], "Gateway error (500): boom");
        assert_eq!(body["detail"]["status"], 500);
        assert_eq!(body["detail"]["body"], "boom");
    }

    #[test]
    fn transport_error_body_omits_detail() {
        let err = ToolError::Transport("connection refused".to_string());
        let body = serde_json::to_value(err.to_body()).expect("serialize");
        assert_eq!(body["kind"], "transport_error");
        assert!(body.get("detail").is_none());
        assert!(!err.is_caller_error());
    }

    #[test]
    fn invalid_path_argument_body_names_the_value() {
        let err = ToolError::InvalidPathArgument {
            tool: "bitable_get_app".to_string(),
            argument: "app_token".to_string(),
            value: "..".to_string(),
        };
        let body = serde_json::to_value(err.to_body()).expect("serialize");
        assert_eq!(body["kind"], "invalid_path_argument");
        assert_eq!(body["detail"]["value"], "..");
        assert!(err.is_caller_error());
    }

    #[test]
    fn unknown_tool_is_a_caller_error() {
        let err = ToolError::UnknownTool("nope".to_string());
        assert!(err.is_caller_error());
        assert_eq!(err.to_string(), "Unknown tool: nope");
    }
}
