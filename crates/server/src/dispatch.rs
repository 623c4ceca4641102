//! Shared MCP dispatch used by every transport.
//!
//! Transports only differ in how bytes move; decoding the envelope, routing by method and turning
//! tool failures into caller-visible errors all happen here.

use crate::jsonrpc::{self, JSONRPC_VERSION, JsonRpcResponse};
use lark_bitable_http_tools::{Gateway, ToolCatalog, ToolError};
use rmcp::model::{CallToolResult, Content, ErrorData};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// How a failed `tools/call` is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorStyle {
    /// Successful JSON-RPC response whose result is a `CallToolResult` with `isError: true`
    /// (stdio and SSE).
    ContentBlock,
    /// JSON-RPC error object (stateless `/mcp`).
    JsonRpcError,
}

#[derive(Clone)]
pub struct McpHandler {
    catalog: Arc<ToolCatalog>,
    gateway: Arc<dyn Gateway>,
    info: ServerInfo,
}

impl McpHandler {
    #[must_use]
    pub fn new(catalog: Arc<ToolCatalog>, gateway: Arc<dyn Gateway>, info: ServerInfo) -> Self {
        Self {
            catalog,
            gateway,
            info,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    #[must_use]
    pub fn gateway_url(&self) -> &str {
        self.gateway.base_url()
    }

    /// Decode one raw JSON text and dispatch it.
    ///
    /// Undecodable text yields a parse error with a `null` id.
    pub async fn handle_text(&self, text: &str, style: ToolErrorStyle) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<Value>(text) {
            Ok(message) => self.handle(message, style).await,
            Err(e) => Some(JsonRpcResponse::failure(
                None,
                jsonrpc::parse_error(e.to_string()),
            )),
        }
    }

    /// Dispatch one decoded message.
    ///
    /// Returns `None` for notifications (no `id` member), which never get a response envelope.
    pub async fn handle(&self, message: Value, style: ToolErrorStyle) -> Option<JsonRpcResponse> {
        let raw_id = message.get("id");

        if message.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
            return Some(JsonRpcResponse::failure(
                raw_id.and_then(jsonrpc::request_id),
                jsonrpc::invalid_request("Must be valid JSON-RPC 2.0 message"),
            ));
        }

        let method = message.get("method").and_then(Value::as_str);
        let Some(raw_id) = raw_id else {
            let method = method.unwrap_or("");
            debug!(method, "notification ignored");
            return None;
        };
        let Some(id) = jsonrpc::request_id(raw_id) else {
            return Some(JsonRpcResponse::failure(
                None,
                jsonrpc::invalid_request("id must be a string or an integer"),
            ));
        };

        let Some(method) = method else {
            return Some(JsonRpcResponse::failure(
                Some(id),
                jsonrpc::invalid_request("Missing method"),
            ));
        };

        let params = message.get("params").cloned().unwrap_or(Value::Null);
        let outcome = match method {
            "initialize" => Ok(self.initialize_result()),
            "tools/list" => Ok(self.tools_list_result()),
            "tools/call" => self.tools_call_result(&params, style).await,
            other => Err(jsonrpc::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(Some(id), error),
        })
    }

    /// Resolve and invoke one tool.
    ///
    /// # Errors
    ///
    /// Any [`ToolError`] from resolution or the gateway round-trip.
    pub async fn call_tool(&self, name: &str, arguments: &Value) -> Result<Value, ToolError> {
        let request = self.catalog.resolve(name, arguments)?;
        debug!(
            tool = %name,
            method = %request.method,
            path = %request.path,
            "invoking gateway"
        );
        self.gateway.invoke(&request).await
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": self.info.name,
                "version": self.info.version,
            }
        })
    }

    fn tools_list_result(&self) -> Value {
        json!({ "tools": self.catalog.list_tools() })
    }

    async fn tools_call_result(
        &self,
        params: &Value,
        style: ToolErrorStyle,
    ) -> Result<Value, ErrorData> {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return Err(jsonrpc::invalid_params("Missing required parameter: name"));
        };
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        let result = match self.call_tool(name, &arguments).await {
            Ok(body) => {
                let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
                CallToolResult::success(vec![Content::text(text)])
            }
            Err(err) => {
                if err.is_caller_error() {
                    debug!(tool = %name, kind = err.kind(), error = %err, "tool call rejected");
                } else {
                    warn!(tool = %name, kind = err.kind(), error = %err, "tool call failed");
                }
                match style {
                    ToolErrorStyle::JsonRpcError => return Err(jsonrpc::tool_error(&err)),
                    ToolErrorStyle::ContentBlock => {
                        CallToolResult::error(vec![Content::text(format!("Error: {err}"))])
                    }
                }
            }
        };

        serde_json::to_value(&result)
            .map_err(|e| jsonrpc::internal_error(e.to_string()))
    }
}
