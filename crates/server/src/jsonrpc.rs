//! JSON-RPC 2.0 response envelopes.
//!
//! Requests are decoded leniently (as a raw `serde_json::Value`) by the dispatcher so that a
//! malformed envelope can still be answered with the caller's `id`. Error objects are rmcp's
//! [`ErrorData`].

use lark_bitable_http_tools::ToolError;
use rmcp::model::{ErrorCode, ErrorData, JsonRpcVersion2_0, RequestId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Server-defined: the gateway answered with a non-2xx status.
pub const GATEWAY_ERROR: ErrorCode = ErrorCode(-32000);

#[must_use]
pub fn parse_error(detail: impl Into<Value>) -> ErrorData {
    ErrorData::new(ErrorCode::PARSE_ERROR, "Parse error", Some(detail.into()))
}

#[must_use]
pub fn invalid_request(detail: impl Into<Value>) -> ErrorData {
    ErrorData::new(
        ErrorCode::INVALID_REQUEST,
        "Invalid Request",
        Some(detail.into()),
    )
}

#[must_use]
pub fn method_not_found(method: &str) -> ErrorData {
    ErrorData::new(
        ErrorCode::METHOD_NOT_FOUND,
        "Method not found",
        Some(Value::String(format!("Method \"{method}\" is not supported"))),
    )
}

#[must_use]
pub fn invalid_params(detail: impl Into<Value>) -> ErrorData {
    ErrorData::new(ErrorCode::INVALID_PARAMS, "Invalid params", Some(detail.into()))
}

#[must_use]
pub fn internal_error(detail: impl Into<Value>) -> ErrorData {
    ErrorData::new(ErrorCode::INTERNAL_ERROR, "Internal error", Some(detail.into()))
}

/// Map a tool failure to an error object; `data` is the shared `{kind, message, detail?}` body.
#[must_use]
pub fn tool_error(err: &ToolError) -> ErrorData {
    let (code, message) = match err {
        ToolError::UnknownTool(_) => (ErrorCode::INVALID_PARAMS, "Unknown tool"),
        ToolError::MissingPathArgument { .. } | ToolError::InvalidPathArgument { .. } => {
            (ErrorCode::INVALID_PARAMS, "Invalid params")
        }
        ToolError::Gateway { .. } => (GATEWAY_ERROR, "Gateway error"),
        ToolError::Transport(_) | ToolError::Config(_) => {
            (ErrorCode::INTERNAL_ERROR, "Internal error")
        }
    };
    let data = serde_json::to_value(err.to_body()).unwrap_or(Value::Null);
    ErrorData::new(code, message, Some(data))
}

/// True for errors about the envelope itself rather than the call it carried.
#[must_use]
pub fn is_envelope_error(error: &ErrorData) -> bool {
    error.code == ErrorCode::PARSE_ERROR || error.code == ErrorCode::INVALID_REQUEST
}

/// Decode a raw `id` member; anything but a string or integer is not a usable id.
#[must_use]
pub fn request_id(raw: &Value) -> Option<RequestId> {
    serde_json::from_value(raw.clone()).ok()
}

/// Response envelope. `id` serializes as `null` when the request's id could not be read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: JsonRpcVersion2_0,
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorData>,
}

impl JsonRpcResponse {
    #[must_use]
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JsonRpcVersion2_0,
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    #[must_use]
    pub fn failure(id: Option<RequestId>, error: ErrorData) -> Self {
        Self {
            jsonrpc: JsonRpcVersion2_0,
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_omits_error_member() {
        let resp = JsonRpcResponse::success(RequestId::Number(1), json!({"ok": true}));
        let v = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(v, json!({"jsonrpc": "2.0", "id": 1, "result": {"ok": true}}));
    }

    #[test]
    fn failure_omits_result_member() {
        let resp = JsonRpcResponse::failure(request_id(&json!("a")), method_not_found("x/y"));
        let v = serde_json::to_value(&resp).expect("serialize");
        assert!(v.get("result").is_none());
        assert_eq!(v["id"], "a");
        assert_eq!(v["error"]["code"], -32601);
        assert_eq!(v["error"]["data"], "Method \"x/y\" is not supported");
    }

    #[test]
    fn unreadable_id_serializes_as_null() {
        assert_eq!(request_id(&json!({"nested": 1})), None);
        let resp = JsonRpcResponse::failure(None, parse_error("bad"));
        let v = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(v["id"], Value::Null);
        assert_eq!(v["error"]["code"], -32700);
    }

    #[test]
    fn gateway_failure_maps_to_server_error_with_body() {
        let err = tool_error(&ToolError::Gateway {
            status: 500,
            detail: "boom".to_string(),
        });
        assert_eq!(err.code, GATEWAY_ERROR);
        let data = err.data.expect("data");
        assert_eq!(data["kind"], "gateway_error");
        assert_eq!(data["detail"]["status"], 500);
        assert_eq!(data["detail"]["body"], "boom");
    }

    #[test]
    fn unknown_tool_maps_to_invalid_params() {
        let err = tool_error(&ToolError::UnknownTool("nope".to_string()));
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, "Unknown tool");
        assert!(!is_envelope_error(&err));
        assert!(is_envelope_error(&invalid_request("x")));
    }
}
