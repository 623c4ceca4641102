use super::{McpState, json_response};
use crate::dispatch::ToolErrorStyle;
use crate::jsonrpc::{self, JsonRpcResponse};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse as _, Response};
use serde_json::Value;

/// Stateless `POST /mcp`: one request in, one JSON response out.
pub(super) async fn mcp_post_handler(State(state): State<McpState>, body: Bytes) -> Response {
    let message = match serde_json::from_slice::<Value>(&body) {
        Ok(v) => v,
        Err(e) => {
            let resp = JsonRpcResponse::failure(None, jsonrpc::parse_error(e.to_string()));
            return json_response(StatusCode::BAD_REQUEST, &resp);
        }
    };

    let Some(resp) = state
        .handler
        .handle(message, ToolErrorStyle::JsonRpcError)
        .await
    else {
        return StatusCode::NO_CONTENT.into_response();
    };

    json_response(status_for(&resp), &resp)
}

fn status_for(resp: &JsonRpcResponse) -> StatusCode {
    match resp.error.as_ref() {
        None => StatusCode::OK,
        Some(e) if jsonrpc::is_envelope_error(e) => StatusCode::BAD_REQUEST,
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RequestId;
    use serde_json::json;

    #[test]
    fn envelope_errors_are_client_errors() {
        let resp = JsonRpcResponse::failure(Some(RequestId::Number(1)), jsonrpc::invalid_request("x"));
        assert_eq!(status_for(&resp), StatusCode::BAD_REQUEST);
        let resp = JsonRpcResponse::failure(Some(RequestId::Number(1)), jsonrpc::method_not_found("x"));
        assert_eq!(status_for(&resp), StatusCode::INTERNAL_SERVER_ERROR);
        let resp = JsonRpcResponse::success(RequestId::Number(1), json!({}));
        assert_eq!(status_for(&resp), StatusCode::OK);
    }
}
