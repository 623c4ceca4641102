//! Legacy SSE transport: `GET /sse` announces the message endpoint, `POST /messages` carries requests.
//!
//! Sessions are not correlated: a `POST /messages` answer is returned in the POST response itself
//! rather than pushed onto an open stream.

use super::{McpState, json_response};
use crate::dispatch::ToolErrorStyle;
use crate::jsonrpc::{self, JsonRpcResponse};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse as _, Response};
use futures::stream::{self, Stream, StreamExt as _};
use serde_json::Value;
use std::convert::Infallible;
use tracing::debug;

pub(super) const MESSAGES_ENDPOINT: &str = "/messages";

pub(super) async fn sse_handler() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("sse stream opened");
    let endpoint = stream::once(async {
        Ok::<_, Infallible>(Event::default().event("endpoint").data(MESSAGES_ENDPOINT))
    });
    Sse::new(endpoint.chain(stream::pending())).keep_alive(KeepAlive::default())
}

pub(super) async fn messages_handler(State(state): State<McpState>, body: Bytes) -> Response {
    let message = match serde_json::from_slice::<Value>(&body) {
        Ok(v) => v,
        Err(e) => {
            let resp = JsonRpcResponse::failure(None, jsonrpc::parse_error(e.to_string()));
            return json_response(StatusCode::BAD_REQUEST, &resp);
        }
    };

    match state.handler.handle(message, ToolErrorStyle::ContentBlock).await {
        Some(resp) => json_response(StatusCode::OK, &resp),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
