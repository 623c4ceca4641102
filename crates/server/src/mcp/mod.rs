//! HTTP hosting: health, legacy SSE, stateless `/mcp` and the bearer gate in front of them.

mod auth;
mod health;
mod sse;
mod streamable_http;

pub use auth::{AuthDenied, authorize};
pub use health::HealthReport;

use crate::dispatch::McpHandler;
use crate::error::{Result, ServerError};
use axum::Router;
use axum::http::{HeaderName, Method, StatusCode, header};
use axum::middleware;
use axum::response::{IntoResponse as _, Response};
use axum::routing::{get, post};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

const SESSION_ID_HEADER: &str = "mcp-session-id";

#[derive(Clone)]
pub struct McpState {
    pub handler: McpHandler,
    pub auth_secret: Option<Arc<str>>,
}

impl McpState {
    #[must_use]
    pub fn new(handler: McpHandler, auth_secret: Option<&str>) -> Self {
        Self {
            handler,
            auth_secret: auth_secret.filter(|s| !s.is_empty()).map(Arc::from),
        }
    }
}

/// Build the full HTTP surface.
///
/// `/health` and `/` are public; everything else (including unknown paths) sits behind the bearer
/// gate. CORS wraps the whole router so preflights are answered before the gate. A known path hit
/// with the wrong method gets the same 404 body as an unknown path.
pub fn router(state: McpState) -> Router {
    let protected = Router::new()
        .route("/sse", get(sse::sse_handler).fallback(not_found))
        .route(
            sse::MESSAGES_ENDPOINT,
            post(sse::messages_handler).fallback(not_found),
        )
        .route(
            "/mcp",
            post(streamable_http::mcp_post_handler).fallback(not_found),
        )
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(SESSION_ID_HEADER),
        ]);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(health::health_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `bind` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns [`ServerError::Startup`] if the address cannot be bound, or an I/O error if the server
/// stops abnormally.
pub async fn serve(state: McpState, bind: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| ServerError::Startup(format!("bind {bind}: {e}")))?;
    let local = listener.local_addr()?;

    info!(
        bind = %local,
        server = %state.handler.info().name,
        gateway = %state.handler.gateway_url(),
        auth = state.auth_secret.is_some(),
        tools = state.handler.catalog().len(),
        "serving MCP over HTTP"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        axum::Json(json!({
            "error": "Not Found",
            "message": "Available endpoints: /health, /sse, /messages, /mcp",
        })),
    )
        .into_response()
}

pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (status, axum::Json(body)).into_response()
}
