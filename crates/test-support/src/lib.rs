use anyhow::Context as _;
use axum::Router;
use axum::body::Bytes;
use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse as _;
use axum::routing::any;
use serde_json::json;
use std::net::TcpListener;

/// Pick an unused TCP port on localhost.
///
/// Note: this does not reserve the port; it's still possible for another process to bind it
/// before you do.
///
/// # Errors
///
/// Returns an error if binding an ephemeral localhost port fails or if the bound socket's
/// local address cannot be read.
pub fn pick_unused_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").context("bind ephemeral port")?;
    Ok(listener.local_addr()?.port())
}

/// An axum server bound to an ephemeral localhost port, stopped on [`TestHttpServer::stop`].
pub struct TestHttpServer {
    pub base_url: String,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl TestHttpServer {
    /// # Errors
    ///
    /// Returns an error if no localhost port can be bound.
    pub async fn start(app: Router) -> anyhow::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind test server")?;
        let addr = listener.local_addr().context("local_addr")?;
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        let handle = tokio::spawn(async move { server.await });
        Ok(Self {
            base_url: format!("http://{addr}"),
            shutdown_tx,
            handle,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the server task panicked or exited with an I/O error.
    pub async fn stop(self) -> anyhow::Result<()> {
        let _ = self.shutdown_tx.send(());
        self.handle
            .await
            .context("server task join")?
            .context("server result")
    }
}

/// Mock Bitable gateway.
///
/// Every request is echoed back as `{ "method", "path", "body" }` (body parsed as JSON when
/// possible), except paths containing `/fail/` which answer `500 boom`.
#[must_use]
pub fn mock_gateway_router() -> Router {
    Router::new().route("/{*path}", any(mock_gateway_handler))
}

async fn mock_gateway_handler(method: Method, uri: Uri, body: Bytes) -> axum::response::Response {
    if uri.path().contains("/fail/") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }

    let body = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&body).into()))
    };

    axum::Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "body": body,
    }))
    .into_response()
}
