//! Gateway round-trips.
//!
//! [`Gateway`] is the seam transports depend on; [`GatewayClient`] is the only production
//! implementation. It performs exactly one HTTP request per call: no retries, no caching, and no
//! timeout beyond whatever `reqwest` does by default.

use crate::error::{Result, ToolError};
use crate::resolver::ResolvedRequest;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::debug;
use url::Url;

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Execute one resolved request and return the decoded JSON body.
    async fn invoke(&self, request: &ResolvedRequest) -> Result<Value>;

    /// Base URL reported by health checks.
    fn base_url(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: String,
    client: Client,
}

impl GatewayClient {
    /// # Errors
    ///
    /// Returns [`ToolError::Config`] if `base_url` is not an absolute `http(s)` URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let parsed = Url::parse(&base_url)
            .map_err(|e| ToolError::Config(format!("Invalid gateway URL '{base_url}': {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ToolError::Config(format!(
                "Invalid gateway URL '{base_url}': unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Gateway for GatewayClient {
    async fn invoke(&self, request: &ResolvedRequest) -> Result<Value> {
        let url = self.url_for(&request.path);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = request.body.as_ref()
            && request.method != Method::GET
        {
            builder = builder.body(serde_json::to_vec(body).map_err(|e| {
                ToolError::Transport(format!("could not encode request body: {e}"))
            })?);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "gateway response"
        );

        let text = response.text().await?;
        if !status.is_success() {
            return Err(ToolError::Gateway {
                status: status.as_u16(),
                detail: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ToolError::Transport(format!("invalid JSON from gateway: {e}")))
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, Method as AxumMethod, StatusCode, Uri};
    use axum::routing::any;
    use lark_bitable_test_support::TestHttpServer;
    use serde_json::json;

    async fn echo_handler(
        method: AxumMethod,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> axum::Json<Value> {
        axum::Json(json!({
            "method": method.as_str(),
            "path": uri.path(),
            "content_type": headers
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            "body": String::from_utf8_lossy(&body),
        }))
    }

    #[test]
    fn new_rejects_non_http_base_url() {
        assert!(GatewayClient::new("ftp://example.com").is_err());
        assert!(GatewayClient::new("not a url").is_err());
        let client = GatewayClient::new("https://example.com/").expect("valid");
        assert_eq!(client.base_url(), "https://example.com");
    }

    #[tokio::test]
    async fn invoke_sends_json_body_and_content_type() {
        let server = TestHttpServer::start(Router::new().route("/{*path}", any(echo_handler)))
            .await
            .expect("start mock gateway");
        let client = GatewayClient::new(server.base_url.clone()).expect("client");

        let echoed = client
            .invoke(&ResolvedRequest {
                method: Method::POST,
                path: "/bitable/apps".to_string(),
                body: Some(json!({"name": "CRM"})),
            })
            .await
            .expect("invoke");

        assert_eq!(echoed["method"], "POST");
        assert_eq!(echoed["path"], "/bitable/apps");
        assert_eq!(echoed["content_type"], "application/json");
        let sent: Value =
            serde_json::from_str(echoed["body"].as_str().unwrap_or_default()).expect("body json");
        assert_eq!(sent, json!({"name": "CRM"}));

        server.stop().await.expect("stop mock gateway");
    }

    #[tokio::test]
    async fn invoke_never_sends_a_body_with_get() {
        let server = TestHttpServer::start(Router::new().route("/{*path}", any(echo_handler)))
            .await
            .expect("start mock gateway");
        let client = GatewayClient::new(server.base_url.clone()).expect("client");

        let echoed = client
            .invoke(&ResolvedRequest {
                method: Method::GET,
                path: "/bitable/apps/A/tables".to_string(),
                body: Some(json!({"page_size": 10})),
            })
            .await
            .expect("invoke");

        assert_eq!(echoed["method"], "GET");
        assert_eq!(echoed["content_type"], "application/json");
        assert_eq!(echoed["body"], "");

        server.stop().await.expect("stop mock gateway");
    }

    #[tokio::test]
    async fn non_2xx_surfaces_status_and_raw_text() {
        async fn boom() -> (StatusCode, &'static str) {
            (StatusCode::INTERNAL_SERVER_ERROR, "boom")
        }
        let server = TestHttpServer::start(Router::new().route("/{*path}", any(boom)))
            .await
            .expect("start mock gateway");
        let client = GatewayClient::new(server.base_url.clone()).expect("client");

        let err = client
            .invoke(&ResolvedRequest {
                method: Method::GET,
                path: "/bitable/apps".to_string(),
                body: None,
            })
            .await
            .expect_err("must fail");

        match err {
            ToolError::Gateway { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        server.stop().await.expect("stop mock gateway");
    }

    #[tokio::test]
    async fn undecodable_success_body_is_a_transport_error() {
        async fn not_json() -> &'static str {
            "<html>oops</html>"
        }
        let server = TestHttpServer::start(Router::new().route("/{*path}", any(not_json)))
            .await
            .expect("start mock gateway");
        let client = GatewayClient::new(server.base_url.clone()).expect("client");

        let err = client
            .invoke(&ResolvedRequest {
                method: Method::GET,
                path: "/bitable/apps".to_string(),
                body: None,
            })
            .await
            .expect_err("must fail");
        assert_eq!(err.kind(), "transport_error");

        server.stop().await.expect("stop mock gateway");
    }

    #[tokio::test]
    async fn empty_success_body_decodes_to_null() {
        async fn no_content() -> StatusCode {
            StatusCode::NO_CONTENT
        }
        let server = TestHttpServer::start(Router::new().route("/{*path}", any(no_content)))
            .await
            .expect("start mock gateway");
        let client = GatewayClient::new(server.base_url.clone()).expect("client");

        let value = client
            .invoke(&ResolvedRequest {
                method: Method::DELETE,
                path: "/bitable/apps/A/tables/T".to_string(),
                body: None,
            })
            .await
            .expect("invoke");
        assert_eq!(value, Value::Null);

        server.stop().await.expect("stop mock gateway");
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        let port = lark_bitable_test_support::pick_unused_port().expect("port");
        let client = GatewayClient::new(format!("http://127.0.0.1:{port}")).expect("client");

        let err = client
            .invoke(&ResolvedRequest {
                method: Method::GET,
                path: "/bitable/apps".to_string(),
                body: None,
            })
            .await
            .expect_err("must fail");
        assert!(matches!(err, ToolError::Transport(_)));
        assert!(err.to_string().starts_with("Failed to call gateway"));
    }
}
