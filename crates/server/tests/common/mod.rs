use anyhow::Context as _;
use futures::StreamExt as _;
use lark_bitable_http_tools::{GatewayClient, ToolCatalog};
use lark_bitable_mcp::dispatch::{McpHandler, ServerInfo};
use lark_bitable_mcp::mcp::{McpState, router};
use lark_bitable_test_support::{TestHttpServer, mock_gateway_router};
use std::sync::Arc;
use tokio::io::AsyncBufReadExt as _;
use tokio_util::io::StreamReader;

/// The MCP server under test plus the mock gateway it talks to.
pub struct Harness {
    pub mcp: TestHttpServer,
    pub gateway: TestHttpServer,
    pub client: reqwest::Client,
}

impl Harness {
    pub async fn start(auth_secret: Option<&str>) -> anyhow::Result<Self> {
        let gateway = TestHttpServer::start(mock_gateway_router()).await?;
        let handler = McpHandler::new(
            Arc::new(ToolCatalog::bitable()),
            Arc::new(GatewayClient::new(gateway.base_url.clone())?),
            ServerInfo {
                name: "lark-bitable-mcp".to_string(),
                version: "1.0.0".to_string(),
            },
        );
        let mcp = TestHttpServer::start(router(McpState::new(handler, auth_secret))).await?;
        Ok(Self {
            mcp,
            gateway,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.mcp.base_url)
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> anyhow::Result<reqwest::Response> {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {path}"))
    }

    pub async fn stop(self) -> anyhow::Result<()> {
        self.mcp.stop().await?;
        self.gateway.stop().await
    }
}

/// Read the first complete event from a `text/event-stream` response as `(event, data)`.
#[allow(dead_code)]
pub async fn read_first_event(resp: reqwest::Response) -> anyhow::Result<(String, String)> {
    let mut stream = resp.bytes_stream();
    let byte_stream = futures::stream::poll_fn(move |cx| stream.poll_next_unpin(cx))
        .map(|r| r.map_err(std::io::Error::other));
    let reader = StreamReader::new(byte_stream);
    let mut lines = tokio::io::BufReader::new(reader).lines();

    let mut event = String::new();
    let mut data_lines: Vec<String> = Vec::new();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim_end().to_string();

        if line.is_empty() {
            if data_lines.is_empty() {
                continue;
            }
            return Ok((event, data_lines.join("\n")));
        }

        if let Some(v) = line.strip_prefix("event:") {
            event = v.trim().to_string();
        } else if let Some(v) = line.strip_prefix("data:") {
            data_lines.push(v.trim().to_string());
        }
    }

    anyhow::bail!("event-stream ended without an event")
}

/// Parse `result.content[0].text` of a `tools/call` response as JSON.
#[allow(dead_code)]
pub fn tool_call_text_json(msg: &serde_json::Value) -> anyhow::Result<serde_json::Value> {
    let text = msg
        .pointer("/result/content/0/text")
        .and_then(serde_json::Value::as_str)
        .context("tools/call missing result.content[0].text")?;
    serde_json::from_str(text).context("tools/call text is not JSON")
}
