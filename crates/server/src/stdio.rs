//! Newline-delimited JSON-RPC over a byte stream.

use crate::dispatch::{McpHandler, ToolErrorStyle};
use crate::jsonrpc::{self, JsonRpcResponse};
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, AsyncWrite, AsyncWriteExt as _};
use tracing::{debug, info, warn};

/// Serve requests read line by line from `reader`, writing one response line per request.
///
/// Lines are handled strictly in order. Returns when `reader` reaches EOF.
///
/// # Errors
///
/// Returns an I/O error if reading or writing fails, or if a response cannot be encoded.
pub async fn serve_lines<R, W>(
    handler: &McpHandler,
    mut reader: R,
    mut writer: W,
) -> crate::error::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                handler.handle_text(text, ToolErrorStyle::ContentBlock).await
            }
            Err(e) => {
                warn!(error = %e, "stdin line is not valid UTF-8");
                Some(JsonRpcResponse::failure(
                    None,
                    jsonrpc::parse_error(format!("invalid UTF-8: {e}")),
                ))
            }
        };
        let Some(response) = response else {
            continue;
        };

        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
    }

    debug!("stdin closed");
    Ok(())
}

/// Bind [`serve_lines`] to the process stdin and stdout.
///
/// # Errors
///
/// See [`serve_lines`].
pub async fn serve_stdio(handler: McpHandler) -> crate::error::Result<()> {
    info!(
        server = %handler.info().name,
        gateway = %handler.gateway_url(),
        "serving MCP over stdio"
    );
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve_lines(&handler, stdin, tokio::io::stdout()).await
}
