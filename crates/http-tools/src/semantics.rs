//! MCP tool annotations derived from the HTTP method a tool maps to.

use reqwest::Method;
use rmcp::model::ToolAnnotations;

/// Hints for a gateway-backed tool.
///
/// Every tool talks to the gateway, so `openWorldHint` is always `true`. Methods outside
/// GET/POST/PUT/PATCH/DELETE only get that hint.
#[must_use]
pub fn annotations_for_method(method: &Method) -> ToolAnnotations {
    // (read_only, destructive, idempotent)
    let (read_only_hint, destructive_hint, idempotent_hint) =
        if method == Method::GET || method == Method::HEAD {
            (Some(true), Some(false), Some(true))
        } else if method == Method::POST {
            (Some(false), Some(false), Some(false))
        } else if method == Method::PUT || method == Method::DELETE {
            (Some(false), Some(true), Some(true))
        } else if method == Method::PATCH {
            (Some(false), Some(true), None)
        } else {
            (None, None, None)
        };

    ToolAnnotations {
        title: None,
        read_only_hint,
        destructive_hint,
        idempotent_hint,
        open_world_hint: Some(true),
    }
}
