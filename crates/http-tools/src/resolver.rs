//! Tool name + arguments → concrete gateway request.
//!
//! Resolution is pure: no I/O, no schema validation. Path placeholders are filled from the
//! argument bag and stripped from the body; everything else is forwarded untouched. Each
//! substituted value is percent-encoded as exactly one path segment.

use crate::catalog::ToolCatalog;
use crate::error::{Result, ToolError};
use reqwest::Method;
use serde_json::{Map, Value};

/// Argument names that may appear as `{placeholder}` segments in a path template.
///
/// These keys are never forwarded in a request body, whether or not the tool's template uses them.
pub const RESERVED_PATH_ARGUMENTS: [&str; 4] = ["app_token", "table_id", "field_id", "record_id"];

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub method: Method,
    /// Path relative to the gateway base URL, always starting with `/`.
    pub path: String,
    pub body: Option<Value>,
}

impl ToolCatalog {
    /// Resolve a tool invocation to the HTTP request the gateway expects.
    ///
    /// Non-object `arguments` (including `null`) are treated as an empty argument bag.
    ///
    /// # Errors
    ///
    /// - [`ToolError::UnknownTool`] if `tool_name` has no endpoint mapping.
    /// - [`ToolError::MissingPathArgument`] if the template needs an argument that is absent or
    ///   `null`.
    /// - [`ToolError::InvalidPathArgument`] if a path value is empty, `.` or `..`.
    pub fn resolve(&self, tool_name: &str, arguments: &Value) -> Result<ResolvedRequest> {
        let endpoint = self
            .endpoint(tool_name)
            .ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;

        let empty = Map::new();
        let args = arguments.as_object().unwrap_or(&empty);

        let mut path = fill_template(&endpoint.path_template, |placeholder| {
            match args.get(placeholder) {
                None | Some(Value::Null) => Err(ToolError::MissingPathArgument {
                    tool: tool_name.to_string(),
                    argument: placeholder.to_string(),
                }),
                Some(v) => {
                    let value = value_to_string(v);
                    if matches!(value.as_str(), "" | "." | "..") {
                        return Err(ToolError::InvalidPathArgument {
                            tool: tool_name.to_string(),
                            argument: placeholder.to_string(),
                            value,
                        });
                    }
                    Ok(urlencoding::encode(&value).into_owned())
                }
            }
        })?;
        if !path.starts_with('/') {
            path = format!("/{path}");
        }

        let body: Map<String, Value> = args
            .iter()
            .filter(|(k, _)| !RESERVED_PATH_ARGUMENTS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let body = if body.is_empty() && !is_body_bearing(&endpoint.method) {
            None
        } else {
            Some(Value::Object(body))
        };

        Ok(ResolvedRequest {
            method: endpoint.method.clone(),
            path,
            body,
        })
    }
}

/// POST, PUT and PATCH carry a body even when it is empty.
#[must_use]
pub fn is_body_bearing(method: &Method) -> bool {
    method == Method::POST || method == Method::PUT || method == Method::PATCH
}

/// Placeholder names in a `{name}`-style template, in order of appearance.
pub(crate) fn template_placeholders(template: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else { break };
        out.push(&after[..end]);
        rest = &after[end + 1..];
    }
    out
}

/// Replace every `{name}` in `template` with `fill(name)`, scanning left to right once.
///
/// Substituted text is never rescanned, so a value that itself looks like `{name}` stays literal.
fn fill_template<'a, F>(template: &'a str, mut fill: F) -> Result<String>
where
    F: FnMut(&'a str) -> Result<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else { break };
        out.push_str(&rest[..start]);
        out.push_str(&fill(&after[..end])?);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
