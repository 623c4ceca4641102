use super::McpState;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse as _, Response};
use serde_json::json;

const REALM: &str = r#"Bearer realm="MCP Server""#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDenied {
    MissingToken,
    InvalidToken,
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let authz = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    authz.strip_prefix("Bearer ")
}

/// Check `Authorization: Bearer <secret>`.
///
/// With no secret configured every request is allowed.
///
/// # Errors
///
/// Returns [`AuthDenied`] when a secret is configured and the header is absent or does not match.
pub fn authorize(headers: &HeaderMap, secret: Option<&str>) -> Result<(), AuthDenied> {
    let Some(secret) = secret else {
        return Ok(());
    };
    match extract_bearer(headers) {
        None => Err(AuthDenied::MissingToken),
        Some(token) if token == secret => Ok(()),
        Some(_) => Err(AuthDenied::InvalidToken),
    }
}

pub(super) fn unauthorized() -> Response {
    let mut resp = (
        StatusCode::UNAUTHORIZED,
        axum::Json(json!({
            "error": "Unauthorized",
            "message": "Invalid or missing Bearer token",
        })),
    )
        .into_response();
    resp.headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(REALM));
    resp
}

pub(super) async fn require_bearer(
    State(state): State<McpState>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(denied) = authorize(request.headers(), state.auth_secret.as_deref()) {
        tracing::warn!(
            reason = ?denied,
            path = %request.uri().path(),
            "rejected unauthenticated request"
        );
        return unauthorized();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(authz: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(authz).expect("header"),
        );
        h
    }

    #[test]
    fn no_secret_allows_everything() {
        assert_eq!(authorize(&HeaderMap::new(), None), Ok(()));
        assert_eq!(authorize(&headers("Bearer anything"), None), Ok(()));
    }

    #[test]
    fn exact_bearer_match_is_required() {
        let secret = Some("s3cret");
        assert_eq!(authorize(&headers("Bearer s3cret"), secret), Ok(()));
        assert_eq!(
            authorize(&HeaderMap::new(), secret),
            Err(AuthDenied::MissingToken)
        );
        assert_eq!(
            authorize(&headers("Bearer s3cret "), secret),
            Err(AuthDenied::InvalidToken)
        );
        assert_eq!(
            authorize(&headers("Basic s3cret"), secret),
            Err(AuthDenied::MissingToken)
        );
        assert_eq!(
            authorize(&headers("bearer s3cret"), secret),
            Err(AuthDenied::MissingToken)
        );
    }

    #[test]
    fn unauthorized_carries_challenge_header() {
        let resp = unauthorized();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get(header::WWW_AUTHENTICATE),
            Some(&HeaderValue::from_static(REALM))
        );
    }
}
