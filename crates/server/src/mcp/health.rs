use super::McpState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub server: String,
    pub version: String,
    pub transports: [&'static str; 2],
    pub tools: usize,
    pub gateway: String,
    pub authentication: &'static str,
}

pub(super) async fn health_handler(State(state): State<McpState>) -> Json<HealthReport> {
    let info = state.handler.info();
    Json(HealthReport {
        status: "healthy",
        server: info.name.clone(),
        version: info.version.clone(),
        transports: ["sse", "streamable-http"],
        tools: state.handler.catalog().len(),
        gateway: state.handler.gateway_url().to_string(),
        authentication: if state.auth_secret.is_some() {
            "enabled"
        } else {
            "disabled"
        },
    })
}
