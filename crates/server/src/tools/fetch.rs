//! dashboard_fetch tool implementation.
//!
//! Routes one dashboard request through the engine. Requests the engine
//! declines go straight to the network, as the host would do by default.

use chrono::Utc;
use pwacache_client::{Interception, OfflineWorker, fetch::resolve};
use pwacache_core::{Request, ResponseSource};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::ToolError;
use crate::state::HostState;

/// Input parameters for dashboard_fetch.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DashboardFetchParams {
    /// Absolute URL or a path relative to the dashboard origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default)]
    pub method: Option<String>,

    /// Optional Accept header.
    #[serde(default)]
    pub accept: Option<String>,
}

/// Output structure for dashboard_fetch.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DashboardFetchOutput {
    /// The resolved request URL.
    pub url: String,
    pub method: String,
    /// Whether the engine answered (false means passthrough).
    pub handled: bool,
    pub status: u16,
    /// Which path produced the response.
    pub source: ResponseSource,
    pub content_type: Option<String>,
    /// Body as UTF-8 (lossy).
    pub body: String,
    /// ISO8601 timestamp of when the response was produced.
    pub fetched_at: String,
}

/// Implementation of the dashboard_fetch tool.
pub async fn fetch_impl(state: &HostState, params: DashboardFetchParams) -> Result<CallToolResult, McpError> {
    let engine = state.engine().await;
    let url = resolve(&engine.config().origin, &params.url).map_err(ToolError::from)?;
    let method = params.method.as_deref().unwrap_or("GET");
    if method.trim().is_empty() {
        return Err(ToolError::InvalidInput("method cannot be empty".into()).into());
    }
    let mut request = Request::new(method.trim(), url);
    if let Some(accept) = params.accept.as_deref() {
        request = request.with_header("accept", accept);
    }

    let (handled, response) = match engine.intercept(request.clone()).await? {
        Interception::Handled(response) => (true, response),
        Interception::Passthrough => (false, state.network.fetch(&request).await?),
    };

    let output = DashboardFetchOutput {
        url: request.url.to_string(),
        method: request.method,
        handled,
        status: response.status,
        source: response.source,
        content_type: response.content_type().map(str::to_string),
        body: response.text(),
        fetched_at: Utc::now().to_rfc3339(),
    };

    json_result(&output)
}
