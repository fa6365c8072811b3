//! MCP server handler implementation.
//!
//! This module defines the host shim: every tool forwards one host event to
//! the engine or the registry.
use std::sync::Arc;

use crate::state::HostState;
use crate::tools::{
    CacheGetParams, ConnectivityRestoredParams, DashboardFetchParams, LifecycleUpdateParams, PushMessageParams,
    fetch_impl, get_impl, notifications_impl, push_impl, status_impl, stores_impl, sync_impl, update_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The MCP server handler for pwacache.
#[derive(Clone)]
pub struct PwaCacheServer {
    state: Arc<HostState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl PwaCacheServer {
    /// Create a new server handler over shared host state.
    pub fn new(state: Arc<HostState>) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Send a dashboard request through the offline cache. Returns status, source (network, cache or fallback) and body."
    )]
    async fn dashboard_fetch(&self, params: Parameters<DashboardFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.state, params.0).await
    }

    #[tool(description = "Report the lifecycle state of the engine in control and its store names.")]
    async fn lifecycle_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.state).await
    }

    /// Install a new build version and hand control to it.
    ///
    /// The current version keeps serving if the install fails.
    #[tool(
        description = "Install and activate a new build version. Deletes stores of older versions. Fails without side effects if any manifest asset cannot be fetched."
    )]
    async fn lifecycle_update(&self, params: Parameters<LifecycleUpdateParams>) -> Result<CallToolResult, McpError> {
        update_impl(&self.state, params.0).await
    }

    #[tool(description = "Signal that connectivity was restored. The configured sync tag empties the dynamic store.")]
    async fn connectivity_restored(
        &self, params: Parameters<ConnectivityRestoredParams>,
    ) -> Result<CallToolResult, McpError> {
        sync_impl(&self.state, params.0).await
    }

    #[tool(description = "Deliver a push message payload ({\"title\", \"body\"} JSON). Malformed payloads are dropped.")]
    async fn push_message(&self, params: Parameters<PushMessageParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.state, params.0).await
    }

    #[tool(description = "Return and clear notifications shown since the last call.")]
    async fn notifications_list(&self) -> Result<CallToolResult, McpError> {
        notifications_impl(&self.state)
    }

    #[tool(description = "Read one stored entry by store name and URL.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.state, params.0).await
    }

    #[tool(description = "List stores with entry counts and the active registration.")]
    async fn cache_stores(&self) -> Result<CallToolResult, McpError> {
        stores_impl(&self.state).await
    }
}

impl ServerHandler for PwaCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "pwacache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
