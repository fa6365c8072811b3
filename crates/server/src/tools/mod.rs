//! Host tool implementations.
//!
//! Each tool maps one host event onto the engine or the registry.

pub mod cache;
pub mod fetch;
pub mod lifecycle;
pub mod signals;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

pub use cache::{CacheGetParams, get_impl, stores_impl};
pub use fetch::{DashboardFetchParams, fetch_impl};
pub use lifecycle::{LifecycleUpdateParams, status_impl, update_impl};
pub use signals::{ConnectivityRestoredParams, PushMessageParams, notifications_impl, push_impl, sync_impl};

/// Render `output` as a pretty JSON text result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| ToolError::EncodeFailed(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
