//! connectivity_restored, push_message and notifications_list tools.

use pwacache_client::Notification;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::state::HostState;

/// Parameters for connectivity_restored.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConnectivityRestoredParams {
    /// Sync tag delivered by the host.
    pub tag: String,
}

/// Parameters for push_message.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushMessageParams {
    /// Raw push payload, expected to be JSON `{"title": ..., "body": ...}`.
    pub payload: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SyncOutput {
    tag: String,
    purged: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PushOutput {
    shown: bool,
}

#[derive(Debug, Clone, Serialize)]
struct NotificationsOutput {
    notifications: Vec<Notification>,
}

pub async fn sync_impl(state: &HostState, params: ConnectivityRestoredParams) -> Result<CallToolResult, McpError> {
    let purged = state.engine().await.on_sync(&params.tag).await?;
    json_result(&SyncOutput { tag: params.tag, purged })
}

pub async fn push_impl(state: &HostState, params: PushMessageParams) -> Result<CallToolResult, McpError> {
    let shown = state.engine().await.on_push(params.payload.as_bytes());
    json_result(&PushOutput { shown })
}

/// Drain the notifications shown since the last call.
pub fn notifications_impl(state: &HostState) -> Result<CallToolResult, McpError> {
    json_result(&NotificationsOutput { notifications: state.notifications.drain() })
}
