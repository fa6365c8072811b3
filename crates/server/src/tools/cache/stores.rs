//! cache_stores tool implementation.

use pwacache_core::Registration;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::{Deserialize, Serialize};

use crate::state::HostState;
use crate::tools::json_result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSummary {
    pub name: String,
    pub entries: u64,
}

/// Output from the cache_stores tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStoresOutput {
    pub stores: Vec<StoreSummary>,
    /// Store pair recorded by the last activation.
    pub active: Option<Registration>,
}

/// List every store with its entry count.
pub async fn stores_impl(state: &HostState) -> Result<CallToolResult, McpError> {
    let mut stores = Vec::new();
    for name in state.db.store_names().await? {
        let entries = state.db.entry_count(&name).await?;
        stores.push(StoreSummary { name, entries });
    }

    let active = state.db.active_registration().await?;
    json_result(&CacheStoresOutput { stores, active })
}
