//! cache_get tool implementation.
//!
//! Reads one entry out of a named store without going through a strategy.

use pwacache_client::fetch::resolve;
use pwacache_core::{CachedEntry, Error, Request};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::state::HostState;
use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Store name, e.g. `htstatus-static-v1`.
    pub store: String,

    /// Absolute URL or a path relative to the dashboard origin.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub entry: CachedEntry,
    /// Stored body as UTF-8 (lossy).
    pub body: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(state: &HostState, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    if params.store.is_empty() {
        return Err(ToolError::InvalidInput("store cannot be empty".into()).into());
    }

    let origin = state.engine().await.config().origin.clone();
    let url = resolve(&origin, &params.url).map_err(ToolError::from)?;

    let entry = state
        .db
        .match_entry(&params.store, &Request::get(url))
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{} in {}", params.url, params.store)))?;

    let body = String::from_utf8_lossy(&entry.body).into_owned();
    json_result(&CacheGetOutput { entry, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::*;

    #[tokio::test]
    async fn test_get_installed_asset() {
        let (state, _) = started_state().await;
        let params = CacheGetParams { store: "pwacache-static-v1".into(), url: "/static/app.js".into() };

        let result = get_impl(&state, params).await.unwrap();
        let got: CacheGetOutput = output(&result);
        assert_eq!(got.body, "console.log(1)");
        assert_eq!(got.entry.status, 200);
        assert_eq!(got.entry.url, "http://dash.test/static/app.js");
    }

    #[tokio::test]
    async fn test_get_missing_entry() {
        let (state, _) = started_state().await;
        let params = CacheGetParams { store: "pwacache-static-v1".into(), url: "/static/nope.js".into() };

        let err = get_impl(&state, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_unknown_store_does_not_create_it() {
        let (state, _) = started_state().await;
        let params = CacheGetParams { store: "pwacache-static-v0".into(), url: "/".into() };

        assert!(get_impl(&state, params).await.is_err());
        assert!(!state.db.has_store("pwacache-static-v0").await.unwrap());
    }
}
