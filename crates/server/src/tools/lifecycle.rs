//! lifecycle_status and lifecycle_update tool implementations.

use std::sync::Arc;

use pwacache_client::{LifecycleStatus, OfflineWorker};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::ToolError;
use crate::state::HostState;

/// Parameters for lifecycle_update.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LifecycleUpdateParams {
    /// Version tag of the new static store.
    pub static_version: String,

    /// Version tag of the new dynamic store (default: unchanged).
    #[serde(default)]
    pub dynamic_version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LifecycleUpdateOutput {
    pub previous: LifecycleStatus,
    pub current: LifecycleStatus,
    /// Stores deleted by the new version's activation.
    pub deleted_stores: Vec<String>,
}

fn check_version(field: &str, value: &str) -> Result<(), ToolError> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(ToolError::InvalidInput(format!("{field} must be non-empty without whitespace")));
    }
    Ok(())
}

/// Implementation of the lifecycle_status tool.
pub async fn status_impl(state: &HostState) -> Result<CallToolResult, McpError> {
    let status = state.engine().await.status().await;
    json_result(&status)
}

/// Implementation of the lifecycle_update tool.
///
/// Installs the new version next to the current one. Only once the install
/// succeeds is it swapped in; the old engine is then superseded and its
/// pending writes settled before activation deletes the old stores. A failed
/// install leaves the current version in control.
pub async fn update_impl(state: &HostState, params: LifecycleUpdateParams) -> Result<CallToolResult, McpError> {
    check_version("static_version", &params.static_version)?;
    if let Some(dynamic) = &params.dynamic_version {
        check_version("dynamic_version", dynamic)?;
    }

    let current = state.engine().await;
    let mut engine_config = current.config().clone();
    engine_config.static_store_version = params.static_version;
    if let Some(dynamic) = params.dynamic_version {
        engine_config.dynamic_store_version = dynamic;
    }

    if engine_config.current_store_names() == current.config().current_store_names() {
        return Err(ToolError::InvalidInput(format!(
            "version {} is already installed",
            engine_config.static_store_name()
        ))
        .into());
    }

    let next = Arc::new(state.build_engine(engine_config));
    next.on_install().await?;

    let previous = state.replace_engine(next.clone()).await;
    let deleted_stores = next.take_over(&previous).await?;

    let output = LifecycleUpdateOutput {
        previous: previous.status().await,
        current: next.status().await,
        deleted_stores,
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::*;
    use crate::tools::{DashboardFetchParams, fetch_impl};
    use serde_json::Value;

    fn update(static_version: &str) -> LifecycleUpdateParams {
        LifecycleUpdateParams { static_version: static_version.into(), dynamic_version: None }
    }

    #[tokio::test]
    async fn test_status_reports_active_version() {
        let (state, _) = started_state().await;

        let status: Value = output(&status_impl(&state).await.unwrap());
        assert_eq!(status["state"], "active");
        assert_eq!(status["controlling"], true);
        assert_eq!(status["static_store"], "pwacache-static-v1");
    }

    #[tokio::test]
    async fn test_update_switches_static_version() {
        let (state, _) = started_state().await;

        let result: Value = output(&update_impl(&state, update("v2")).await.unwrap());
        assert_eq!(result["previous"]["state"], "superseded");
        assert_eq!(result["current"]["state"], "active");
        assert_eq!(result["current"]["static_store"], "pwacache-static-v2");
        assert_eq!(result["current"]["dynamic_store"], "pwacache-dynamic-v1");
        assert_eq!(result["deleted_stores"], serde_json::json!(["pwacache-static-v1"]));

        let names = state.db.store_names().await.unwrap();
        assert_eq!(names, vec!["pwacache-static-v2".to_string()]);
        assert!(state.engine().await.is_controlling().await);
    }

    #[tokio::test]
    async fn test_update_after_navigation_leaves_no_old_stores() {
        let (state, origin) = started_state().await;
        origin.page("/team", 200, "<p>team</p>");

        let fetch = DashboardFetchParams { url: "/team".into(), method: None, accept: None };
        fetch_impl(&state, fetch).await.unwrap();

        let params = LifecycleUpdateParams { static_version: "v2".into(), dynamic_version: Some("v2".into()) };
        let result: Value = output(&update_impl(&state, params).await.unwrap());
        let mut deleted: Vec<String> = serde_json::from_value(result["deleted_stores"].clone()).unwrap();
        deleted.sort();
        assert_eq!(deleted, vec!["pwacache-dynamic-v1".to_string(), "pwacache-static-v1".to_string()]);

        assert_eq!(state.db.store_names().await.unwrap(), vec!["pwacache-static-v2".to_string()]);
        assert_eq!(result["previous"]["controlling"], false);
    }

    #[tokio::test]
    async fn test_update_failure_keeps_current_version() {
        let (state, origin) = started_state().await;
        origin.set_online(false);

        assert!(update_impl(&state, update("v2")).await.is_err());

        let engine = state.engine().await;
        assert_eq!(engine.config().static_store_name(), "pwacache-static-v1");
        assert!(engine.is_controlling().await);
        assert!(state.db.has_store("pwacache-static-v1").await.unwrap());
        assert!(!state.db.has_store("pwacache-static-v2").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_rejects_same_version() {
        let (state, _) = started_state().await;
        let err = update_impl(&state, update("v1")).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_version() {
        let (state, _) = started_state().await;
        assert!(update_impl(&state, update("")).await.is_err());
        assert!(
            update_impl(&state, LifecycleUpdateParams { static_version: "v3".into(), dynamic_version: Some("v 3".into()) })
                .await
                .is_err()
        );
    }
}
