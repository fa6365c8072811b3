//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PWACACHE_*)
//! 2. TOML config file (if PWACACHE_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The asset manifest, route set and both version tags are baked into a
//! build; changing the manifest or routes means bumping the versions.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod engine;
mod validation;

pub use engine::EngineConfig;
pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PWACACHE_*)
/// 2. TOML config file (if PWACACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite store database.
    ///
    /// Set via PWACACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin of the dashboard whose requests are intercepted.
    ///
    /// Set via PWACACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// User-Agent string for network requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to accept per response.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Network timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Application name shown on the offline page.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Leading component of every store name.
    #[serde(default = "default_store_prefix")]
    pub store_prefix: String,

    /// Version tag of the static store.
    #[serde(default = "default_version")]
    pub static_version: String,

    /// Version tag of the dynamic store.
    #[serde(default = "default_version")]
    pub dynamic_version: String,

    /// Paths pre-cached into the static store at install.
    #[serde(default = "default_asset_manifest")]
    pub asset_manifest: Vec<String>,

    /// Paths served network-first with cache fallback.
    #[serde(default = "default_route_set")]
    pub route_set: Vec<String>,

    #[serde(default = "default_static_prefix")]
    pub static_prefix: String,

    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    #[serde(default = "default_update_path")]
    pub update_path: String,

    /// Connectivity-restored tag that clears the dynamic store.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    #[serde(default = "default_notification_icon")]
    pub notification_icon: String,

    #[serde(default = "default_notification_badge")]
    pub notification_badge: String,

    /// Activate immediately after a successful install.
    #[serde(default = "default_true")]
    pub skip_waiting: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./pwacache.sqlite")
}

fn default_origin() -> String {
    "http://127.0.0.1:5000".into()
}

fn default_user_agent() -> String {
    "pwacache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_app_name() -> String {
    "HTStatus".into()
}

fn default_store_prefix() -> String {
    "htstatus".into()
}

fn default_version() -> String {
    "v1".into()
}

fn default_asset_manifest() -> Vec<String> {
    [
        "/",
        "/static/Chart.bundle.js",
        "/static/jsuites.js",
        "/static/jsuites.css",
        "/static/ico.png",
        "/static/soccer_ball.png",
        "/static/background.jpg",
        "/static/plotly-latest.min.js",
        "/static/Sortable.js",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_route_set() -> Vec<String> {
    ["/", "/player", "/team", "/matches", "/training", "/settings"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_static_prefix() -> String {
    "/static/".into()
}

fn default_api_prefix() -> String {
    "/api/".into()
}

fn default_update_path() -> String {
    "/update".into()
}

fn default_sync_tag() -> String {
    "background-sync".into()
}

fn default_notification_icon() -> String {
    "/static/ico.png".into()
}

fn default_notification_badge() -> String {
    "/static/soccer_ball.png".into()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            app_name: default_app_name(),
            store_prefix: default_store_prefix(),
            static_version: default_version(),
            dynamic_version: default_version(),
            asset_manifest: default_asset_manifest(),
            route_set: default_route_set(),
            static_prefix: default_static_prefix(),
            api_prefix: default_api_prefix(),
            update_path: default_update_path(),
            sync_tag: default_sync_tag(),
            notification_icon: default_notification_icon(),
            notification_badge: default_notification_badge(),
            skip_waiting: true,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PWACACHE_`
    /// 2. TOML file from `PWACACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PWACACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PWACACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Build the engine configuration for the running build.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin is not an absolute
    /// http(s) URL.
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let origin = validation::parse_origin(&self.origin)?;
        Ok(EngineConfig {
            origin,
            app_name: self.app_name.clone(),
            store_prefix: self.store_prefix.clone(),
            static_store_version: self.static_version.clone(),
            dynamic_store_version: self.dynamic_version.clone(),
            asset_manifest: self.asset_manifest.clone(),
            route_set: self.route_set.clone(),
            static_prefix: self.static_prefix.clone(),
            api_prefix: self.api_prefix.clone(),
            update_path: self.update_path.clone(),
            sync_tag: self.sync_tag.clone(),
            notification_icon: self.notification_icon.clone(),
            notification_badge: self.notification_badge.clone(),
            skip_waiting: self.skip_waiting,
        })
    }
}
