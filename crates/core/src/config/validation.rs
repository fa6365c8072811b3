//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;
use url::Url;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

/// Parse an origin, accepting only absolute http(s) URLs.
pub(crate) fn parse_origin(origin: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(origin.trim()).map_err(|e| invalid("origin", e.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(invalid("origin", "must be an absolute http(s) URL")),
    }
}

fn validate_tag(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(invalid(field, "must not contain whitespace"));
    }
    Ok(())
}

fn validate_paths(field: &str, paths: &[String]) -> Result<(), ConfigError> {
    match paths.iter().find(|p| !p.starts_with('/')) {
        Some(bad) => Err(invalid(field, format!("path must start with '/': {bad}"))),
        None => Ok(()),
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not an absolute http(s) URL
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent`, `app_name`, `store_prefix` or a version tag is empty
    /// - a manifest, route or prefix path does not start with `/`
    ///
    /// Returns `ConfigError::Missing` if the asset manifest is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_origin(&self.origin)?;

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.app_name.trim().is_empty() {
            return Err(invalid("app_name", "must not be empty"));
        }

        validate_tag("store_prefix", &self.store_prefix)?;
        validate_tag("static_version", &self.static_version)?;
        validate_tag("dynamic_version", &self.dynamic_version)?;

        if self.asset_manifest.is_empty() {
            return Err(ConfigError::Missing {
                field: "asset_manifest".into(),
                hint: "list at least the site root '/'".into(),
            });
        }
        validate_paths("asset_manifest", &self.asset_manifest)?;
        validate_paths("route_set", &self.route_set)?;

        for (field, value) in [
            ("static_prefix", &self.static_prefix),
            ("api_prefix", &self.api_prefix),
            ("update_path", &self.update_path),
        ] {
            if !value.starts_with('/') {
                return Err(invalid(field, "must start with '/'"));
            }
        }

        if self.static_version != self.dynamic_version {
            tracing::debug!(
                static_version = %self.static_version,
                dynamic_version = %self.dynamic_version,
                "static and dynamic stores are versioned independently"
            );
        }

        Ok(())
    }
}
