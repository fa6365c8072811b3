//! Per-build engine configuration.

use url::Url;

use crate::cache::{StoreRole, store_name};

/// Everything the engine needs to know about the running build.
///
/// Injected at construction so tests can use small manifests and
/// arbitrary version tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Origin whose requests are intercepted.
    pub origin: Url,
    /// Shown in the title and heading of the offline page.
    pub app_name: String,
    pub store_prefix: String,
    pub static_store_version: String,
    pub dynamic_store_version: String,
    /// Paths that must be in the static store after install.
    pub asset_manifest: Vec<String>,
    /// Paths eligible for network-first handling.
    pub route_set: Vec<String>,
    pub static_prefix: String,
    pub api_prefix: String,
    pub update_path: String,
    pub sync_tag: String,
    pub notification_icon: String,
    pub notification_badge: String,
    pub skip_waiting: bool,
}

impl EngineConfig {
    /// Minimal configuration for `origin` with the standard prefixes and
    /// an empty manifest and route set.
    pub fn new(origin: Url, static_version: &str, dynamic_version: &str) -> Self {
        Self {
            origin,
            app_name: "pwacache".to_string(),
            store_prefix: "pwacache".to_string(),
            static_store_version: static_version.to_string(),
            dynamic_store_version: dynamic_version.to_string(),
            asset_manifest: Vec::new(),
            route_set: Vec::new(),
            static_prefix: "/static/".to_string(),
            api_prefix: "/api/".to_string(),
            update_path: "/update".to_string(),
            sync_tag: "background-sync".to_string(),
            notification_icon: "/static/ico.png".to_string(),
            notification_badge: "/static/soccer_ball.png".to_string(),
            skip_waiting: true,
        }
    }

    pub fn with_manifest<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.asset_manifest = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_routes<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route_set = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn static_store_name(&self) -> String {
        store_name(&self.store_prefix, StoreRole::Static, &self.static_store_version)
    }

    pub fn dynamic_store_name(&self) -> String {
        store_name(&self.store_prefix, StoreRole::Dynamic, &self.dynamic_store_version)
    }

    pub fn store_for(&self, role: StoreRole) -> String {
        match role {
            StoreRole::Static => self.static_store_name(),
            StoreRole::Dynamic => self.dynamic_store_name(),
        }
    }

    /// The two store names that survive activation.
    pub fn current_store_names(&self) -> [String; 2] {
        [self.static_store_name(), self.dynamic_store_name()]
    }

    /// Resolve a same-origin path against the origin.
    pub fn url_for(&self, path: &str) -> Option<Url> {
        self.origin.join(path).ok()
    }

    /// The site root, used as the generic navigation fallback.
    pub fn root_url(&self) -> Url {
        let mut root = self.origin.clone();
        root.set_path("/");
        root.set_query(None);
        root.set_fragment(None);
        root
    }

    /// Whether `url` belongs to the configured origin.
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::new(Url::parse("http://localhost:5000").unwrap(), "v3", "v4")
            .with_manifest(["/", "/static/app.js"])
            .with_routes(["/", "/team"])
    }

    #[test]
    fn test_store_names_embed_versions() {
        let c = config();
        assert_eq!(c.static_store_name(), "pwacache-static-v3");
        assert_eq!(c.dynamic_store_name(), "pwacache-dynamic-v4");
        assert_eq!(c.store_for(StoreRole::Dynamic), c.dynamic_store_name());
        assert_eq!(c.current_store_names(), ["pwacache-static-v3".to_string(), "pwacache-dynamic-v4".to_string()]);
    }

    #[test]
    fn test_url_for_and_root() {
        let c = config();
        assert_eq!(c.url_for("/static/app.js").unwrap().as_str(), "http://localhost:5000/static/app.js");
        assert_eq!(c.root_url().as_str(), "http://localhost:5000/");
    }

    #[test]
    fn test_same_origin() {
        let c = config();
        assert!(c.is_same_origin(&Url::parse("http://localhost:5000/team").unwrap()));
        assert!(!c.is_same_origin(&Url::parse("http://localhost:8080/team").unwrap()));
        assert!(!c.is_same_origin(&Url::parse("https://cdn.example.com/static/x.js").unwrap()));
    }
}
