//! Request classification by URL shape.

use std::fmt;

use pwacache_core::{EngineConfig, Request};

/// Strategy class assigned to an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Build asset under the static prefix: cache-first.
    Asset,
    /// Exact member of the route set: network-first with cache fallback.
    Navigable,
    /// API or update trigger: network-only.
    Live,
    /// Not intercepted; default network handling applies.
    Unhandled,
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestClass::Asset => "asset",
            RequestClass::Navigable => "navigable",
            RequestClass::Live => "live",
            RequestClass::Unhandled => "unhandled",
        })
    }
}

/// Classify a request.
///
/// Only same-origin `GET` requests are ever classified; `/static/` paths on
/// another host (CDN copies) get the host's default handling. Checks run
/// in order: static prefix, route set (exact path, query ignored), then
/// the API prefix or update-trigger path.
pub fn classify(config: &EngineConfig, request: &Request) -> RequestClass {
    if !request.is_get() || !config.is_same_origin(&request.url) {
        return RequestClass::Unhandled;
    }

    let path = request.url.path();

    if path.starts_with(&config.static_prefix) {
        RequestClass::Asset
    } else if config.route_set.iter().any(|route| route == path) {
        RequestClass::Navigable
    } else if path.starts_with(&config.api_prefix) || path.starts_with(&config.update_path) {
        RequestClass::Live
    } else {
        RequestClass::Unhandled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn config() -> EngineConfig {
        EngineConfig::new(Url::parse("http://app.test").unwrap(), "v1", "v1").with_routes(["/", "/team", "/player"])
    }

    fn classify_path(method: &str, path: &str) -> RequestClass {
        let url = Url::parse("http://app.test").unwrap().join(path).unwrap();
        classify(&config(), &Request::new(method, url))
    }

    #[test]
    fn test_static_prefix_is_asset() {
        assert_eq!(classify_path("GET", "/static/Chart.bundle.js"), RequestClass::Asset);
        assert_eq!(classify_path("GET", "/static/img/ball.png"), RequestClass::Asset);
    }

    #[test]
    fn test_route_set_exact_match() {
        assert_eq!(classify_path("GET", "/"), RequestClass::Navigable);
        assert_eq!(classify_path("GET", "/team"), RequestClass::Navigable);
        assert_eq!(classify_path("GET", "/team?id=7"), RequestClass::Navigable);
        assert_eq!(classify_path("GET", "/team/7"), RequestClass::Unhandled);
        assert_eq!(classify_path("GET", "/teams"), RequestClass::Unhandled);
    }

    #[test]
    fn test_api_and_update_are_live() {
        assert_eq!(classify_path("GET", "/api/players"), RequestClass::Live);
        assert_eq!(classify_path("GET", "/update"), RequestClass::Live);
        assert_eq!(classify_path("GET", "/update?force=1"), RequestClass::Live);
    }

    #[test]
    fn test_other_paths_unhandled() {
        assert_eq!(classify_path("GET", "/login"), RequestClass::Unhandled);
        assert_eq!(classify_path("GET", "/apidocs"), RequestClass::Unhandled);
    }

    #[test]
    fn test_non_get_unhandled() {
        assert_eq!(classify_path("POST", "/api/players"), RequestClass::Unhandled);
        assert_eq!(classify_path("PUT", "/static/app.js"), RequestClass::Unhandled);
        assert_eq!(classify_path("HEAD", "/team"), RequestClass::Unhandled);
    }

    #[test]
    fn test_cross_origin_unhandled() {
        let url = Url::parse("https://cdn.example.com/static/jquery.js").unwrap();
        assert_eq!(classify(&config(), &Request::get(url)), RequestClass::Unhandled);
    }
}
