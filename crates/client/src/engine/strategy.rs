//! The three fetch strategies.

use pwacache_core::{Error, Request, Response};

use super::CacheEngine;
use super::classify::RequestClass;
use super::fallback;

impl CacheEngine {
    /// Look up `request` in `store`, treating read failures as a miss.
    async fn lookup(&self, store: &str, request: &Request) -> Option<Response> {
        match self.db.match_entry(store, request).await {
            Ok(entry) => entry.map(|e| e.into_response()),
            Err(e) => {
                tracing::warn!(%store, url = %request.url, "store lookup failed: {}", e);
                None
            }
        }
    }

    async fn fetch_logged(&self, request: &Request) -> Result<Response, Error> {
        let result = self.network.fetch(request).await;
        if let Err(e) = &result {
            if e.is_network_failure() {
                tracing::debug!(url = %request.url, "network unavailable: {}", e);
            } else {
                tracing::warn!(url = %request.url, "fetch failed: {}", e);
            }
        }
        result
    }

    /// Cache-first: serve from the static store, fetch and populate on miss.
    ///
    /// Scripts and stylesheets fall back to empty bodies when offline; other
    /// asset types surface the network error.
    pub(crate) async fn cache_first(&self, request: Request) -> Result<Response, Error> {
        let store = self.config.static_store_name();

        if let Some(hit) = self.lookup(&store, &request).await {
            tracing::debug!(url = %request.url, "static cache hit");
            return Ok(hit);
        }

        match self.fetch_logged(&request).await {
            Ok(response) => {
                self.store_copy(&store, &request, &response);
                Ok(response)
            }
            Err(err) => fallback::synthesize(RequestClass::Asset, &request.url, &self.config.app_name).ok_or(err),
        }
    }

    /// Network-first: prefer a live fetch and refresh the dynamic store.
    ///
    /// On failure: exact dynamic entry, then the cached site root, then the
    /// offline page. Never fails.
    pub(crate) async fn network_first(&self, request: Request) -> Response {
        let store = self.config.dynamic_store_name();

        if let Ok(response) = self.fetch_logged(&request).await {
            self.store_copy(&store, &request, &response);
            return response;
        }

        if let Some(hit) = self.lookup(&store, &request).await {
            tracing::debug!(url = %request.url, "serving cached navigation");
            return hit;
        }

        let root = Request::get(self.config.root_url());
        if let Some(hit) = self.lookup(&store, &root).await {
            tracing::debug!(url = %request.url, "serving cached site root");
            return hit;
        }

        tracing::debug!(url = %request.url, "no cached navigation, serving offline page");
        fallback::offline_page(&self.config.app_name)
    }

    /// Network-only: never read or write a store.
    pub(crate) async fn network_only(&self, request: Request) -> Response {
        match self.fetch_logged(&request).await {
            Ok(response) => response,
            Err(_) => fallback::api_unavailable(),
        }
    }
}
