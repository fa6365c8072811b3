//! Offline-first caching engine.
//!
//! Every outbound request is classified by URL shape and handed to one of
//! three strategies:
//!
//! - **Assets** (`/static/...`): cache-first against the static store.
//! - **Navigable routes** (exact route-set paths): network-first, falling
//!   back to the dynamic store, then the cached site root, then a
//!   synthesized offline page.
//! - **Live data** (`/api/...`, `/update`): network-only, never cached,
//!   with a JSON error envelope when offline.
//!
//! Lifecycle events (install, activate) run independently of request flow;
//! their version tags decide which stores are valid. Cache writes run as
//! detached tasks so they never delay the response.

pub mod classify;
pub mod fallback;
pub mod lifecycle;
pub mod signals;
mod strategy;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use pwacache_core::{CacheDb, CachedEntry, EngineConfig, Error, Request, Response};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::fetch::Network;

pub use classify::{RequestClass, classify};
pub use lifecycle::{LifecycleState, LifecycleStatus};
pub use signals::{Notification, Notifier, PushPayload};

use lifecycle::Lifecycle;

/// Outcome of intercepting a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception {
    /// The engine produced the response.
    Handled(Response),
    /// The engine declined; the host should apply default network handling.
    Passthrough,
}

/// The host-facing surface of an offline worker.
#[async_trait]
pub trait OfflineWorker: Send + Sync {
    /// Pre-populate the static store with the asset manifest.
    async fn on_install(&self) -> Result<(), Error>;

    /// Purge condemned stores and take control of clients.
    async fn on_activate(&self) -> Result<(), Error>;

    /// Decide how to answer an outbound request.
    async fn intercept(&self, request: Request) -> Result<Interception, Error>;
}

/// Offline-first caching engine for one build version.
pub struct CacheEngine {
    config: EngineConfig,
    db: CacheDb,
    network: Arc<dyn Network>,
    notifier: Arc<dyn Notifier>,
    lifecycle: RwLock<Lifecycle>,
    pending_writes: Mutex<Vec<JoinHandle<()>>>,
    /// Set once a newer version took over; later writes are dropped.
    retired: AtomicBool,
}

impl CacheEngine {
    pub fn new(config: EngineConfig, db: CacheDb, network: Arc<dyn Network>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            db,
            network,
            notifier,
            lifecycle: RwLock::new(Lifecycle::default()),
            pending_writes: Mutex::new(Vec::new()),
            retired: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    /// Write a copy of `response` into `store` without waiting for it.
    ///
    /// Only 2xx responses are stored. Failures are logged and dropped, as is
    /// any write issued after the engine was superseded.
    fn store_copy(&self, store: &str, request: &Request, response: &Response) {
        if !response.is_ok() {
            tracing::debug!(url = %request.url, status = response.status, "not caching unsuccessful response");
            return;
        }

        // Checked under the lock so `retire` cannot slip between check and push.
        let mut pending = self.pending_writes.lock().unwrap_or_else(PoisonError::into_inner);
        if self.retired.load(Ordering::SeqCst) {
            tracing::debug!(%store, url = %request.url, "superseded, not caching");
            return;
        }

        let entry = CachedEntry::from_response(store, request, response);
        let db = self.db.clone();
        let handle = tokio::spawn(async move {
            let (store, url) = (entry.store.clone(), entry.url.clone());
            if let Err(e) = db.put_entry(entry).await {
                tracing::warn!(%store, %url, "dropped cache write: {}", e);
            }
        });

        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Stop issuing cache writes. Writes already spawned are unaffected.
    fn retire(&self) {
        let _pending = self.pending_writes.lock().unwrap_or_else(PoisonError::into_inner);
        self.retired.store(true, Ordering::SeqCst);
    }

    /// Wait for every cache write issued so far to complete.
    pub async fn settle_writes(&self) {
        let handles = {
            let mut pending = self.pending_writes.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *pending)
        };

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("cache write task failed: {}", e);
            }
        }
    }
}

#[async_trait]
impl OfflineWorker for CacheEngine {
    async fn on_install(&self) -> Result<(), Error> {
        self.install().await
    }

    async fn on_activate(&self) -> Result<(), Error> {
        self.activate().await.map(|_| ())
    }

    async fn intercept(&self, request: Request) -> Result<Interception, Error> {
        let class = classify(&self.config, &request);

        if class != RequestClass::Unhandled && !self.is_controlling().await {
            tracing::debug!(url = %request.url, "not controlling clients, passing through");
            return Ok(Interception::Passthrough);
        }

        tracing::debug!(url = %request.url, %class, "intercepted");

        let response = match class {
            RequestClass::Unhandled => return Ok(Interception::Passthrough),
            RequestClass::Asset => self.cache_first(request).await?,
            RequestClass::Navigable => self.network_first(request).await,
            RequestClass::Live => self.network_only(request).await,
        };

        Ok(Interception::Handled(response))
    }
}
