//! Shared host state: the registry, the network peer and the engine
//! currently in control.

use std::sync::Arc;

use pwacache_client::{CacheEngine, Network};
use pwacache_core::{AppConfig, CacheDb, EngineConfig, Error};
use tokio::sync::RwLock;

use crate::notify::NotificationQueue;

pub struct HostState {
    pub db: CacheDb,
    pub network: Arc<dyn Network>,
    pub notifications: Arc<NotificationQueue>,
    engine: RwLock<Arc<CacheEngine>>,
}

impl HostState {
    /// Build host state with an engine for the configured build version.
    pub fn new(
        config: &AppConfig, db: CacheDb, network: Arc<dyn Network>, notifications: Arc<NotificationQueue>,
    ) -> Result<Self, Error> {
        let engine_config = config.engine_config().map_err(|e| Error::InvalidInput(e.to_string()))?;
        let engine = CacheEngine::new(engine_config, db.clone(), network.clone(), notifications.clone());

        Ok(Self { db, network, notifications, engine: RwLock::new(Arc::new(engine)) })
    }

    /// The engine currently in control.
    pub async fn engine(&self) -> Arc<CacheEngine> {
        self.engine.read().await.clone()
    }

    /// Build an engine for another version of the same build.
    pub fn build_engine(&self, engine_config: EngineConfig) -> CacheEngine {
        CacheEngine::new(engine_config, self.db.clone(), self.network.clone(), self.notifications.clone())
    }

    /// Put `engine` in control, returning the one it replaced.
    pub async fn replace_engine(&self, engine: Arc<CacheEngine>) -> Arc<CacheEngine> {
        let mut current = self.engine.write().await;
        std::mem::replace(&mut *current, engine)
    }
}
