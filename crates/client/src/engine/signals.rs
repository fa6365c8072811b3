//! Side channels: connectivity-restored sync and push notifications.

use pwacache_core::Error;
use serde::{Deserialize, Serialize};

use super::CacheEngine;

/// Push message body as delivered by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
}

/// Displays notifications on behalf of the engine.
pub trait Notifier: Send + Sync {
    fn show(&self, notification: Notification);
}

impl CacheEngine {
    /// Handle a connectivity-restored signal.
    ///
    /// When `tag` matches the configured sync tag the dynamic store is
    /// deleted so navigations re-fetch from the network. Returns whether
    /// the store was purged.
    pub async fn on_sync(&self, tag: &str) -> Result<bool, Error> {
        if tag != self.config.sync_tag {
            tracing::debug!(%tag, "ignoring sync with unknown tag");
            return Ok(false);
        }

        let store = self.config.dynamic_store_name();
        let existed = self.db.delete_store(&store).await?;
        tracing::info!(%store, existed, "connectivity restored, dynamic store purged");
        Ok(true)
    }

    /// Handle a push message. Malformed payloads are dropped.
    pub fn on_push(&self, payload: &[u8]) -> bool {
        let push: PushPayload = match serde_json::from_slice(payload) {
            Ok(push) => push,
            Err(e) => {
                tracing::warn!("dropping malformed push payload: {}", e);
                return false;
            }
        };

        self.notifier.show(Notification {
            title: push.title,
            body: push.body,
            icon: self.config.notification_icon.clone(),
            badge: self.config.notification_badge.clone(),
        });
        true
    }
}
