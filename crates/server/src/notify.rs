//! Notification queue handed to the engine as its `Notifier`.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use pwacache_client::{Notification, Notifier};

const MAX_QUEUED: usize = 64;

/// Holds shown notifications until the host collects them.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    queue: Mutex<VecDeque<Notification>>,
}

impl NotificationQueue {
    /// Take every queued notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.drain(..).collect()
    }
}

impl Notifier for NotificationQueue {
    fn show(&self, notification: Notification) {
        tracing::info!(title = %notification.title, "notification shown");
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        if queue.len() == MAX_QUEUED {
            queue.pop_front();
        }
        queue.push_back(notification);
    }
}
