//! Client side of pwacache.
//!
//! This crate provides the HTTP network peer and the offline-first caching
//! engine that sits between a client and the origin.

pub mod engine;
pub mod fetch;

pub use engine::{
    CacheEngine, Interception, LifecycleState, LifecycleStatus, Notification, Notifier, OfflineWorker, PushPayload,
    RequestClass, classify,
};

pub use fetch::{FetchClient, FetchConfig, Network};
