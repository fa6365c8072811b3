//! SQLite-backed registry of named, versioned response stores.
//!
//! This module provides persistent key→response stores using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Stores named `{prefix}-{role}-{version}`, created on first open
//! - Entries keyed by SHA-256 of method and absolute URL
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Whole-store deletion as the only eviction mechanism

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CachedEntry;
pub use stores::{Registration, StoreRole, store_name};
