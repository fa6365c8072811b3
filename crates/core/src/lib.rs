//! Core types and shared functionality for pwacache.
//!
//! This crate provides:
//! - Request/response model shared by the engine and its hosts
//! - Cache registry of named, versioned stores with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{CacheDb, CachedEntry, Registration, StoreRole};
pub use config::{AppConfig, ConfigError, EngineConfig};
pub use error::Error;
pub use http::{Request, Response, ResponseSource};
