//! Core types and shared functionality for haven.
//!
//! This crate provides:
//! - Named cache stores with a SQLite backend
//! - The request/response model shared by strategies and the router
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod request;
pub mod response;

pub use cache::{CacheDb, GenerationNames, StoreKind};
pub use config::AppConfig;
pub use error::Error;
pub use request::CacheRequest;
pub use response::{CachedResponse, ResponseKind};
