//! SQLite-backed named cache stores.
//!
//! This module provides the persistent request→response stores behind
//! the strategy engine, using SQLite with async access via
//! tokio-rusqlite. It supports:
//!
//! - Multiple named stores in one database, created implicitly on first write
//! - Insertion-ordered keys and oldest-first trimming for bounded stores
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Versioned store naming for generation sweeps

pub mod connection;
pub mod migrations;
pub mod names;
pub mod store;
pub mod trim;

pub use crate::Error;

pub use connection::CacheDb;
pub use names::{GenerationNames, StoreKind};
