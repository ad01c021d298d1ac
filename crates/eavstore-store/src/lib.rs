//! EAV Store - SQLite persistence for schemas, items and values
//!
//! Provides:
//! - SQLite schema with migrations framework
//! - Connection configuration from TOML or environment
//! - Schema registry, item store and relationship loader

pub mod config;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use config::StoreConfig;
pub use errors::Result;
pub use repo::{ItemStore, RelationshipLoader, SchemaRegistry};
