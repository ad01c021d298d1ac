//! Repository layer over the EAV tables
//!
//! Every operation takes the caller's session. Single-statement operations
//! accept `&Connection`; multi-statement ones take `&Transaction` so the
//! caller owns atomicity.

pub mod hydration;
pub mod item_store;
pub mod schema_registry;
mod sql_value;

pub use hydration::RelationshipLoader;
pub use item_store::ItemStore;
pub use schema_registry::SchemaRegistry;
pub use sql_value::{stored_from_ref, SqlValue};
