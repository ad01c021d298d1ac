//! Command orchestration layer.
//!
//! Each command resolves caller selectors, drives the store, and emits the
//! op boundary events. Commands never open transactions; the ones that must
//! be atomic take a `Transaction` from the caller.

pub mod engine_command;
pub mod item;
pub mod schema;

use eavstore_core::{Attribute, Entity, ExError, Hydration, Lookup};
use eavstore_store::errors::Result;
use eavstore_store::repo::SchemaRegistry;
use rusqlite::Connection;

/// Parse a CLI-style selector: digits are an id, anything else a slug
pub(crate) fn parse_lookup(op: &'static str, selector: &str) -> Result<Lookup> {
    Lookup::parse(selector).map_err(|e| ExError::from(e).with_op(op))
}

/// Resolve an entity with its attributes hydrated
pub(crate) fn resolve_entity(conn: &Connection, lookup: &Lookup) -> Result<Entity> {
    SchemaRegistry::get_entity(conn, lookup, Hydration::Eager)
}

pub(crate) fn resolve_attribute(conn: &Connection, lookup: &Lookup) -> Result<Attribute> {
    SchemaRegistry::get_attribute(conn, lookup, Hydration::Lazy)
}
