// Shared fixtures for store integration tests

#![allow(dead_code)]

use eavstore_core::{Attribute, AttributeType, Entity};
use eavstore_store::repo::SchemaRegistry;
use rusqlite::Connection;

/// In-memory database with foreign keys on and the schema migrated
pub fn setup_test_db() -> Connection {
    setup_with_foreign_keys(true)
}

pub fn setup_with_foreign_keys(enabled: bool) -> Connection {
    let mut conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    conn.pragma_update(None, "foreign_keys", enabled)
        .expect("Failed to set foreign_keys");
    eavstore_store::migrations::apply_migrations(&mut conn).expect("Failed to migrate");
    conn
}

pub fn entity(conn: &Connection, name: &str, slug: &str) -> Entity {
    SchemaRegistry::create_entity(conn, name, slug).expect("Failed to create entity")
}

pub fn attribute(conn: &Connection, name: &str, slug: &str, ty: AttributeType) -> Attribute {
    SchemaRegistry::create_attribute(conn, name, slug, ty).expect("Failed to create attribute")
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .expect("Failed to count rows")
}
