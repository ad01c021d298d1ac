// Shared fixtures for engine integration tests

#![allow(dead_code)]

use eavstore_core::{Lookup, UnparsablePolicy};
use eavstore_engine::commands::item::{item_create, item_set_value, SetMode};
use eavstore_engine::commands::schema::{attribute_create, entity_create, link_by_slug};
use rusqlite::Connection;
use tempfile::TempDir;

/// File-backed database with foreign keys on and the schema migrated
pub fn setup_db() -> (TempDir, Connection) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let mut conn = Connection::open(&db_path).unwrap();
    conn.pragma_update(None, "foreign_keys", true).unwrap();
    eavstore_store::migrations::apply_migrations(&mut conn).unwrap();
    (temp_dir, conn)
}

/// Book entity with a required string Title and an optional date Released
pub fn seed_book(conn: &Connection) {
    entity_create(conn, "Book", "book").unwrap();
    attribute_create(conn, "Title", "title", "string").unwrap();
    attribute_create(conn, "Released", "released", "date").unwrap();
    link_by_slug(conn, "book", "title", true).unwrap();
    link_by_slug(conn, "book", "released", false).unwrap();
}

/// A Book item titled `title`; returns the item id
pub fn book_item(conn: &Connection, title: &str) -> i64 {
    let created = item_create(conn, &Lookup::Slug("book".into())).unwrap();
    item_set_value(
        conn,
        created.item.id,
        &Lookup::Slug("title".into()),
        title,
        SetMode::Add,
        UnparsablePolicy::Reject,
    )
    .unwrap();
    created.item.id
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}
