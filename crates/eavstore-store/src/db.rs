//! Database connection management
//!
//! Provides utilities for opening and managing SQLite connections

use crate::config::StoreConfig;
use crate::errors::{from_rusqlite, Result};
use crate::migrations::apply_migrations;
use eavstore_core::errors::{ExError, ExErrorKind};
use rusqlite::Connection;
use std::path::Path;

const JOURNAL_MODES: [&str; 6] = ["DELETE", "TRUNCATE", "PERSIST", "MEMORY", "WAL", "OFF"];

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Apply connection PRAGMAs from the config
///
/// In-memory databases keep SQLite's default journal mode.
pub fn configure(conn: &Connection, config: &StoreConfig) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", config.foreign_keys)
        .map_err(from_rusqlite)?;

    if !config.is_in_memory() {
        let mode = config.journal_mode.to_ascii_uppercase();
        if !JOURNAL_MODES.contains(&mode.as_str()) {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("configure")
                .with_message(format!("unknown journal_mode '{}'", config.journal_mode)));
        }
        // journal_mode reports the resulting mode as a row
        let _: String = conn
            .query_row(&format!("PRAGMA journal_mode = {}", mode), [], |row| row.get(0))
            .map_err(from_rusqlite)?;
    }

    tracing::debug!(
        database = %config.database,
        foreign_keys = config.foreign_keys,
        "connection configured"
    );
    Ok(())
}

/// Open, configure and migrate a database as described by `config`
pub fn open_with(config: &StoreConfig) -> Result<Connection> {
    let mut conn = if config.is_in_memory() {
        open_in_memory()?
    } else {
        open(&config.database)?
    };
    configure(&conn, config)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

/// Whether `PRAGMA foreign_keys` is on for this connection
pub fn foreign_keys_enabled(conn: &Connection) -> Result<bool> {
    conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .map_err(from_rusqlite)
}
