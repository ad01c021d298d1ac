//! Error handling for eavstore-store
//!
//! Wraps eavstore-core ExError with store-specific helpers

use eavstore_core::errors::{EavError, ExError, ExErrorKind};
use rusqlite::ffi;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Conflict)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Classify a rusqlite::Error
///
/// Unique, primary-key and foreign-key violations are `Conflict`; CHECK and
/// NOT NULL violations are `InvalidInput`; everything else is `Persistence`.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            match e.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE
                | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                | ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ExErrorKind::Conflict,
                ffi::SQLITE_CONSTRAINT_CHECK | ffi::SQLITE_CONSTRAINT_NOTNULL => {
                    ExErrorKind::InvalidInput
                }
                _ => ExErrorKind::Persistence,
            }
        }
        rusqlite::Error::QueryReturnedNoRows => ExErrorKind::NotFound,
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// `from_rusqlite` with the failing operation recorded
///
/// Meant for `map_err(in_op("create_entity"))`.
pub fn in_op(op: &'static str) -> impl Fn(rusqlite::Error) -> ExError {
    move |err| from_rusqlite(err).with_op(op)
}

/// Create a not-found error from a core lookup error, tagged with the op
pub fn not_found(op: &'static str, err: EavError) -> ExError {
    ExError::from(err).with_op(op)
}

/// Zero rows matched an update or delete keyed by entity id
pub fn entity_not_found(op: &'static str, entity_id: i64) -> ExError {
    not_found(
        op,
        EavError::EntityNotFound {
            selector: format!("id={}", entity_id),
        },
    )
    .with_entity_id(entity_id)
}

/// Zero rows matched an update or delete keyed by attribute id
pub fn attribute_not_found(op: &'static str, attribute_id: i64) -> ExError {
    not_found(
        op,
        EavError::AttributeNotFound {
            selector: format!("id={}", attribute_id),
        },
    )
    .with_attribute_id(attribute_id)
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
