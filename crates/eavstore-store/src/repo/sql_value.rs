//! Bridge between codec scalars and rusqlite values

use eavstore_core::StoredValue;
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};

/// Borrowing `ToSql` adapter for a [`StoredValue`]
pub struct SqlValue<'a>(pub &'a StoredValue);

impl ToSql for SqlValue<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self.0 {
            StoredValue::Null => ValueRef::Null,
            StoredValue::Integer(n) => ValueRef::Integer(*n),
            StoredValue::Real(n) => ValueRef::Real(*n),
            StoredValue::Text(t) => ValueRef::Text(t.as_bytes()),
            StoredValue::Blob(b) => ValueRef::Blob(b),
        };
        Ok(ToSqlOutput::Borrowed(value))
    }
}

/// Copy a column value out of a row
///
/// TEXT bytes are UTF-8 checked here; invalid text surfaces later as a codec
/// type mismatch.
pub fn stored_from_ref(value: ValueRef<'_>) -> StoredValue {
    match value {
        ValueRef::Null => StoredValue::Null,
        ValueRef::Integer(n) => StoredValue::Integer(n),
        ValueRef::Real(n) => StoredValue::Real(n),
        ValueRef::Text(bytes) => StoredValue::from_text_bytes(bytes),
        ValueRef::Blob(bytes) => StoredValue::Blob(bytes.to_vec()),
    }
}
