use std::fmt;

/// Storage scalar for an item value column
///
/// Mirrors the five SQLite storage classes without depending on a driver.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl StoredValue {
    /// Build a scalar from raw TEXT bytes read off the driver
    ///
    /// Bytes that are not UTF-8 are kept as `Blob`; the string codec then
    /// reports them as a type mismatch instead of the read failing early.
    pub fn from_text_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => StoredValue::Text(text.to_string()),
            Err(_) => StoredValue::Blob(bytes.to_vec()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StoredValue::Null)
    }

    /// Storage class name, as SQLite's `typeof()` reports it
    pub fn storage_class(&self) -> &'static str {
        match self {
            StoredValue::Null => "null",
            StoredValue::Integer(_) => "integer",
            StoredValue::Real(_) => "real",
            StoredValue::Text(_) => "text",
            StoredValue::Blob(_) => "blob",
        }
    }
}

impl fmt::Display for StoredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredValue::Null => f.write_str("NULL"),
            StoredValue::Integer(v) => write!(f, "{}", v),
            StoredValue::Real(v) => write!(f, "{}", v),
            StoredValue::Text(v) => write!(f, "'{}'", v),
            StoredValue::Blob(v) => write!(f, "x'{}'", hex::encode(v)),
        }
    }
}
