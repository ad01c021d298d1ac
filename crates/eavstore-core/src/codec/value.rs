use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::temporal;
use crate::model::AttributeType;

/// Native runtime value, one variant per attribute type tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    String(String),
    Int(i64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint(u64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Byte(u8),
    Rune(char),
    Float32(f32),
    Float64(f64),
    Blob(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Datetime(NaiveDateTime),
}

impl Value {
    /// The tag whose codec produced (or accepts) this variant
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Value::Bool(_) => AttributeType::Bool,
            Value::String(_) => AttributeType::String,
            Value::Int(_) => AttributeType::Int,
            Value::Int8(_) => AttributeType::Int8,
            Value::Int16(_) => AttributeType::Int16,
            Value::Int32(_) => AttributeType::Int32,
            Value::Int64(_) => AttributeType::Int64,
            Value::Uint(_) => AttributeType::Uint,
            Value::Uint8(_) => AttributeType::Uint8,
            Value::Uint16(_) => AttributeType::Uint16,
            Value::Uint32(_) => AttributeType::Uint32,
            Value::Uint64(_) => AttributeType::Uint64,
            Value::Byte(_) => AttributeType::Byte,
            Value::Rune(_) => AttributeType::Rune,
            Value::Float32(_) => AttributeType::Float32,
            Value::Float64(_) => AttributeType::Float64,
            Value::Blob(_) => AttributeType::Blob,
            Value::Date(_) => AttributeType::Date,
            Value::Time(_) => AttributeType::Time,
            Value::Datetime(_) => AttributeType::Datetime,
        }
    }
}

/// Text rendering for views; temporal values use the canonical layouts and
/// blobs render as lowercase hex
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
            Value::Int(v) | Value::Int64(v) => write!(f, "{}", v),
            Value::Int8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Uint(v) | Value::Uint64(v) => write!(f, "{}", v),
            Value::Uint8(v) | Value::Byte(v) => write!(f, "{}", v),
            Value::Uint16(v) => write!(f, "{}", v),
            Value::Uint32(v) => write!(f, "{}", v),
            Value::Rune(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Blob(v) => f.write_str(&hex::encode(v)),
            Value::Date(v) => write!(f, "{}", v.format(temporal::DATE_LAYOUT)),
            Value::Time(v) => write!(f, "{}", v.format(temporal::TIME_LAYOUT)),
            Value::Datetime(v) => write!(f, "{}", v.format(temporal::DATETIME_LAYOUT)),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
