use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::EavError;

/// Closed vocabulary of attribute value types
///
/// The serialized form (`"bool"`, `"int8"`, `"datetime"`, ...) is what the
/// `attributes.type` column stores and what aggregate payloads carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Byte,
    Rune,
    Float32,
    Float64,
    Blob,
    Date,
    Time,
    Datetime,
}

impl AttributeType {
    /// Every tag, in declaration order (`ALL[t.index()] == t`)
    pub const ALL: [AttributeType; 20] = [
        AttributeType::Bool,
        AttributeType::String,
        AttributeType::Int,
        AttributeType::Int8,
        AttributeType::Int16,
        AttributeType::Int32,
        AttributeType::Int64,
        AttributeType::Uint,
        AttributeType::Uint8,
        AttributeType::Uint16,
        AttributeType::Uint32,
        AttributeType::Uint64,
        AttributeType::Byte,
        AttributeType::Rune,
        AttributeType::Float32,
        AttributeType::Float64,
        AttributeType::Blob,
        AttributeType::Date,
        AttributeType::Time,
        AttributeType::Datetime,
    ];

    /// Position of this tag in [`AttributeType::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttributeType::Bool => "bool",
            AttributeType::String => "string",
            AttributeType::Int => "int",
            AttributeType::Int8 => "int8",
            AttributeType::Int16 => "int16",
            AttributeType::Int32 => "int32",
            AttributeType::Int64 => "int64",
            AttributeType::Uint => "uint",
            AttributeType::Uint8 => "uint8",
            AttributeType::Uint16 => "uint16",
            AttributeType::Uint32 => "uint32",
            AttributeType::Uint64 => "uint64",
            AttributeType::Byte => "byte",
            AttributeType::Rune => "rune",
            AttributeType::Float32 => "float32",
            AttributeType::Float64 => "float64",
            AttributeType::Blob => "blob",
            AttributeType::Date => "date",
            AttributeType::Time => "time",
            AttributeType::Datetime => "datetime",
        }
    }

    /// True when `tag` names a member of the vocabulary
    pub fn is_valid(tag: &str) -> bool {
        tag.parse::<AttributeType>().is_ok()
    }
}

impl FromStr for AttributeType {
    type Err = EavError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        AttributeType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| EavError::InvalidAttributeType {
                tag: tag.to_string(),
            })
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
