//! Value codec
//!
//! Converts between caller text, native [`Value`]s and [`StoredValue`]
//! scalars for every attribute type tag. All per-tag behaviour lives in the
//! [`CODECS`] table, indexed by [`AttributeType::index`].
//!
//! Storage mapping:
//!
//! | tag | stored as |
//! |-----|-----------|
//! | bool, int*, uint8..uint32, byte | INTEGER |
//! | uint, uint64 | INTEGER, or decimal TEXT above `i64::MAX` |
//! | rune | INTEGER code point |
//! | float32, float64 | REAL |
//! | string, date, time, datetime | TEXT |
//! | blob | BLOB |

pub mod stored;
pub mod temporal;
pub mod value;

pub use stored::StoredValue;
pub use value::Value;

use serde::Deserialize;

use crate::errors::{EavError, Result};
use crate::model::AttributeType;

/// What to do when caller text does not parse as the attribute's type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnparsablePolicy {
    /// Store a missing value and log a warning
    #[default]
    StoreMissing,
    /// Fail with `InvalidValue`
    Reject,
}

type DecodeResult<T = Value> = std::result::Result<T, String>;

/// Per-tag conversion rules
pub struct Codec {
    pub tag: AttributeType,
    parse: fn(&str) -> Option<Value>,
    encode: fn(&Value) -> Option<StoredValue>,
    decode: fn(&StoredValue) -> DecodeResult,
}

/// Codec table in [`AttributeType::ALL`] order
pub static CODECS: [Codec; 20] = [
    Codec {
        tag: AttributeType::Bool,
        parse: |s| parse_bool(s).map(Value::Bool),
        encode: |v| match v {
            Value::Bool(b) => Some(StoredValue::Integer(i64::from(*b))),
            _ => None,
        },
        decode: |s| match s {
            StoredValue::Integer(0) => Ok(Value::Bool(false)),
            StoredValue::Integer(1) => Ok(Value::Bool(true)),
            other => Err(format!("expected 0 or 1, found {}", other)),
        },
    },
    Codec {
        tag: AttributeType::String,
        parse: |s| Some(Value::String(s.to_string())),
        encode: |v| match v {
            Value::String(s) => Some(StoredValue::Text(s.clone())),
            _ => None,
        },
        decode: |s| match s {
            StoredValue::Text(t) => Ok(Value::String(t.clone())),
            StoredValue::Blob(b) => String::from_utf8(b.clone())
                .map(Value::String)
                .map_err(|_| "text is not valid UTF-8".to_string()),
            other => Err(format!("expected text, found {}", other.storage_class())),
        },
    },
    Codec {
        tag: AttributeType::Int,
        parse: |s| s.parse().ok().map(Value::Int),
        encode: |v| match v {
            Value::Int(n) => Some(StoredValue::Integer(*n)),
            _ => None,
        },
        decode: |s| integer(s).map(Value::Int),
    },
    Codec {
        tag: AttributeType::Int8,
        parse: |s| s.parse().ok().map(Value::Int8),
        encode: |v| match v {
            Value::Int8(n) => Some(StoredValue::Integer(i64::from(*n))),
            _ => None,
        },
        decode: |s| narrow(s).map(Value::Int8),
    },
    Codec {
        tag: AttributeType::Int16,
        parse: |s| s.parse().ok().map(Value::Int16),
        encode: |v| match v {
            Value::Int16(n) => Some(StoredValue::Integer(i64::from(*n))),
            _ => None,
        },
        decode: |s| narrow(s).map(Value::Int16),
    },
    Codec {
        tag: AttributeType::Int32,
        parse: |s| s.parse().ok().map(Value::Int32),
        encode: |v| match v {
            Value::Int32(n) => Some(StoredValue::Integer(i64::from(*n))),
            _ => None,
        },
        decode: |s| narrow(s).map(Value::Int32),
    },
    Codec {
        tag: AttributeType::Int64,
        parse: |s| s.parse().ok().map(Value::Int64),
        encode: |v| match v {
            Value::Int64(n) => Some(StoredValue::Integer(*n)),
            _ => None,
        },
        decode: |s| integer(s).map(Value::Int64),
    },
    Codec {
        tag: AttributeType::Uint,
        parse: |s| s.parse().ok().map(Value::Uint),
        encode: |v| match v {
            Value::Uint(n) => Some(encode_u64(*n)),
            _ => None,
        },
        decode: |s| decode_u64(s).map(Value::Uint),
    },
    Codec {
        tag: AttributeType::Uint8,
        parse: |s| s.parse().ok().map(Value::Uint8),
        encode: |v| match v {
            Value::Uint8(n) => Some(StoredValue::Integer(i64::from(*n))),
            _ => None,
        },
        decode: |s| narrow(s).map(Value::Uint8),
    },
    Codec {
        tag: AttributeType::Uint16,
        parse: |s| s.parse().ok().map(Value::Uint16),
        encode: |v| match v {
            Value::Uint16(n) => Some(StoredValue::Integer(i64::from(*n))),
            _ => None,
        },
        decode: |s| narrow(s).map(Value::Uint16),
    },
    Codec {
        tag: AttributeType::Uint32,
        parse: |s| s.parse().ok().map(Value::Uint32),
        encode: |v| match v {
            Value::Uint32(n) => Some(StoredValue::Integer(i64::from(*n))),
            _ => None,
        },
        decode: |s| narrow(s).map(Value::Uint32),
    },
    Codec {
        tag: AttributeType::Uint64,
        parse: |s| s.parse().ok().map(Value::Uint64),
        encode: |v| match v {
            Value::Uint64(n) => Some(encode_u64(*n)),
            _ => None,
        },
        decode: |s| decode_u64(s).map(Value::Uint64),
    },
    Codec {
        tag: AttributeType::Byte,
        parse: |s| s.bytes().next().map(Value::Byte),
        encode: |v| match v {
            Value::Byte(n) => Some(StoredValue::Integer(i64::from(*n))),
            _ => None,
        },
        decode: |s| narrow(s).map(Value::Byte),
    },
    Codec {
        tag: AttributeType::Rune,
        parse: |s| s.chars().next().map(Value::Rune),
        encode: |v| match v {
            Value::Rune(c) => Some(StoredValue::Integer(i64::from(u32::from(*c)))),
            _ => None,
        },
        decode: |s| match s {
            StoredValue::Integer(n) => u32::try_from(*n)
                .ok()
                .and_then(char::from_u32)
                .map(Value::Rune)
                .ok_or_else(|| format!("{} is not a Unicode scalar value", n)),
            StoredValue::Text(t) => {
                let mut chars = t.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Rune(c)),
                    _ => Err(format!("'{}' is not a single character", t)),
                }
            }
            other => Err(format!("expected integer, found {}", other.storage_class())),
        },
    },
    Codec {
        tag: AttributeType::Float32,
        parse: |s| parse_float(s).map(Value::Float32),
        encode: |v| match v {
            Value::Float32(n) if !n.is_nan() => Some(StoredValue::Real(f64::from(*n))),
            _ => None,
        },
        decode: |s| {
            real(s).and_then(|n| {
                let narrowed = n as f32;
                if n.is_finite() && narrowed.is_infinite() {
                    Err(format!("{} is out of range for float32", n))
                } else {
                    Ok(Value::Float32(narrowed))
                }
            })
        },
    },
    Codec {
        tag: AttributeType::Float64,
        parse: |s| parse_float(s).map(Value::Float64),
        encode: |v| match v {
            Value::Float64(n) if !n.is_nan() => Some(StoredValue::Real(*n)),
            _ => None,
        },
        decode: |s| real(s).map(Value::Float64),
    },
    Codec {
        tag: AttributeType::Blob,
        parse: |s| Some(Value::Blob(s.as_bytes().to_vec())),
        encode: |v| match v {
            Value::Blob(b) => Some(StoredValue::Blob(b.clone())),
            _ => None,
        },
        decode: |s| match s {
            StoredValue::Blob(b) => Ok(Value::Blob(b.clone())),
            StoredValue::Text(t) => Ok(Value::Blob(t.as_bytes().to_vec())),
            other => Err(format!("expected blob, found {}", other.storage_class())),
        },
    },
    Codec {
        tag: AttributeType::Date,
        parse: |s| temporal::parse_date(s).map(Value::Date),
        encode: |v| match v {
            Value::Date(d) => Some(StoredValue::Text(temporal::format_date(d))),
            _ => None,
        },
        decode: |s| {
            text(s).and_then(|t| {
                temporal::read_date(t)
                    .map(Value::Date)
                    .ok_or_else(|| bad_layout(t))
            })
        },
    },
    Codec {
        tag: AttributeType::Time,
        parse: |s| temporal::parse_time(s).map(Value::Time),
        encode: |v| match v {
            Value::Time(t) => Some(StoredValue::Text(temporal::format_time(t))),
            _ => None,
        },
        decode: |s| {
            text(s).and_then(|t| {
                temporal::read_time(t)
                    .map(Value::Time)
                    .ok_or_else(|| bad_layout(t))
            })
        },
    },
    Codec {
        tag: AttributeType::Datetime,
        parse: |s| temporal::parse_datetime(s).map(Value::Datetime),
        encode: |v| match v {
            Value::Datetime(dt) => Some(StoredValue::Text(temporal::format_datetime(dt))),
            _ => None,
        },
        decode: |s| {
            text(s).and_then(|t| {
                temporal::read_datetime(t)
                    .map(Value::Datetime)
                    .ok_or_else(|| bad_layout(t))
            })
        },
    },
];

/// Codec entry for `tag`
pub fn codec(tag: AttributeType) -> &'static Codec {
    &CODECS[tag.index()]
}

/// Parse caller-supplied text into a value of type `tag`
///
/// Byte and rune keep only the first byte or character; empty input gives
/// a missing value for them.
///
/// # Errors
///
/// Under [`UnparsablePolicy::Reject`], returns `InvalidValue` when `text`
/// does not parse. Under `StoreMissing` the result is `Ok(None)`.
pub fn parse_input(
    tag: AttributeType,
    text: &str,
    policy: UnparsablePolicy,
) -> Result<Option<Value>> {
    if let Some(value) = (codec(tag).parse)(text) {
        return Ok(Some(value));
    }
    match (tag, policy) {
        (AttributeType::Byte | AttributeType::Rune, _) if text.is_empty() => Ok(None),
        (_, UnparsablePolicy::StoreMissing) => {
            tracing::warn!(
                attribute_type = tag.as_str(),
                input = text,
                "unparsable input stored as missing value"
            );
            Ok(None)
        }
        (_, UnparsablePolicy::Reject) => Err(EavError::InvalidValue {
            attribute_type: tag.to_string(),
            input: text.to_string(),
        }),
    }
}

/// Encode a value for storage under `tag`
///
/// # Errors
///
/// Returns `TypeMismatch` when the value's variant does not belong to `tag`,
/// or for a NaN float.
pub fn encode(tag: AttributeType, value: Option<&Value>) -> Result<StoredValue> {
    let Some(value) = value else {
        return Ok(StoredValue::Null);
    };
    (codec(tag).encode)(value).ok_or_else(|| EavError::TypeMismatch {
        attribute_type: tag.to_string(),
        reason: match value {
            Value::Float32(n) if n.is_nan() => "NaN cannot be stored".to_string(),
            Value::Float64(n) if n.is_nan() => "NaN cannot be stored".to_string(),
            _ => format!("cannot store a {} value", value.attribute_type()),
        },
    })
}

/// Decode a stored scalar under `tag`; NULL decodes to `None`
///
/// # Errors
///
/// Returns `TypeMismatch` when the scalar's storage class or range does not
/// fit the tag.
pub fn decode(tag: AttributeType, stored: &StoredValue) -> Result<Option<Value>> {
    if stored.is_null() {
        return Ok(None);
    }
    (codec(tag).decode)(stored)
        .map(Some)
        .map_err(|reason| EavError::TypeMismatch {
            attribute_type: tag.to_string(),
            reason,
        })
}

/// Decode under a tag read back from storage as text
///
/// An unknown tag yields `Ok(None)` and a warning rather than an error.
///
/// # Errors
///
/// Same as [`decode`] for known tags.
pub fn decode_tagged(tag: &str, stored: &StoredValue) -> Result<Option<Value>> {
    match tag.parse::<AttributeType>() {
        Ok(tag) => decode(tag, stored),
        Err(_) => {
            tracing::warn!(attribute_type = tag, "unknown attribute type, value skipped");
            Ok(None)
        }
    }
}

/// Go-style boolean literals
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Float literal of the target width
///
/// NaN is refused since SQLite stores it as NULL. A finite literal that
/// overflows the width is refused; only a spelled-out infinity gives one.
fn parse_float<F>(s: &str) -> Option<F>
where
    F: std::str::FromStr + Into<f64> + Copy,
{
    let parsed: F = s.parse().ok()?;
    let wide: f64 = parsed.into();
    if wide.is_nan() {
        return None;
    }
    if wide.is_infinite() {
        let unsigned = s.trim_start_matches(['+', '-']).to_ascii_lowercase();
        if unsigned != "inf" && unsigned != "infinity" {
            return None;
        }
    }
    Some(parsed)
}

fn integer(stored: &StoredValue) -> DecodeResult<i64> {
    match stored {
        StoredValue::Integer(n) => Ok(*n),
        other => Err(format!("expected integer, found {}", other.storage_class())),
    }
}

fn narrow<T: TryFrom<i64>>(stored: &StoredValue) -> DecodeResult<T> {
    let n = integer(stored)?;
    T::try_from(n).map_err(|_| format!("{} is out of range", n))
}

fn encode_u64(n: u64) -> StoredValue {
    match i64::try_from(n) {
        Ok(fits) => StoredValue::Integer(fits),
        Err(_) => StoredValue::Text(n.to_string()),
    }
}

fn decode_u64(stored: &StoredValue) -> DecodeResult<u64> {
    match stored {
        StoredValue::Integer(n) => u64::try_from(*n).map_err(|_| format!("{} is negative", n)),
        StoredValue::Text(t) => t
            .parse()
            .map_err(|_| format!("'{}' is not an unsigned integer", t)),
        other => Err(format!("expected integer, found {}", other.storage_class())),
    }
}

fn real(stored: &StoredValue) -> DecodeResult<f64> {
    match stored {
        StoredValue::Real(n) => Ok(*n),
        StoredValue::Integer(n) => Ok(*n as f64),
        other => Err(format!("expected real, found {}", other.storage_class())),
    }
}

fn text(stored: &StoredValue) -> DecodeResult<&str> {
    match stored {
        StoredValue::Text(t) => Ok(t),
        other => Err(format!("expected text, found {}", other.storage_class())),
    }
}

fn bad_layout(text: &str) -> String {
    format!("'{}' does not match the expected layout", text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_table_order_matches_tags() {
        for tag in AttributeType::ALL {
            assert_eq!(codec(tag).tag, tag, "codec table out of order at {}", tag);
        }
    }

    #[test]
    fn test_null_decodes_to_missing_for_every_tag() {
        for tag in AttributeType::ALL {
            assert_eq!(decode(tag, &StoredValue::Null), Ok(None));
            assert_eq!(encode(tag, None), Ok(StoredValue::Null));
        }
    }

    #[test]
    fn test_unparsable_defaults_to_missing() {
        let value = parse_input(AttributeType::Int32, "abc", UnparsablePolicy::default()).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_unparsable_rejected_under_strict_policy() {
        let err = parse_input(AttributeType::Int8, "300", UnparsablePolicy::Reject).unwrap_err();
        assert!(matches!(err, EavError::InvalidValue { .. }));
    }

    #[test]
    fn test_byte_and_rune_take_first_element() {
        assert_eq!(
            parse_input(AttributeType::Byte, "xyz", UnparsablePolicy::Reject),
            Ok(Some(Value::Byte(b'x')))
        );
        assert_eq!(
            parse_input(AttributeType::Rune, "ñandú", UnparsablePolicy::Reject),
            Ok(Some(Value::Rune('ñ')))
        );
        assert_eq!(
            parse_input(AttributeType::Rune, "", UnparsablePolicy::Reject),
            Ok(None)
        );
        assert_eq!(
            parse_input(AttributeType::Byte, "", UnparsablePolicy::Reject),
            Ok(None)
        );
    }

    #[test]
    fn test_variant_mismatch_on_encode() {
        let err = encode(AttributeType::Int8, Some(&Value::Int16(1))).unwrap_err();
        assert!(matches!(err, EavError::TypeMismatch { .. }));
    }

    #[test]
    fn test_out_of_range_on_decode() {
        let err = decode(AttributeType::Uint8, &StoredValue::Integer(256)).unwrap_err();
        assert!(matches!(err, EavError::TypeMismatch { .. }));
        assert!(decode(AttributeType::Int8, &StoredValue::Text("1".into())).is_err());
        assert!(decode(AttributeType::Bool, &StoredValue::Integer(2)).is_err());
    }

    #[test]
    fn test_large_uint64_stored_as_text() {
        let stored = encode(AttributeType::Uint64, Some(&Value::Uint64(u64::MAX))).unwrap();
        assert_eq!(stored, StoredValue::Text(u64::MAX.to_string()));
        assert_eq!(
            decode(AttributeType::Uint64, &stored),
            Ok(Some(Value::Uint64(u64::MAX)))
        );
        assert_eq!(
            encode(AttributeType::Uint, Some(&Value::Uint(7))),
            Ok(StoredValue::Integer(7))
        );
    }

    #[test]
    fn test_non_utf8_text_is_mismatch() {
        let stored = StoredValue::from_text_bytes(&[0xc3, 0x28]);
        assert!(decode(AttributeType::String, &stored).is_err());
    }

    #[test]
    fn test_date_has_no_time_component() {
        let value = parse_input(AttributeType::Date, "2023-10-05", UnparsablePolicy::Reject)
            .unwrap()
            .unwrap();
        let stored = encode(AttributeType::Date, Some(&value)).unwrap();
        assert_eq!(stored, StoredValue::Text("2023-10-05".to_string()));
        assert_eq!(
            decode(AttributeType::Date, &stored),
            Ok(Some(Value::Date(NaiveDate::from_ymd_opt(2023, 10, 5).unwrap())))
        );
    }

    #[test]
    fn test_unknown_tag_decodes_to_missing() {
        assert_eq!(decode_tagged("decimal", &StoredValue::Integer(1)), Ok(None));
        assert_eq!(
            decode_tagged("int", &StoredValue::Integer(1)),
            Ok(Some(Value::Int(1)))
        );
    }
}
