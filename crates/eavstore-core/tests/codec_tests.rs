#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use eavstore_core::codec::{decode, decode_tagged, encode, parse_input};
use eavstore_core::{AttributeType, EavError, StoredValue, UnparsablePolicy, Value};
use proptest::prelude::*;

#[test]
fn test_every_tag_has_a_sample() {
    let samples = common::sample_literals();
    for tag in AttributeType::ALL {
        assert!(
            samples.iter().any(|(t, _, _)| *t == tag),
            "no sample literal for {}",
            tag
        );
    }
}

#[test]
fn test_parse_encode_decode_roundtrip() {
    for (tag, text, expected) in common::sample_literals() {
        let parsed = parse_input(tag, text, UnparsablePolicy::Reject)
            .unwrap()
            .unwrap_or_else(|| panic!("{} did not parse '{}'", tag, text));
        assert_eq!(parsed, expected, "parse {}", tag);

        let stored = encode(tag, Some(&parsed)).unwrap();
        let decoded = decode(tag, &stored).unwrap();
        assert_eq!(decoded, Some(expected), "roundtrip {}", tag);
    }
}

#[test]
fn test_missing_value_is_not_zero() {
    for tag in AttributeType::ALL {
        let stored = encode(tag, None).unwrap();
        assert_eq!(stored, StoredValue::Null);
        assert_eq!(decode(tag, &stored).unwrap(), None, "{}", tag);
    }

    let zero = encode(AttributeType::Int, Some(&Value::Int(0))).unwrap();
    assert_eq!(decode(AttributeType::Int, &zero).unwrap(), Some(Value::Int(0)));
}

#[test]
fn test_encode_rejects_foreign_variant_for_every_tag() {
    let samples = common::sample_literals();
    for (tag, _, _) in &samples {
        let foreign = samples
            .iter()
            .map(|(_, _, v)| v)
            .find(|v| v.attribute_type() != *tag)
            .unwrap();
        let err = encode(*tag, Some(foreign)).unwrap_err();
        assert!(matches!(err, EavError::TypeMismatch { .. }), "{}", tag);
    }
}

#[test]
fn test_unparsable_input_policies() {
    let cases = [
        (AttributeType::Bool, "maybe"),
        (AttributeType::Int16, "40000"),
        (AttributeType::Uint, "-1"),
        (AttributeType::Float64, "1,5"),
        (AttributeType::Float32, "1e40"),
        (AttributeType::Float64, "1e400"),
        (AttributeType::Float64, "NaN"),
        (AttributeType::Float32, "nan"),
        (AttributeType::Date, "10/05/2023"),
        (AttributeType::Time, "1pm"),
        (AttributeType::Datetime, "2023-10-05T13:45:00"),
    ];
    for (tag, text) in cases {
        assert_eq!(
            parse_input(tag, text, UnparsablePolicy::StoreMissing).unwrap(),
            None,
            "{} '{}'",
            tag,
            text
        );
        let err = parse_input(tag, text, UnparsablePolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            EavError::InvalidValue {
                attribute_type: tag.to_string(),
                input: text.to_string(),
            }
        );
    }
}

#[test]
fn test_float_infinity_only_when_spelled_out() {
    // Given literals that name infinity explicitly
    // When parsed under Reject
    // Then they are accepted with the sign kept
    assert_eq!(
        parse_input(AttributeType::Float32, "inf", UnparsablePolicy::Reject).unwrap(),
        Some(Value::Float32(f32::INFINITY))
    );
    assert_eq!(
        parse_input(AttributeType::Float64, "-Infinity", UnparsablePolicy::Reject).unwrap(),
        Some(Value::Float64(f64::NEG_INFINITY))
    );
    // And the largest finite float32 still parses
    assert_eq!(
        parse_input(AttributeType::Float32, "3.4e38", UnparsablePolicy::Reject).unwrap(),
        Some(Value::Float32(3.4e38))
    );
}

#[test]
fn test_encode_refuses_nan() {
    // Given NaN built directly rather than parsed
    for (tag, value) in [
        (AttributeType::Float32, Value::Float32(f32::NAN)),
        (AttributeType::Float64, Value::Float64(f64::NAN)),
    ] {
        // When encoded
        let err = encode(tag, Some(&value)).unwrap_err();
        // Then it is a type mismatch, never a silent NULL
        assert_eq!(
            err,
            EavError::TypeMismatch {
                attribute_type: tag.to_string(),
                reason: "NaN cannot be stored".to_string(),
            }
        );
    }
}

#[test]
fn test_legacy_temporal_rows_still_decode() {
    let stored = StoredValue::Text("2023-10-05 00:00:00 +0000 UTC".to_string());
    let value = decode(AttributeType::Date, &stored).unwrap().unwrap();
    assert_eq!(value.to_string(), "2023-10-05");

    let stored = StoredValue::Text("2023-10-05 21:10:00 -0500 EST".to_string());
    let value = decode(AttributeType::Datetime, &stored).unwrap().unwrap();
    assert_eq!(value.to_string(), "2023-10-05 21:10:00");
}

#[test]
fn test_decode_tagged_tolerates_unknown_tags() {
    assert_eq!(
        decode_tagged("money", &StoredValue::Text("12.00".into())).unwrap(),
        None
    );
    assert!(decode_tagged("int8", &StoredValue::Integer(1000)).is_err());
}

proptest! {
    #[test]
    fn prop_int8_roundtrip(n in any::<i8>()) {
        let stored = encode(AttributeType::Int8, Some(&Value::Int8(n))).unwrap();
        prop_assert_eq!(decode(AttributeType::Int8, &stored).unwrap(), Some(Value::Int8(n)));
    }

    #[test]
    fn prop_int32_text_roundtrip(n in any::<i32>()) {
        let parsed = parse_input(AttributeType::Int32, &n.to_string(), UnparsablePolicy::Reject).unwrap();
        let stored = encode(AttributeType::Int32, parsed.as_ref()).unwrap();
        prop_assert_eq!(stored, StoredValue::Integer(i64::from(n)));
    }

    #[test]
    fn prop_uint64_roundtrip(n in any::<u64>()) {
        let stored = encode(AttributeType::Uint64, Some(&Value::Uint64(n))).unwrap();
        prop_assert_eq!(decode(AttributeType::Uint64, &stored).unwrap(), Some(Value::Uint64(n)));
    }

    #[test]
    fn prop_uint16_rejects_out_of_range(n in (i64::from(u16::MAX) + 1)..i64::MAX) {
        let err = decode(AttributeType::Uint16, &StoredValue::Integer(n)).unwrap_err();
        let is_mismatch = matches!(err, EavError::TypeMismatch { .. });
        prop_assert!(is_mismatch);
    }

    #[test]
    fn prop_rune_roundtrip(c in any::<char>()) {
        let stored = encode(AttributeType::Rune, Some(&Value::Rune(c))).unwrap();
        prop_assert_eq!(decode(AttributeType::Rune, &stored).unwrap(), Some(Value::Rune(c)));
    }
}
