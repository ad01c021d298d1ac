use chrono::{NaiveDate, NaiveTime};
use eavstore_core::{AttributeType, Value};

/// A representative valid literal for every type tag, paired with the text a
/// caller would type for it
#[allow(dead_code)]
pub fn sample_literals() -> Vec<(AttributeType, &'static str, Value)> {
    let date = NaiveDate::from_ymd_opt(2023, 10, 5).unwrap();
    vec![
        (AttributeType::Bool, "true", Value::Bool(true)),
        (AttributeType::String, "Dune", Value::String("Dune".to_string())),
        (AttributeType::Int, "-42", Value::Int(-42)),
        (AttributeType::Int8, "-128", Value::Int8(i8::MIN)),
        (AttributeType::Int16, "32767", Value::Int16(i16::MAX)),
        (AttributeType::Int32, "-7", Value::Int32(-7)),
        (
            AttributeType::Int64,
            "9223372036854775807",
            Value::Int64(i64::MAX),
        ),
        (AttributeType::Uint, "42", Value::Uint(42)),
        (AttributeType::Uint8, "255", Value::Uint8(u8::MAX)),
        (AttributeType::Uint16, "412", Value::Uint16(412)),
        (AttributeType::Uint32, "4294967295", Value::Uint32(u32::MAX)),
        (
            AttributeType::Uint64,
            "18446744073709551615",
            Value::Uint64(u64::MAX),
        ),
        (AttributeType::Byte, "A", Value::Byte(b'A')),
        (AttributeType::Rune, "λ", Value::Rune('λ')),
        (AttributeType::Float32, "1.5", Value::Float32(1.5)),
        (AttributeType::Float64, "-0.125", Value::Float64(-0.125)),
        (AttributeType::Blob, "raw", Value::Blob(b"raw".to_vec())),
        (AttributeType::Date, "2023-10-05", Value::Date(date)),
        (
            AttributeType::Time,
            "13:45:00",
            Value::Time(NaiveTime::from_hms_opt(13, 45, 0).unwrap()),
        ),
        (
            AttributeType::Datetime,
            "2023-10-05 13:45:00",
            Value::Datetime(date.and_hms_opt(13, 45, 0).unwrap()),
        ),
    ]
}
