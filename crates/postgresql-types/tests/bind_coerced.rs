//! Coerce source values against the category of a column type, then bind the
//! result for that same type, the way the sink does for each row.

use bytes::BytesMut;
use chrono::{TimeZone, Utc};
use postgres_types::{Format, IsNull, ToSql, Type};
use postgresql_types::{postgresql_type_to_category, row_to_postgresql};
use sync_core::{coerce_value, CoercedValue, SourceValue};

struct Bound {
    is_null: bool,
    format: Format,
    bytes: Vec<u8>,
    fell_back: bool,
}

fn bind(value: SourceValue, ty: &Type) -> Bound {
    let category = postgresql_type_to_category(ty);
    let coercion = coerce_value(&value, &category).unwrap();
    let row = row_to_postgresql(&[coercion.value]);

    let mut buf = BytesMut::new();
    let is_null = row[0].to_sql_checked(ty, &mut buf).unwrap();
    Bound {
        is_null: matches!(is_null, IsNull::Yes),
        format: row[0].encode_format(ty),
        bytes: buf.to_vec(),
        fell_back: coercion.fell_back,
    }
}

#[test]
fn test_every_category_binds_for_its_type() {
    let instant = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
    let cases = vec![
        (Type::TEXT, SourceValue::from("trial")),
        (Type::VARCHAR, SourceValue::from(42i64)),
        (Type::BPCHAR, SourceValue::from(true)),
        (Type::INT2, SourceValue::from(7i64)),
        (Type::INT4, SourceValue::from("7")),
        (Type::INT8, SourceValue::from(1i64 << 40)),
        (Type::FLOAT4, SourceValue::from(1.5)),
        (Type::FLOAT8, SourceValue::from("2.25")),
        (Type::NUMERIC, SourceValue::from(9.5)),
        (Type::BOOL, SourceValue::from(1i64)),
        (Type::BIT, SourceValue::from("false")),
        (Type::DATE, SourceValue::from(instant)),
        (Type::TIMESTAMP, SourceValue::from(instant)),
        (
            Type::TIMESTAMPTZ,
            SourceValue::Timestamp {
                seconds: 1_700_000_000,
                increment: 1,
            },
        ),
        (Type::BYTEA, SourceValue::from(vec![0xDEu8, 0xAD, 0xBE, 0xEF])),
    ];

    for (ty, value) in cases {
        let bound = bind(value, &ty);
        assert!(!bound.is_null, "{ty}");
        assert!(!bound.fell_back, "{ty}");
        assert!(matches!(bound.format, Format::Binary), "{ty}");
        assert!(!bound.bytes.is_empty(), "{ty}");
    }
}

#[test]
fn test_absent_field_binds_null_for_any_type() {
    for ty in [Type::INT4, Type::NUMERIC, Type::DATE, Type::BYTEA, Type::UUID] {
        let bound = bind(SourceValue::Absent, &ty);
        assert!(bound.is_null, "{ty}");
    }
}

#[test]
fn test_failed_numeric_parse_is_sent_as_text() {
    for ty in [Type::INT2, Type::INT4, Type::INT8, Type::FLOAT4, Type::FLOAT8, Type::NUMERIC] {
        let bound = bind(SourceValue::from("abc"), &ty);
        assert!(bound.fell_back, "{ty}");
        assert!(matches!(bound.format, Format::Text), "{ty}");
        assert_eq!(bound.bytes, b"abc", "{ty}");
    }

    // The server accepts surrounding whitespace for integer input
    let bound = bind(SourceValue::from(" 42"), &Type::INT4);
    assert!(bound.fell_back);
    assert_eq!(bound.bytes, b" 42");
}

#[test]
fn test_numeric_column_keeps_every_digit() {
    let bound = bind(SourceValue::from(1e30), &Type::NUMERIC);
    assert!(!bound.fell_back);
    assert!(matches!(bound.format, Format::Text));
    assert_eq!(bound.bytes, b"1000000000000000000000000000000");

    let bound = bind(SourceValue::from(1e-30), &Type::NUMERIC);
    assert!(matches!(bound.format, Format::Text));
    assert_eq!(bound.bytes, b"0.000000000000000000000000000001");

    let bound = bind(SourceValue::from("12.75"), &Type::NUMERIC);
    assert!(matches!(bound.format, Format::Binary));
}

#[test]
fn test_blob_is_bound_as_base64_bytes() {
    let bound = bind(SourceValue::from(vec![0xDEu8, 0xAD, 0xBE, 0xEF]), &Type::BYTEA);
    assert_eq!(bound.bytes, b"3q2+7w==");
}

#[test]
fn test_unrecognized_type_binds_null() {
    let category = postgresql_type_to_category(&Type::UUID);
    let coercion = coerce_value(&SourceValue::from("x"), &category).unwrap();
    assert_eq!(coercion.value, CoercedValue::Unbound);

    let bound = bind(SourceValue::from("x"), &Type::UUID);
    assert!(bound.is_null);
}
