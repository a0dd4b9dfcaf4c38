// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// End-to-end round-trips through the value API, plus byte-level checks of
// the manifest framing for representative shapes.

#![allow(clippy::float_cmp)]
#![allow(clippy::missing_panics_doc)]

use objwire::{manifest, Serializer, SerializerOptions, TypeDescriptorBuilder, Value, ValueKind};

fn roundtrip(engine: &Serializer, value: &Value) -> Value {
    let mut buf = Vec::new();
    engine.serialize_value(value, &mut buf).expect("serialize");
    engine
        .deserialize_value(&mut buf.as_slice())
        .expect("deserialize")
}

#[test]
fn test_scalar_roundtrips() {
    let engine = Serializer::default();
    let values = vec![
        Value::Null,
        Value::Bool(true),
        Value::I8(-8),
        Value::I16(-1600),
        Value::I32(-320_000),
        Value::I64(-64_000_000_000),
        Value::U8(200),
        Value::U16(60_000),
        Value::U32(4_000_000_000),
        Value::U64(18_000_000_000_000_000_000),
        Value::F32(1.5),
        Value::F64(-2.25e300),
        Value::Char('\u{1F4E6}'),
        Value::String("objwire".into()),
        Value::Timestamp(1_700_000_000_000_000_000),
        Value::Uuid([0xAB; 16]),
    ];
    for value in values {
        assert_eq!(roundtrip(&engine, &value), value);
    }
}

#[test]
fn test_i32_is_manifest_byte_plus_payload() {
    let engine = Serializer::default();
    let mut buf = Vec::new();
    engine
        .serialize_value(&Value::I32(42), &mut buf)
        .expect("serialize");
    assert_eq!(buf, vec![manifest::I32, 42, 0, 0, 0]);
}

#[test]
fn test_null_is_a_single_byte() {
    let engine = Serializer::default();
    let mut buf = Vec::new();
    engine
        .serialize_value(&Value::Null, &mut buf)
        .expect("serialize");
    assert_eq!(buf, vec![manifest::NULL]);
}

#[test]
fn test_string_layout() {
    let engine = Serializer::default();
    let mut buf = Vec::new();
    engine
        .serialize_value(&Value::String("hi".into()), &mut buf)
        .expect("serialize");
    // manifest + u32 byte length + UTF-8 payload
    assert_eq!(buf, vec![manifest::STRING, 2, 0, 0, 0, b'h', b'i']);
}

#[test]
fn test_random_bytes_roundtrip() {
    let engine = Serializer::default();
    fastrand::seed(7);
    let payload: Vec<u8> = (0..4096).map(|_| fastrand::u8(..)).collect();
    let value = Value::Bytes(payload);
    assert_eq!(roundtrip(&engine, &value), value);
}

#[test]
fn test_homogeneous_list_uses_consistent_encoding() {
    let engine = Serializer::default();
    let list = Value::List(vec![Value::I32(1), Value::I32(2), Value::I32(3)]);
    let mut buf = Vec::new();
    engine.serialize_value(&list, &mut buf).expect("serialize");
    assert_eq!(buf[0], manifest::CONSISTENT_LIST);
    assert_eq!(buf[1], manifest::I32);
    // list manifest + element code + u32 count + three packed i32 payloads
    assert_eq!(buf.len(), 1 + 1 + 4 + 3 * 4);
    assert_eq!(
        engine
            .deserialize_value(&mut buf.as_slice())
            .expect("deserialize"),
        list
    );
}

#[test]
fn test_mixed_list_elements_carry_their_own_manifests() {
    let engine = Serializer::default();
    let list = Value::List(vec![
        Value::I32(1),
        Value::String("two".into()),
        Value::Null,
    ]);
    let mut buf = Vec::new();
    engine.serialize_value(&list, &mut buf).expect("serialize");
    assert_eq!(buf[0], manifest::LIST);
    assert_eq!(
        engine
            .deserialize_value(&mut buf.as_slice())
            .expect("deserialize"),
        list
    );
}

#[test]
fn test_empty_list_roundtrip() {
    let engine = Serializer::default();
    let list = Value::List(Vec::new());
    assert_eq!(roundtrip(&engine, &list), list);
}

#[test]
fn test_map_preserves_entry_order() {
    let engine = Serializer::default();
    let map = Value::Map(vec![
        (Value::String("b".into()), Value::I32(2)),
        (Value::String("a".into()), Value::I32(1)),
        (Value::I64(99), Value::List(vec![Value::Bool(false)])),
    ]);
    assert_eq!(roundtrip(&engine, &map), map);
}

#[test]
fn test_object_roundtrip_through_registry() {
    let desc = TypeDescriptorBuilder::new("Point")
        .field("x", ValueKind::I32)
        .field("y", ValueKind::I32)
        .build();
    let engine = Serializer::new(
        SerializerOptions::builder().register(desc.clone()).build(),
    );
    let value = Value::object(&desc, vec![Value::I32(3), Value::I32(-4)]);
    let back = roundtrip(&engine, &value);
    assert_eq!(back, value);
    assert_eq!(back.get_field("x"), Some(Value::I32(3)));
}

#[test]
fn test_nested_object_roundtrip() {
    let inner = TypeDescriptorBuilder::new("Point")
        .field("x", ValueKind::I32)
        .field("y", ValueKind::I32)
        .build();
    let outer = TypeDescriptorBuilder::new("Segment")
        .field("from", ValueKind::Object)
        .field("to", ValueKind::Object)
        .field("label", ValueKind::String)
        .build();
    let engine = Serializer::new(
        SerializerOptions::builder()
            .register(inner.clone())
            .register(outer.clone())
            .build(),
    );
    let value = Value::object(
        &outer,
        vec![
            Value::object(&inner, vec![Value::I32(0), Value::I32(0)]),
            Value::object(&inner, vec![Value::I32(5), Value::I32(5)]),
            Value::String("diagonal".into()),
        ],
    );
    assert_eq!(roundtrip(&engine, &value), value);
}

#[test]
fn test_type_value_roundtrip() {
    let desc = TypeDescriptorBuilder::new("Point")
        .field("x", ValueKind::I32)
        .build();
    let engine = Serializer::new(
        SerializerOptions::builder().register(desc.clone()).build(),
    );
    let value = Value::Type(desc);
    assert_eq!(roundtrip(&engine, &value), value);
}

#[test]
fn test_truncated_input_is_an_io_error() {
    let engine = Serializer::default();
    let mut buf = Vec::new();
    engine
        .serialize_value(&Value::I64(7), &mut buf)
        .expect("serialize");
    buf.truncate(buf.len() - 2);
    let err = engine.deserialize_value(&mut buf.as_slice()).unwrap_err();
    assert!(matches!(err, objwire::WireError::Io(_)));
}
