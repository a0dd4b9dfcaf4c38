// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Version tolerance between engines holding different revisions of a type,
// and the compact manifests (known-type index, session index).

#![allow(clippy::missing_panics_doc)]

use objwire::{
    manifest, Serializer, SerializerOptions, TypeDescriptor, TypeDescriptorBuilder, Value,
    ValueKind,
};
use std::sync::Arc;

fn person_v1() -> Arc<TypeDescriptor> {
    TypeDescriptorBuilder::new("Person")
        .field("name", ValueKind::String)
        .field("age", ValueKind::I32)
        .build()
}

fn person_v2() -> Arc<TypeDescriptor> {
    TypeDescriptorBuilder::new("Person")
        .field("name", ValueKind::String)
        .field("age", ValueKind::I32)
        .field("nickname", ValueKind::String)
        .build()
}

fn tolerant_engine(desc: Arc<TypeDescriptor>) -> Serializer {
    Serializer::new(
        SerializerOptions::builder()
            .version_tolerance(true)
            .register(desc)
            .build(),
    )
}

#[test]
fn test_old_stream_read_by_new_type_defaults_added_field() {
    let writer = tolerant_engine(person_v1());
    let reader = tolerant_engine(person_v2());

    let value = Value::object(
        &person_v1(),
        vec![Value::String("Ada".into()), Value::I32(36)],
    );
    let mut buf = Vec::new();
    writer.serialize_value(&value, &mut buf).expect("serialize");
    assert_eq!(buf[0], manifest::VERSION_MANIFEST);

    let back = reader
        .deserialize_value(&mut buf.as_slice())
        .expect("deserialize");
    assert_eq!(back.get_field("name"), Some(Value::String("Ada".into())));
    assert_eq!(back.get_field("age"), Some(Value::I32(36)));
    // Not in the stream: the added field keeps its kind default.
    assert_eq!(
        back.get_field("nickname"),
        Some(Value::String(String::new()))
    );
}

#[test]
fn test_new_stream_read_by_old_type_drops_removed_field() {
    let writer = tolerant_engine(person_v2());
    let reader = tolerant_engine(person_v1());

    let value = Value::object(
        &person_v2(),
        vec![
            Value::String("Ada".into()),
            Value::I32(36),
            Value::String("Countess".into()),
        ],
    );
    let mut buf = Vec::new();
    writer.serialize_value(&value, &mut buf).expect("serialize");

    let back = reader
        .deserialize_value(&mut buf.as_slice())
        .expect("deserialize");
    assert_eq!(back.get_field("name"), Some(Value::String("Ada".into())));
    assert_eq!(back.get_field("age"), Some(Value::I32(36)));
    // The reader's revision has no such field.
    assert_eq!(back.get_field("nickname"), None);
    assert_eq!(
        back.as_object().expect("object").read().fields.len(),
        2
    );
}

#[test]
fn test_versioned_stream_is_self_describing_for_unknown_names() {
    let writer = tolerant_engine(person_v1());
    // Reader has never heard of Person; the stream's field table is enough.
    let reader = Serializer::new(SerializerOptions::builder().version_tolerance(true).build());

    let value = Value::object(
        &person_v1(),
        vec![Value::String("Ada".into()), Value::I32(36)],
    );
    let mut buf = Vec::new();
    writer.serialize_value(&value, &mut buf).expect("serialize");

    let back = reader
        .deserialize_value(&mut buf.as_slice())
        .expect("deserialize");
    assert_eq!(back.get_field("name"), Some(Value::String("Ada".into())));
    assert_eq!(back.get_field("age"), Some(Value::I32(36)));
}

#[test]
fn test_without_tolerance_full_manifest_carries_only_the_name() {
    let desc = person_v1();
    let plain = Serializer::new(SerializerOptions::builder().register(desc.clone()).build());
    let tolerant = tolerant_engine(desc.clone());

    let value = Value::object(&desc, vec![Value::String("Ada".into()), Value::I32(36)]);
    let mut plain_buf = Vec::new();
    plain
        .serialize_value(&value, &mut plain_buf)
        .expect("serialize");
    let mut tolerant_buf = Vec::new();
    tolerant
        .serialize_value(&value, &mut tolerant_buf)
        .expect("serialize");

    assert_eq!(plain_buf[0], manifest::FULL_MANIFEST);
    // The field table costs bytes; the plain manifest skips it.
    assert!(plain_buf.len() < tolerant_buf.len());
}

#[test]
fn test_known_type_manifest_is_index_only() {
    let desc = person_v1();
    let known = Serializer::new(SerializerOptions::builder().known_type(desc.clone()).build());
    let unknown = Serializer::new(SerializerOptions::builder().register(desc.clone()).build());

    let value = Value::object(&desc, vec![Value::String("Ada".into()), Value::I32(36)]);
    let mut known_buf = Vec::new();
    known
        .serialize_value(&value, &mut known_buf)
        .expect("serialize");
    let mut named_buf = Vec::new();
    unknown
        .serialize_value(&value, &mut named_buf)
        .expect("serialize");

    // manifest byte + u16 table index, then the field payloads
    assert_eq!(known_buf[0], manifest::KNOWN_TYPE_INDEX);
    assert_eq!(&known_buf[1..3], &[0, 0]);
    assert!(known_buf.len() < named_buf.len());

    // Both ends must agree on the table for the index to resolve.
    let back = known
        .deserialize_value(&mut known_buf.as_slice())
        .expect("deserialize");
    assert_eq!(back, value);
}

#[test]
fn test_second_occurrence_reuses_session_index() {
    let desc = person_v1();
    let engine = Serializer::new(SerializerOptions::builder().register(desc.clone()).build());

    let a = Value::object(&desc, vec![Value::String("Ada".into()), Value::I32(36)]);
    let b = Value::object(&desc, vec![Value::String("Bob".into()), Value::I32(41)]);
    let list = Value::List(vec![a, b]);

    let mut buf = Vec::new();
    engine.serialize_value(&list, &mut buf).expect("serialize");
    // One full manifest, one session-index reference.
    assert_eq!(
        buf.iter()
            .filter(|b| **b == manifest::SESSION_TYPE_INDEX)
            .count(),
        1
    );

    let back = engine
        .deserialize_value(&mut buf.as_slice())
        .expect("deserialize");
    assert_eq!(back, list);
}

#[test]
fn test_session_state_does_not_leak_between_calls() {
    let desc = person_v1();
    let engine = Serializer::new(SerializerOptions::builder().register(desc.clone()).build());
    let value = Value::object(&desc, vec![Value::String("Ada".into()), Value::I32(36)]);

    let mut first = Vec::new();
    engine.serialize_value(&value, &mut first).expect("serialize");
    let mut second = Vec::new();
    engine
        .serialize_value(&value, &mut second)
        .expect("serialize");
    // Each call opens a fresh session, so both streams start with the full
    // manifest and are byte-identical.
    assert_eq!(first, second);
    assert_eq!(first[0], manifest::FULL_MANIFEST);
}
