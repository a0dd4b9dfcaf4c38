// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! List and map codecs.
//!
//! A homogeneous primitive list is written as a consistent array: the
//! element codec's manifest once, then a count and tightly packed payloads.
//! Anything else falls back to the plain list encoding where every element
//! carries its own manifest.

use super::{mismatch, ValueSerializer};
use crate::error::{WireError, WireResult};
use crate::manifest;
use crate::session::{DeserializationSession, SerializationSession};
use crate::value::Value;
use crate::Serializer;
use std::io::{Read, Write};

/// Direct manifest code shared by every element, if the list qualifies for
/// the consistent-array encoding.
pub(crate) fn homogeneous_code(items: &[Value]) -> Option<u8> {
    let first = items.first()?.kind();
    let code = first.manifest_code()?;
    items
        .iter()
        .all(|item| item.kind() == first)
        .then_some(code)
}

fn write_count(sink: &mut dyn Write, len: usize) -> WireResult<()> {
    let count = u32::try_from(len).map_err(|_| WireError::ProtocolViolation {
        reason: "collection longer than u32::MAX".into(),
    })?;
    manifest::write_u32(sink, count)
}

pub struct ListSerializer;

impl ValueSerializer for ListSerializer {
    fn write_manifest(
        &self,
        sink: &mut dyn Write,
        _session: &mut SerializationSession,
    ) -> WireResult<()> {
        manifest::write_u8(sink, manifest::LIST)
    }

    fn write_value(
        &self,
        sink: &mut dyn Write,
        value: &Value,
        session: &mut SerializationSession,
        engine: &Serializer,
    ) -> WireResult<()> {
        match value {
            Value::List(items) => {
                write_count(sink, items.len())?;
                for item in items {
                    engine.write_value(item, sink, session)?;
                }
                Ok(())
            }
            other => Err(mismatch("list", other)),
        }
    }

    fn read_value(
        &self,
        source: &mut dyn Read,
        session: &mut DeserializationSession,
        engine: &Serializer,
    ) -> WireResult<Value> {
        let count = manifest::read_u32(source)? as usize;
        let mut items = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            items.push(engine.read_value(source, session)?);
        }
        Ok(Value::List(items))
    }
}

pub struct ConsistentListSerializer;

impl ValueSerializer for ConsistentListSerializer {
    fn write_manifest(
        &self,
        sink: &mut dyn Write,
        _session: &mut SerializationSession,
    ) -> WireResult<()> {
        manifest::write_u8(sink, manifest::CONSISTENT_LIST)
    }

    fn write_value(
        &self,
        sink: &mut dyn Write,
        value: &Value,
        session: &mut SerializationSession,
        engine: &Serializer,
    ) -> WireResult<()> {
        match value {
            Value::List(items) => {
                let code = homogeneous_code(items).ok_or(WireError::ProtocolViolation {
                    reason: "consistent array requires a homogeneous primitive list".into(),
                })?;
                let codec = engine
                    .direct_codec(code)
                    .ok_or(WireError::UnknownManifest { code })?;
                manifest::write_u8(sink, code)?;
                write_count(sink, items.len())?;
                for item in items {
                    codec.write_value(sink, item, session, engine)?;
                }
                Ok(())
            }
            other => Err(mismatch("list", other)),
        }
    }

    fn read_value(
        &self,
        source: &mut dyn Read,
        session: &mut DeserializationSession,
        engine: &Serializer,
    ) -> WireResult<Value> {
        let code = manifest::read_u8(source)?;
        let codec = engine
            .direct_codec(code)
            .ok_or(WireError::UnknownManifest { code })?;
        let count = manifest::read_u32(source)? as usize;
        let mut items = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            items.push(codec.read_value(source, session, engine)?);
        }
        Ok(Value::List(items))
    }
}

pub struct MapSerializer;

impl ValueSerializer for MapSerializer {
    fn write_manifest(
        &self,
        sink: &mut dyn Write,
        _session: &mut SerializationSession,
    ) -> WireResult<()> {
        manifest::write_u8(sink, manifest::MAP)
    }

    fn write_value(
        &self,
        sink: &mut dyn Write,
        value: &Value,
        session: &mut SerializationSession,
        engine: &Serializer,
    ) -> WireResult<()> {
        match value {
            Value::Map(entries) => {
                write_count(sink, entries.len())?;
                for (key, val) in entries {
                    engine.write_value(key, sink, session)?;
                    engine.write_value(val, sink, session)?;
                }
                Ok(())
            }
            other => Err(mismatch("map", other)),
        }
    }

    fn read_value(
        &self,
        source: &mut dyn Read,
        session: &mut DeserializationSession,
        engine: &Serializer,
    ) -> WireResult<Value> {
        let count = manifest::read_u32(source)? as usize;
        let mut entries = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            let key = engine.read_value(source, session)?;
            let val = engine.read_value(source, session)?;
            entries.push((key, val));
        }
        Ok(Value::Map(entries))
    }
}

pub static LIST_SERIALIZER: ListSerializer = ListSerializer;
pub static CONSISTENT_LIST_SERIALIZER: ConsistentListSerializer = ConsistentListSerializer;
pub static MAP_SERIALIZER: MapSerializer = MapSerializer;
