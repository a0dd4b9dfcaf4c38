// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic object codec, known-type wrapping and the failure sentinel.

use super::{mismatch, ValueSerializer};
use crate::descriptor::TypeDescriptor;
use crate::error::{WireError, WireResult};
use crate::manifest;
use crate::session::{DeserializationSession, SerializationSession};
use crate::value::{ObjectValue, Value};
use crate::Serializer;
use parking_lot::RwLock;
use std::io::{Read, Write};
use std::sync::Arc;

/// Field-based codec for typed objects, built once per descriptor on first
/// need and cached by the engine.
///
/// Without version tolerance the manifest is just the type name and field
/// payloads are positional. With version tolerance the manifest carries the
/// field name/kind table, and the reader matches incoming fields to the
/// local descriptor by name: unknown incoming fields are read and dropped,
/// locally known fields absent from the stream keep their kind's default.
///
/// Either way, the first occurrence in a stream writes the manifest in full
/// and later occurrences use the per-call session index.
#[derive(Debug)]
pub struct ObjectSerializer {
    descriptor: Arc<TypeDescriptor>,
    version_tolerance: bool,
    preserve_refs: bool,
}

impl ObjectSerializer {
    /// Enumerate the type's serializable members. A type exposing none
    /// cannot be serialized; the engine turns that into a sentinel.
    pub fn build(
        descriptor: &Arc<TypeDescriptor>,
        version_tolerance: bool,
        preserve_refs: bool,
    ) -> WireResult<Self> {
        if descriptor.fields.is_empty() {
            return Err(WireError::UnsupportedType {
                type_name: descriptor.name.to_string(),
                reason: "type exposes no serializable members".into(),
            });
        }
        Ok(Self {
            descriptor: descriptor.clone(),
            version_tolerance,
            preserve_refs,
        })
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }
}

impl ValueSerializer for ObjectSerializer {
    fn write_manifest(
        &self,
        sink: &mut dyn Write,
        session: &mut SerializationSession,
    ) -> WireResult<()> {
        if let Some(index) = session.learned_index(&self.descriptor.name) {
            manifest::write_u8(sink, manifest::SESSION_TYPE_INDEX)?;
            return manifest::write_u16(sink, index);
        }
        if self.version_tolerance {
            manifest::write_u8(sink, manifest::VERSION_MANIFEST)?;
            manifest::write_str(sink, &self.descriptor.name)?;
            manifest::write_u16(sink, self.descriptor.fields.len() as u16)?;
            for field in &self.descriptor.fields {
                manifest::write_str(sink, &field.name)?;
                manifest::write_u8(sink, field.kind.wire_tag())?;
            }
        } else {
            manifest::write_u8(sink, manifest::FULL_MANIFEST)?;
            manifest::write_str(sink, &self.descriptor.name)?;
        }
        session.learn(self.descriptor.name.clone());
        Ok(())
    }

    fn write_value(
        &self,
        sink: &mut dyn Write,
        value: &Value,
        session: &mut SerializationSession,
        engine: &Serializer,
    ) -> WireResult<()> {
        let obj = match value {
            Value::Object(obj) => obj,
            other => return Err(mismatch(&self.descriptor.name, other)),
        };
        for (index, field) in self.descriptor.fields.iter().enumerate() {
            // Clone the field out so the node lock is not held across the
            // recursive write.
            let field_value = {
                let guard = obj.read();
                guard.fields.get(index).cloned()
            };
            let field_value = field_value.ok_or_else(|| WireError::FieldAccess {
                type_name: self.descriptor.name.to_string(),
                field: field.name.clone(),
                reason: "object has no value at this field position".into(),
            })?;
            engine.write_value(&field_value, sink, session)?;
        }
        Ok(())
    }

    fn read_value(
        &self,
        source: &mut dyn Read,
        session: &mut DeserializationSession,
        engine: &Serializer,
    ) -> WireResult<Value> {
        let obj = Arc::new(RwLock::new(ObjectValue::with_defaults(&self.descriptor)));
        if self.preserve_refs {
            // Registered before fields are read so back-references inside
            // them resolve to this node, closing cycles.
            session.register_object(obj.clone());
        }
        match session.version_map(&self.descriptor.name) {
            Some(map) => {
                for slot in &map.to_target {
                    let value = engine.read_value(source, session)?;
                    if let Some(index) = slot {
                        obj.write().fields[*index] = value;
                    }
                }
            }
            None => {
                for index in 0..self.descriptor.fields.len() {
                    let value = engine.read_value(source, session)?;
                    obj.write().fields[index] = value;
                }
            }
        }
        Ok(Value::Object(obj))
    }
}

/// Wraps an object codec for a type registered in the known-types table,
/// replacing its manifest with the compact table index.
pub struct KnownTypeObjectSerializer {
    index: u16,
    inner: Arc<dyn ValueSerializer>,
}

impl KnownTypeObjectSerializer {
    pub fn new(index: u16, inner: Arc<dyn ValueSerializer>) -> Self {
        Self { index, inner }
    }
}

impl ValueSerializer for KnownTypeObjectSerializer {
    fn write_manifest(
        &self,
        sink: &mut dyn Write,
        _session: &mut SerializationSession,
    ) -> WireResult<()> {
        manifest::write_u8(sink, manifest::KNOWN_TYPE_INDEX)?;
        manifest::write_u16(sink, self.index)
    }

    fn write_value(
        &self,
        sink: &mut dyn Write,
        value: &Value,
        session: &mut SerializationSession,
        engine: &Serializer,
    ) -> WireResult<()> {
        self.inner.write_value(sink, value, session, engine)
    }

    fn read_value(
        &self,
        source: &mut dyn Read,
        session: &mut DeserializationSession,
        engine: &Serializer,
    ) -> WireResult<Value> {
        self.inner.read_value(source, session, engine)
    }
}

/// Sentinel codec published when building a real codec failed. Remembers
/// the captured error text and fails identically on every use.
pub struct UnsupportedTypeSerializer {
    type_name: Arc<str>,
    message: String,
}

impl UnsupportedTypeSerializer {
    pub fn new(type_name: Arc<str>, message: String) -> Self {
        Self { type_name, message }
    }

    fn error(&self) -> WireError {
        WireError::UnsupportedType {
            type_name: self.type_name.to_string(),
            reason: self.message.clone(),
        }
    }
}

impl ValueSerializer for UnsupportedTypeSerializer {
    fn write_manifest(
        &self,
        _sink: &mut dyn Write,
        _session: &mut SerializationSession,
    ) -> WireResult<()> {
        Err(self.error())
    }

    fn write_value(
        &self,
        _sink: &mut dyn Write,
        _value: &Value,
        _session: &mut SerializationSession,
        _engine: &Serializer,
    ) -> WireResult<()> {
        Err(self.error())
    }

    fn read_value(
        &self,
        _source: &mut dyn Read,
        _session: &mut DeserializationSession,
        _engine: &Serializer,
    ) -> WireResult<Value> {
        Err(self.error())
    }
}
