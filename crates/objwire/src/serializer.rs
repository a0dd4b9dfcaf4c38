// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The serializer engine.
//!
//! Built once and shared across arbitrarily many concurrent callers. Owns
//! the write- and read-path codec caches (kept separate because a type may
//! need a different codec identity per direction, e.g. known-type wrapping
//! only matters on write), the 256-slot fast table for direct manifest
//! codes, and the lazily filled known-type codec slots. Cache entries are
//! added with an insert-if-absent operation and never removed; concurrent
//! duplicate builds are benign, whichever published first wins and the
//! loser's work is discarded.

use crate::codec::collection::{
    homogeneous_code, CONSISTENT_LIST_SERIALIZER, LIST_SERIALIZER, MAP_SERIALIZER,
};
use crate::codec::object::{KnownTypeObjectSerializer, ObjectSerializer, UnsupportedTypeSerializer};
use crate::codec::{read_str, ValueSerializer};
use crate::descriptor::{FieldDescriptor, TypeDescriptor, ValueKind};
use crate::error::{WireError, WireResult};
use crate::factory::{build_fallback, SurrogateFactory, ValueSerializerFactory};
use crate::manifest;
use crate::options::SerializerOptions;
use crate::reflect::Reflect;
use crate::session::{DeserializationSession, SerializationSession, VersionMap};
use crate::value::{ObjRef, Value};
use dashmap::DashMap;
use std::io::{Read, Write};
use std::sync::{Arc, OnceLock};

/// Object-graph serializer engine. Build once, share everywhere; open one
/// session per call.
pub struct Serializer {
    options: SerializerOptions,
    factories: Vec<Arc<dyn ValueSerializerFactory>>,
    write_cache: DashMap<Arc<str>, Arc<dyn ValueSerializer>>,
    read_cache: DashMap<Arc<str>, Arc<dyn ValueSerializer>>,
    direct: [Option<&'static dyn ValueSerializer>; 256],
    known_write: Vec<OnceLock<Arc<dyn ValueSerializer>>>,
    known_read: Vec<OnceLock<Arc<dyn ValueSerializer>>>,
}

impl Serializer {
    pub fn new(options: SerializerOptions) -> Self {
        let mut factories: Vec<Arc<dyn ValueSerializerFactory>> =
            vec![Arc::new(SurrogateFactory::new(options.surrogates.clone()))];
        factories.extend(options.factories.iter().cloned());
        let known_len = options.known_types.len();
        Self {
            factories,
            write_cache: DashMap::new(),
            read_cache: DashMap::new(),
            direct: crate::codec::primitive::direct_table(),
            known_write: (0..known_len).map(|_| OnceLock::new()).collect(),
            known_read: (0..known_len).map(|_| OnceLock::new()).collect(),
            options,
        }
    }

    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    /// Descriptor for a type name, for full-manifest resolution.
    pub fn descriptor_by_name(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.options.descriptor_by_name(name)
    }

    // ---- Typed entry points --------------------------------------------

    pub fn serialize<T: Reflect>(&self, value: &T, sink: &mut dyn Write) -> WireResult<()> {
        self.serialize_value(&value.to_value(), sink)
    }

    pub fn serialize_with_session<T: Reflect>(
        &self,
        value: &T,
        sink: &mut dyn Write,
        session: &mut SerializationSession,
    ) -> WireResult<()> {
        self.write_value(&value.to_value(), sink, session)
    }

    pub fn deserialize<T: Reflect>(&self, source: &mut dyn Read) -> WireResult<T> {
        T::from_value(&self.deserialize_value(source)?)
    }

    pub fn deserialize_with_session<T: Reflect>(
        &self,
        source: &mut dyn Read,
        session: &mut DeserializationSession,
    ) -> WireResult<T> {
        T::from_value(&self.read_value(source, session)?)
    }

    // ---- Value entry points --------------------------------------------

    /// Serialize one value graph. A fresh session is created for the call.
    pub fn serialize_value(&self, value: &Value, sink: &mut dyn Write) -> WireResult<()> {
        let mut session = SerializationSession::new();
        self.write_value(value, sink, &mut session)
    }

    /// Deserialize one value graph. A fresh session is created for the call.
    pub fn deserialize_value(&self, source: &mut dyn Read) -> WireResult<Value> {
        let mut session = DeserializationSession::new();
        self.read_value(source, &mut session)
    }

    /// Write one value (manifest plus payload). This is the recursion point
    /// codecs call for nested values.
    pub fn write_value(
        &self,
        value: &Value,
        sink: &mut dyn Write,
        session: &mut SerializationSession,
    ) -> WireResult<()> {
        match value {
            Value::Object(obj) => self.write_object(value, obj, sink, session),
            Value::List(items) => {
                let codec: &'static dyn ValueSerializer = if homogeneous_code(items).is_some() {
                    &CONSISTENT_LIST_SERIALIZER
                } else {
                    &LIST_SERIALIZER
                };
                codec.write_manifest(sink, session)?;
                codec.write_value(sink, value, session, self)
            }
            Value::Map(_) => {
                MAP_SERIALIZER.write_manifest(sink, session)?;
                MAP_SERIALIZER.write_value(sink, value, session, self)
            }
            other => {
                let kind = other.kind();
                let code = kind
                    .manifest_code()
                    .ok_or_else(|| WireError::ProtocolViolation {
                        reason: format!("no direct manifest code for {:?}", kind),
                    })?;
                let codec = self
                    .direct_codec(code)
                    .ok_or(WireError::UnknownManifest { code })?;
                codec.write_manifest(sink, session)?;
                codec.write_value(sink, other, session, self)
            }
        }
    }

    /// Read one value (manifest plus payload). This is the recursion point
    /// codecs call for nested values.
    pub fn read_value(
        &self,
        source: &mut dyn Read,
        session: &mut DeserializationSession,
    ) -> WireResult<Value> {
        let code = manifest::read_u8(source)?;
        if let Some(codec) = self.direct_codec(code) {
            return codec.read_value(source, session, self);
        }
        match code {
            manifest::LIST => LIST_SERIALIZER.read_value(source, session, self),
            manifest::CONSISTENT_LIST => {
                CONSISTENT_LIST_SERIALIZER.read_value(source, session, self)
            }
            manifest::MAP => MAP_SERIALIZER.read_value(source, session, self),
            manifest::OBJECT_REF => {
                let id = manifest::read_u32(source)?;
                session
                    .object(id)
                    .cloned()
                    .map(Value::Object)
                    .ok_or(WireError::BackReferenceOutOfRange {
                        id,
                        len: session.objects_read(),
                    })
            }
            manifest::FULL_MANIFEST => {
                let name = read_str(source, session)?;
                let descriptor = self
                    .descriptor_by_name(&name)
                    .ok_or(WireError::UnknownType { name })?;
                session.learn(descriptor.clone());
                let codec = self.get_serializer_for_read(&descriptor)?;
                codec.read_value(source, session, self)
            }
            manifest::VERSION_MANIFEST => {
                let descriptor = self.read_version_manifest(source, session)?;
                session.learn(descriptor.clone());
                let codec = self.get_serializer_for_read(&descriptor)?;
                codec.read_value(source, session, self)
            }
            manifest::KNOWN_TYPE_INDEX => {
                let index = manifest::read_u16(source)?;
                let descriptor = self
                    .options
                    .known_types()
                    .get(index as usize)
                    .cloned()
                    .ok_or(WireError::KnownTypeIndexOutOfRange {
                        index: index as usize,
                        len: self.options.known_types().len(),
                    })?;
                let codec = self.known_codec_for_read(index, &descriptor)?;
                codec.read_value(source, session, self)
            }
            manifest::SESSION_TYPE_INDEX => {
                let index = manifest::read_u16(source)?;
                let descriptor = session.learned(index).cloned().ok_or(
                    WireError::SessionTypeIndexOutOfRange {
                        index: index as usize,
                        len: session.learned_count(),
                    },
                )?;
                let codec = self.get_serializer_for_read(&descriptor)?;
                codec.read_value(source, session, self)
            }
            other => Err(WireError::UnknownManifest { code: other }),
        }
    }

    // ---- Codec resolution ----------------------------------------------

    /// Resolve or build the write-path codec for a type.
    pub fn get_serializer_for_write(
        &self,
        descriptor: &Arc<TypeDescriptor>,
    ) -> WireResult<Arc<dyn ValueSerializer>> {
        if let Some(codec) = self.write_cache.get(&descriptor.name) {
            return Ok(codec.clone());
        }
        let codec = self.build_or_sentinel(descriptor, true);
        let entry = self.write_cache.entry(descriptor.name.clone()).or_insert(codec);
        Ok(entry.value().clone())
    }

    /// Resolve or build the read-path codec for a type.
    pub fn get_serializer_for_read(
        &self,
        descriptor: &Arc<TypeDescriptor>,
    ) -> WireResult<Arc<dyn ValueSerializer>> {
        if let Some(codec) = self.read_cache.get(&descriptor.name) {
            return Ok(codec.clone());
        }
        let codec = self.build_or_sentinel(descriptor, false);
        let entry = self.read_cache.entry(descriptor.name.clone()).or_insert(codec);
        Ok(entry.value().clone())
    }

    /// Build a codec through the factory chain, or capture the failure into
    /// a sentinel so every later attempt fails identically.
    fn build_or_sentinel(
        &self,
        descriptor: &Arc<TypeDescriptor>,
        for_write: bool,
    ) -> Arc<dyn ValueSerializer> {
        let built = if for_write {
            self.build_for_write(descriptor)
        } else {
            self.build_for_read(descriptor)
        };
        match built {
            Ok(codec) => {
                log::debug!("built codec for type {}", descriptor.name);
                codec
            }
            Err(err) => {
                let reason = match err {
                    WireError::UnsupportedType { reason, .. } => reason,
                    other => other.to_string(),
                };
                log::warn!(
                    "codec build failed for {}; publishing sentinel: {}",
                    descriptor.name,
                    reason
                );
                Arc::new(UnsupportedTypeSerializer::new(
                    descriptor.name.clone(),
                    reason,
                ))
            }
        }
    }

    fn build_for_write(
        &self,
        descriptor: &Arc<TypeDescriptor>,
    ) -> WireResult<Arc<dyn ValueSerializer>> {
        for factory in &self.factories {
            if factory.can_serialize(descriptor) {
                let codec = factory.build(self, descriptor)?;
                return Ok(self.wrap_known(descriptor, codec));
            }
        }
        let codec = build_fallback(
            descriptor,
            self.options.version_tolerance,
            self.options.preserve_object_references,
        )?;
        Ok(self.wrap_known(descriptor, codec))
    }

    fn build_for_read(
        &self,
        descriptor: &Arc<TypeDescriptor>,
    ) -> WireResult<Arc<dyn ValueSerializer>> {
        for factory in &self.factories {
            if factory.can_deserialize(descriptor) {
                return factory.build(self, descriptor);
            }
        }
        build_fallback(
            descriptor,
            self.options.version_tolerance,
            self.options.preserve_object_references,
        )
    }

    /// Wrap a known-type codec so it writes the compact index manifest.
    /// Identity-erasing codecs (surrogates) keep their own encoding.
    fn wrap_known(
        &self,
        descriptor: &Arc<TypeDescriptor>,
        codec: Arc<dyn ValueSerializer>,
    ) -> Arc<dyn ValueSerializer> {
        match self.options.known_index(&descriptor.name) {
            Some(index) if codec.preserves_identity() => {
                Arc::new(KnownTypeObjectSerializer::new(index, codec))
            }
            _ => codec,
        }
    }

    /// Plain object codec for a descriptor, bypassing the factory chain.
    /// Used by factories that delegate the stand-in's encoding.
    pub(crate) fn build_object_serializer(
        &self,
        descriptor: &Arc<TypeDescriptor>,
    ) -> WireResult<Arc<dyn ValueSerializer>> {
        Ok(Arc::new(ObjectSerializer::build(
            descriptor,
            self.options.version_tolerance,
            self.options.preserve_object_references,
        )?))
    }

    pub(crate) fn direct_codec(&self, code: u8) -> Option<&'static dyn ValueSerializer> {
        self.direct.get(code as usize).copied().flatten()
    }

    fn known_codec_for_write(
        &self,
        index: u16,
        descriptor: &Arc<TypeDescriptor>,
    ) -> WireResult<Arc<dyn ValueSerializer>> {
        if let Some(codec) = self.known_write[index as usize].get() {
            return Ok(codec.clone());
        }
        let codec = self.get_serializer_for_write(descriptor)?;
        // A racing call may have filled the slot; that copy is identical.
        let _ = self.known_write[index as usize].set(codec.clone());
        Ok(codec)
    }

    fn known_codec_for_read(
        &self,
        index: u16,
        descriptor: &Arc<TypeDescriptor>,
    ) -> WireResult<Arc<dyn ValueSerializer>> {
        if let Some(codec) = self.known_read[index as usize].get() {
            return Ok(codec.clone());
        }
        let codec = self.get_serializer_for_read(descriptor)?;
        let _ = self.known_read[index as usize].set(codec.clone());
        Ok(codec)
    }

    // ---- Object writing ------------------------------------------------

    fn write_object(
        &self,
        value: &Value,
        obj: &ObjRef,
        sink: &mut dyn Write,
        session: &mut SerializationSession,
    ) -> WireResult<()> {
        let descriptor = obj.read().descriptor.clone();
        let codec = match self.options.known_index(&descriptor.name) {
            Some(index) => self.known_codec_for_write(index, &descriptor)?,
            None => self.get_serializer_for_write(&descriptor)?,
        };
        if self.options.preserve_object_references && codec.preserves_identity() {
            if let Some(id) = session.reference_of(obj) {
                manifest::write_u8(sink, manifest::OBJECT_REF)?;
                return manifest::write_u32(sink, id);
            }
            // Ids are assigned in pre-order; the reader mirrors this when
            // it registers objects before reading their fields.
            session.track(obj);
            codec.write_manifest(sink, session)?;
            codec.write_value(sink, value, session, self)
        } else {
            if !session.enter(obj) {
                return Err(WireError::CycleDetected {
                    type_name: descriptor.name.to_string(),
                });
            }
            let result = codec
                .write_manifest(sink, session)
                .and_then(|()| codec.write_value(sink, value, session, self));
            session.leave(obj);
            result
        }
    }

    fn read_version_manifest(
        &self,
        source: &mut dyn Read,
        session: &mut DeserializationSession,
    ) -> WireResult<Arc<TypeDescriptor>> {
        let name = read_str(source, session)?;
        let count = manifest::read_u16(source)? as usize;
        let mut stream_fields = Vec::with_capacity(count);
        for _ in 0..count {
            let field_name = read_str(source, session)?;
            let tag = manifest::read_u8(source)?;
            let kind =
                ValueKind::from_wire_tag(tag).ok_or_else(|| WireError::ProtocolViolation {
                    reason: format!("invalid field kind tag 0x{:02X}", tag),
                })?;
            stream_fields.push(FieldDescriptor::new(field_name, kind));
        }
        // Evolution: re-map onto the locally registered descriptor when the
        // name is known; otherwise the stream's own field table is the type.
        let target = self
            .descriptor_by_name(&name)
            .unwrap_or_else(|| Arc::new(TypeDescriptor::new(name, stream_fields.clone())));
        let map = Arc::new(VersionMap::resolve(stream_fields, &target));
        session.set_version_map(target.name.clone(), map);
        Ok(target)
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new(SerializerOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptorBuilder;

    fn point_descriptor() -> Arc<TypeDescriptor> {
        TypeDescriptorBuilder::new("Point")
            .field("x", ValueKind::I32)
            .field("y", ValueKind::I32)
            .build()
    }

    #[test]
    fn test_codec_cache_returns_same_instance() {
        let engine = Serializer::default();
        let desc = point_descriptor();
        let first = engine.get_serializer_for_write(&desc).expect("first build");
        let second = engine.get_serializer_for_write(&desc).expect("cache hit");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_write_and_read_caches_are_independent() {
        let engine = Serializer::new(
            SerializerOptions::builder()
                .known_type(point_descriptor())
                .build(),
        );
        let desc = point_descriptor();
        let write = engine.get_serializer_for_write(&desc).expect("write codec");
        let read = engine.get_serializer_for_read(&desc).expect("read codec");
        // Write codec is known-type wrapped, read codec is not; they must
        // not alias.
        assert!(!Arc::ptr_eq(&write, &read));
    }

    #[test]
    fn test_sentinel_is_published_once_and_fails_identically() {
        let engine = Serializer::default();
        let memberless = TypeDescriptorBuilder::new("Opaque").build();
        let value = Value::object(&memberless, vec![]);

        let mut buf = Vec::new();
        let first = engine.serialize_value(&value, &mut buf).unwrap_err();
        let mut buf = Vec::new();
        let second = engine.serialize_value(&value, &mut buf).unwrap_err();
        assert_eq!(first.to_string(), second.to_string());
        assert_eq!(
            first.to_string(),
            "unsupported type Opaque: type exposes no serializable members"
        );
    }

    #[test]
    fn test_unknown_manifest_byte_is_fatal() {
        let engine = Serializer::default();
        let bytes = [0x77u8];
        let err = engine.deserialize_value(&mut bytes.as_slice()).unwrap_err();
        match err {
            WireError::UnknownManifest { code } => assert_eq!(code, 0x77),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_known_type_index_out_of_range_is_fatal() {
        let engine = Serializer::default();
        let mut bytes = Vec::new();
        manifest::write_u8(&mut bytes, manifest::KNOWN_TYPE_INDEX).expect("write code");
        manifest::write_u16(&mut bytes, 3).expect("write index");
        let err = engine.deserialize_value(&mut bytes.as_slice()).unwrap_err();
        match err {
            WireError::KnownTypeIndexOutOfRange { index, len } => {
                assert_eq!(index, 3);
                assert_eq!(len, 0);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_full_manifest_unknown_name_is_fatal() {
        let engine = Serializer::default();
        let mut bytes = Vec::new();
        manifest::write_u8(&mut bytes, manifest::FULL_MANIFEST).expect("write code");
        manifest::write_str(&mut bytes, "NeverHeardOfIt").expect("write name");
        let err = engine.deserialize_value(&mut bytes.as_slice()).unwrap_err();
        match err {
            WireError::UnknownType { name } => assert_eq!(name, "NeverHeardOfIt"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_concurrent_resolution_publishes_one_codec() {
        let engine = Arc::new(Serializer::default());
        let desc = point_descriptor();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = engine.clone();
            let desc = desc.clone();
            handles.push(std::thread::spawn(move || {
                engine
                    .get_serializer_for_write(&desc)
                    .expect("resolve codec")
            }));
        }
        let codecs: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread join"))
            .collect();
        // First publish wins; everyone observes the same instance.
        for codec in &codecs[1..] {
            assert!(Arc::ptr_eq(&codecs[0], codec));
        }
    }
}
