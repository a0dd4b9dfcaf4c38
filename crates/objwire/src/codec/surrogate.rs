// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Surrogate mapping: serialize a type indirectly through a stand-in.

use super::ValueSerializer;
use crate::error::{WireError, WireResult};
use crate::session::{DeserializationSession, SerializationSession};
use crate::value::Value;
use crate::Serializer;
use std::io::{Read, Write};
use std::sync::Arc;

/// Pure conversion between a value and its stand-in representation.
pub type SurrogateFn = Box<dyn Fn(&Value) -> WireResult<Value> + Send + Sync>;

/// A bidirectional mapping between a source type and a stand-in type.
///
/// Registered at configuration time, immutable, shared by the engine. On
/// write the source value is mapped to the stand-in and the stand-in's
/// codec takes over; on read the stand-in is decoded first and then mapped
/// back.
pub struct Surrogate {
    source_name: Arc<str>,
    target_name: Arc<str>,
    to_surrogate: SurrogateFn,
    from_surrogate: SurrogateFn,
}

impl Surrogate {
    pub fn new(
        source_name: impl Into<Arc<str>>,
        target_name: impl Into<Arc<str>>,
        to_surrogate: SurrogateFn,
        from_surrogate: SurrogateFn,
    ) -> Arc<Self> {
        Arc::new(Self {
            source_name: source_name.into(),
            target_name: target_name.into(),
            to_surrogate,
            from_surrogate,
        })
    }

    pub fn source_name(&self) -> &Arc<str> {
        &self.source_name
    }

    pub fn target_name(&self) -> &Arc<str> {
        &self.target_name
    }
}

/// Codec backed by a surrogate mapping.
///
/// The manifest is written by the stand-in value's own codec, so
/// `write_manifest` emits nothing. `inner` is the stand-in's object codec,
/// present only when this instance was built for the read path (resolving
/// the stand-in's descriptor from the stream manifest).
pub struct SurrogateSerializer {
    surrogate: Arc<Surrogate>,
    inner: Option<Arc<dyn ValueSerializer>>,
}

impl SurrogateSerializer {
    pub fn new(surrogate: Arc<Surrogate>, inner: Option<Arc<dyn ValueSerializer>>) -> Self {
        Self { surrogate, inner }
    }
}

impl ValueSerializer for SurrogateSerializer {
    fn write_manifest(
        &self,
        _sink: &mut dyn Write,
        _session: &mut SerializationSession,
    ) -> WireResult<()> {
        Ok(())
    }

    fn write_value(
        &self,
        sink: &mut dyn Write,
        value: &Value,
        session: &mut SerializationSession,
        engine: &Serializer,
    ) -> WireResult<()> {
        let mapped = (self.surrogate.to_surrogate)(value)?;
        engine.write_value(&mapped, sink, session)
    }

    fn read_value(
        &self,
        source: &mut dyn Read,
        session: &mut DeserializationSession,
        engine: &Serializer,
    ) -> WireResult<Value> {
        let inner = self
            .inner
            .as_ref()
            .ok_or_else(|| WireError::ProtocolViolation {
                reason: format!(
                    "surrogate for {} has no stand-in codec on the read path",
                    self.surrogate.source_name
                ),
            })?;
        let stand_in = inner.read_value(source, session, engine)?;
        (self.surrogate.from_surrogate)(&stand_in)
    }

    /// Every write re-maps the source value into a fresh stand-in, so
    /// object identity does not survive this codec.
    fn preserves_identity(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surrogate_names() {
        let surrogate = Surrogate::new(
            "SecretHolder",
            "SecretEnvelope",
            Box::new(|v| Ok(v.clone())),
            Box::new(|v| Ok(v.clone())),
        );
        assert_eq!(&**surrogate.source_name(), "SecretHolder");
        assert_eq!(&**surrogate.target_name(), "SecretEnvelope");
    }

    #[test]
    fn test_write_manifest_is_empty() {
        let surrogate = Surrogate::new(
            "S",
            "T",
            Box::new(|v| Ok(v.clone())),
            Box::new(|v| Ok(v.clone())),
        );
        let codec = SurrogateSerializer::new(surrogate, None);
        let mut buf = Vec::new();
        let mut session = SerializationSession::new();
        codec
            .write_manifest(&mut buf, &mut session)
            .expect("write manifest");
        assert!(buf.is_empty());
        assert!(!codec.preserves_identity());
    }
}
