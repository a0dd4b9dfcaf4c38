// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec contract and built-in codec implementations.

pub mod collection;
pub mod object;
pub mod primitive;
pub mod surrogate;

use crate::error::{WireError, WireResult};
use crate::session::{DeserializationSession, SerializationSession};
use crate::value::Value;
use crate::Serializer;
use std::io::{Read, Write};

/// The capability set every codec implements.
///
/// A codec instance is immutable after construction and shared read-only
/// through the engine's caches for the lifetime of the process.
pub trait ValueSerializer: Send + Sync {
    /// Write the manifest byte(s) announcing this codec's encoding.
    fn write_manifest(
        &self,
        sink: &mut dyn Write,
        session: &mut SerializationSession,
    ) -> WireResult<()>;

    /// Write the value payload (no manifest).
    fn write_value(
        &self,
        sink: &mut dyn Write,
        value: &Value,
        session: &mut SerializationSession,
        engine: &Serializer,
    ) -> WireResult<()>;

    /// Read one value payload (manifest already consumed).
    fn read_value(
        &self,
        source: &mut dyn Read,
        session: &mut DeserializationSession,
        engine: &Serializer,
    ) -> WireResult<Value>;

    /// Whether values written through this codec keep their object identity
    /// on the wire. Surrogate codecs re-map values on every write, so the
    /// engine must not record reference ids for them.
    fn preserves_identity(&self) -> bool {
        true
    }
}

/// Read a length-prefixed UTF-8 string through the session scratch buffer.
pub(crate) fn read_str(
    source: &mut dyn Read,
    session: &mut DeserializationSession,
) -> WireResult<String> {
    let len = crate::manifest::read_u32(source)? as usize;
    let buf = session.scratch(len);
    source.read_exact(buf)?;
    Ok(String::from_utf8(buf.to_vec())?)
}

pub(crate) fn mismatch(expected: &str, value: &Value) -> WireError {
    WireError::TypeMismatch {
        expected: expected.to_string(),
        found: format!("{:?}", value.kind()),
    }
}
