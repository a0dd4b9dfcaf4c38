// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in primitive codecs.
//!
//! One stateless codec per direct manifest code. The engine exposes them
//! through its 256-slot fast table so a direct code selects a codec with no
//! further lookup.

use super::{mismatch, read_str, ValueSerializer};
use crate::error::{WireError, WireResult};
use crate::manifest;
use crate::session::{DeserializationSession, SerializationSession};
use crate::value::Value;
use crate::Serializer;
use std::io::{Read, Write};

/// Generate a codec for a fixed-width numeric variant (eliminates code
/// duplication across the ten integer/float shapes).
macro_rules! numeric_serializer {
    ($name:ident, $variant:ident, $ty:ty, $code:expr, $expected:expr) => {
        pub struct $name;

        impl ValueSerializer for $name {
            fn write_manifest(
                &self,
                sink: &mut dyn Write,
                _session: &mut SerializationSession,
            ) -> WireResult<()> {
                manifest::write_u8(sink, $code)
            }

            fn write_value(
                &self,
                sink: &mut dyn Write,
                value: &Value,
                _session: &mut SerializationSession,
                _engine: &Serializer,
            ) -> WireResult<()> {
                match value {
                    Value::$variant(v) => {
                        sink.write_all(&v.to_le_bytes())?;
                        Ok(())
                    }
                    other => Err(mismatch($expected, other)),
                }
            }

            fn read_value(
                &self,
                source: &mut dyn Read,
                _session: &mut DeserializationSession,
                _engine: &Serializer,
            ) -> WireResult<Value> {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                source.read_exact(&mut buf)?;
                Ok(Value::$variant(<$ty>::from_le_bytes(buf)))
            }
        }
    };
}

numeric_serializer!(I8Serializer, I8, i8, manifest::I8, "i8");
numeric_serializer!(I16Serializer, I16, i16, manifest::I16, "i16");
numeric_serializer!(I32Serializer, I32, i32, manifest::I32, "i32");
numeric_serializer!(I64Serializer, I64, i64, manifest::I64, "i64");
numeric_serializer!(U8Serializer, U8, u8, manifest::U8, "u8");
numeric_serializer!(U16Serializer, U16, u16, manifest::U16, "u16");
numeric_serializer!(U32Serializer, U32, u32, manifest::U32, "u32");
numeric_serializer!(U64Serializer, U64, u64, manifest::U64, "u64");
numeric_serializer!(F32Serializer, F32, f32, manifest::F32, "f32");
numeric_serializer!(F64Serializer, F64, f64, manifest::F64, "f64");

/// Null carries no payload; the manifest byte is the whole encoding.
pub struct NullSerializer;

impl ValueSerializer for NullSerializer {
    fn write_manifest(
        &self,
        sink: &mut dyn Write,
        _session: &mut SerializationSession,
    ) -> WireResult<()> {
        manifest::write_u8(sink, manifest::NULL)
    }

    fn write_value(
        &self,
        _sink: &mut dyn Write,
        value: &Value,
        _session: &mut SerializationSession,
        _engine: &Serializer,
    ) -> WireResult<()> {
        match value {
            Value::Null => Ok(()),
            other => Err(mismatch("null", other)),
        }
    }

    fn read_value(
        &self,
        _source: &mut dyn Read,
        _session: &mut DeserializationSession,
        _engine: &Serializer,
    ) -> WireResult<Value> {
        Ok(Value::Null)
    }
}

pub struct BoolSerializer;

impl ValueSerializer for BoolSerializer {
    fn write_manifest(
        &self,
        sink: &mut dyn Write,
        _session: &mut SerializationSession,
    ) -> WireResult<()> {
        manifest::write_u8(sink, manifest::BOOL)
    }

    fn write_value(
        &self,
        sink: &mut dyn Write,
        value: &Value,
        _session: &mut SerializationSession,
        _engine: &Serializer,
    ) -> WireResult<()> {
        match value {
            Value::Bool(v) => manifest::write_u8(sink, u8::from(*v)),
            other => Err(mismatch("bool", other)),
        }
    }

    fn read_value(
        &self,
        source: &mut dyn Read,
        _session: &mut DeserializationSession,
        _engine: &Serializer,
    ) -> WireResult<Value> {
        Ok(Value::Bool(manifest::read_u8(source)? != 0))
    }
}

/// Chars travel as their u32 code point.
pub struct CharSerializer;

impl ValueSerializer for CharSerializer {
    fn write_manifest(
        &self,
        sink: &mut dyn Write,
        _session: &mut SerializationSession,
    ) -> WireResult<()> {
        manifest::write_u8(sink, manifest::CHAR)
    }

    fn write_value(
        &self,
        sink: &mut dyn Write,
        value: &Value,
        _session: &mut SerializationSession,
        _engine: &Serializer,
    ) -> WireResult<()> {
        match value {
            Value::Char(v) => manifest::write_u32(sink, *v as u32),
            other => Err(mismatch("char", other)),
        }
    }

    fn read_value(
        &self,
        source: &mut dyn Read,
        _session: &mut DeserializationSession,
        _engine: &Serializer,
    ) -> WireResult<Value> {
        let raw = manifest::read_u32(source)?;
        char::from_u32(raw)
            .map(Value::Char)
            .ok_or(WireError::ProtocolViolation {
                reason: format!("invalid char code point 0x{:X}", raw),
            })
    }
}

pub struct StringSerializer;

impl ValueSerializer for StringSerializer {
    fn write_manifest(
        &self,
        sink: &mut dyn Write,
        _session: &mut SerializationSession,
    ) -> WireResult<()> {
        manifest::write_u8(sink, manifest::STRING)
    }

    fn write_value(
        &self,
        sink: &mut dyn Write,
        value: &Value,
        _session: &mut SerializationSession,
        _engine: &Serializer,
    ) -> WireResult<()> {
        match value {
            Value::String(v) => manifest::write_str(sink, v),
            other => Err(mismatch("string", other)),
        }
    }

    fn read_value(
        &self,
        source: &mut dyn Read,
        session: &mut DeserializationSession,
        _engine: &Serializer,
    ) -> WireResult<Value> {
        Ok(Value::String(read_str(source, session)?))
    }
}

pub struct BytesSerializer;

impl ValueSerializer for BytesSerializer {
    fn write_manifest(
        &self,
        sink: &mut dyn Write,
        _session: &mut SerializationSession,
    ) -> WireResult<()> {
        manifest::write_u8(sink, manifest::BYTES)
    }

    fn write_value(
        &self,
        sink: &mut dyn Write,
        value: &Value,
        _session: &mut SerializationSession,
        _engine: &Serializer,
    ) -> WireResult<()> {
        match value {
            Value::Bytes(v) => {
                let len = u32::try_from(v.len()).map_err(|_| WireError::ProtocolViolation {
                    reason: "byte array longer than u32::MAX".into(),
                })?;
                manifest::write_u32(sink, len)?;
                sink.write_all(v)?;
                Ok(())
            }
            other => Err(mismatch("bytes", other)),
        }
    }

    fn read_value(
        &self,
        source: &mut dyn Read,
        session: &mut DeserializationSession,
        _engine: &Serializer,
    ) -> WireResult<Value> {
        let len = manifest::read_u32(source)? as usize;
        let buf = session.scratch(len);
        source.read_exact(buf)?;
        Ok(Value::Bytes(buf.to_vec()))
    }
}

/// Timestamps travel as i64 nanoseconds since the Unix epoch.
pub struct TimestampSerializer;

impl ValueSerializer for TimestampSerializer {
    fn write_manifest(
        &self,
        sink: &mut dyn Write,
        _session: &mut SerializationSession,
    ) -> WireResult<()> {
        manifest::write_u8(sink, manifest::TIMESTAMP)
    }

    fn write_value(
        &self,
        sink: &mut dyn Write,
        value: &Value,
        _session: &mut SerializationSession,
        _engine: &Serializer,
    ) -> WireResult<()> {
        match value {
            Value::Timestamp(v) => {
                sink.write_all(&v.to_le_bytes())?;
                Ok(())
            }
            other => Err(mismatch("timestamp", other)),
        }
    }

    fn read_value(
        &self,
        source: &mut dyn Read,
        _session: &mut DeserializationSession,
        _engine: &Serializer,
    ) -> WireResult<Value> {
        let mut buf = [0u8; 8];
        source.read_exact(&mut buf)?;
        Ok(Value::Timestamp(i64::from_le_bytes(buf)))
    }
}

pub struct UuidSerializer;

impl ValueSerializer for UuidSerializer {
    fn write_manifest(
        &self,
        sink: &mut dyn Write,
        _session: &mut SerializationSession,
    ) -> WireResult<()> {
        manifest::write_u8(sink, manifest::UUID)
    }

    fn write_value(
        &self,
        sink: &mut dyn Write,
        value: &Value,
        _session: &mut SerializationSession,
        _engine: &Serializer,
    ) -> WireResult<()> {
        match value {
            Value::Uuid(v) => {
                sink.write_all(v)?;
                Ok(())
            }
            other => Err(mismatch("uuid", other)),
        }
    }

    fn read_value(
        &self,
        source: &mut dyn Read,
        _session: &mut DeserializationSession,
        _engine: &Serializer,
    ) -> WireResult<Value> {
        let mut buf = [0u8; 16];
        source.read_exact(&mut buf)?;
        Ok(Value::Uuid(buf))
    }
}

/// A runtime type carried as a value: encoded as its name, resolved back
/// through the engine's descriptor registry on read.
pub struct TypeValueSerializer;

impl ValueSerializer for TypeValueSerializer {
    fn write_manifest(
        &self,
        sink: &mut dyn Write,
        _session: &mut SerializationSession,
    ) -> WireResult<()> {
        manifest::write_u8(sink, manifest::TYPE_VALUE)
    }

    fn write_value(
        &self,
        sink: &mut dyn Write,
        value: &Value,
        _session: &mut SerializationSession,
        _engine: &Serializer,
    ) -> WireResult<()> {
        match value {
            Value::Type(desc) => manifest::write_str(sink, &desc.name),
            other => Err(mismatch("type", other)),
        }
    }

    fn read_value(
        &self,
        source: &mut dyn Read,
        session: &mut DeserializationSession,
        engine: &Serializer,
    ) -> WireResult<Value> {
        let name = read_str(source, session)?;
        engine
            .descriptor_by_name(&name)
            .map(Value::Type)
            .ok_or(WireError::UnknownType { name })
    }
}

pub static NULL_SERIALIZER: NullSerializer = NullSerializer;
pub static BOOL_SERIALIZER: BoolSerializer = BoolSerializer;
pub static I8_SERIALIZER: I8Serializer = I8Serializer;
pub static I16_SERIALIZER: I16Serializer = I16Serializer;
pub static I32_SERIALIZER: I32Serializer = I32Serializer;
pub static I64_SERIALIZER: I64Serializer = I64Serializer;
pub static U8_SERIALIZER: U8Serializer = U8Serializer;
pub static U16_SERIALIZER: U16Serializer = U16Serializer;
pub static U32_SERIALIZER: U32Serializer = U32Serializer;
pub static U64_SERIALIZER: U64Serializer = U64Serializer;
pub static F32_SERIALIZER: F32Serializer = F32Serializer;
pub static F64_SERIALIZER: F64Serializer = F64Serializer;
pub static CHAR_SERIALIZER: CharSerializer = CharSerializer;
pub static STRING_SERIALIZER: StringSerializer = StringSerializer;
pub static BYTES_SERIALIZER: BytesSerializer = BytesSerializer;
pub static TIMESTAMP_SERIALIZER: TimestampSerializer = TimestampSerializer;
pub static UUID_SERIALIZER: UuidSerializer = UuidSerializer;
pub static TYPE_VALUE_SERIALIZER: TypeValueSerializer = TypeValueSerializer;

/// Build the fixed 256-slot manifest-byte dispatch table for the closed
/// primitive set.
pub(crate) fn direct_table() -> [Option<&'static dyn ValueSerializer>; 256] {
    let mut table: [Option<&'static dyn ValueSerializer>; 256] = [None; 256];
    table[manifest::NULL as usize] = Some(&NULL_SERIALIZER);
    table[manifest::BOOL as usize] = Some(&BOOL_SERIALIZER);
    table[manifest::I8 as usize] = Some(&I8_SERIALIZER);
    table[manifest::I16 as usize] = Some(&I16_SERIALIZER);
    table[manifest::I32 as usize] = Some(&I32_SERIALIZER);
    table[manifest::I64 as usize] = Some(&I64_SERIALIZER);
    table[manifest::U8 as usize] = Some(&U8_SERIALIZER);
    table[manifest::U16 as usize] = Some(&U16_SERIALIZER);
    table[manifest::U32 as usize] = Some(&U32_SERIALIZER);
    table[manifest::U64 as usize] = Some(&U64_SERIALIZER);
    table[manifest::F32 as usize] = Some(&F32_SERIALIZER);
    table[manifest::F64 as usize] = Some(&F64_SERIALIZER);
    table[manifest::CHAR as usize] = Some(&CHAR_SERIALIZER);
    table[manifest::STRING as usize] = Some(&STRING_SERIALIZER);
    table[manifest::BYTES as usize] = Some(&BYTES_SERIALIZER);
    table[manifest::TIMESTAMP as usize] = Some(&TIMESTAMP_SERIALIZER);
    table[manifest::UUID as usize] = Some(&UUID_SERIALIZER);
    table[manifest::TYPE_VALUE as usize] = Some(&TYPE_VALUE_SERIALIZER);
    table
}
