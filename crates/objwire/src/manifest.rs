// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Manifest byte codes and low-level wire helpers.
//!
//! Every encoded value begins with one manifest byte. Direct codes for the
//! closed primitive set occupy the bottom of the byte range and select a
//! codec through the engine's 256-slot fast table with no further lookup.
//! Composite codes are reserved at the top of the range and introduce a
//! payload the engine interprets itself (counts, indices, type names).
//!
//! All integers are little-endian. Strings are a u32 byte length followed
//! by UTF-8 bytes (no terminator). Counts are u32, table indices u16 and
//! object ids u32.

use crate::error::{WireError, WireResult};
use std::io::{Read, Write};

// Direct codes: one per built-in primitive codec.
pub const NULL: u8 = 0x00;
pub const BOOL: u8 = 0x01;
pub const I8: u8 = 0x02;
pub const I16: u8 = 0x03;
pub const I32: u8 = 0x04;
pub const I64: u8 = 0x05;
pub const U8: u8 = 0x06;
pub const U16: u8 = 0x07;
pub const U32: u8 = 0x08;
pub const U64: u8 = 0x09;
pub const F32: u8 = 0x0A;
pub const F64: u8 = 0x0B;
pub const CHAR: u8 = 0x0C;
pub const STRING: u8 = 0x0D;
pub const BYTES: u8 = 0x0E;
pub const TIMESTAMP: u8 = 0x0F;
pub const UUID: u8 = 0x10;
pub const TYPE_VALUE: u8 = 0x11;

// Composite codes, reserved at the top of the byte range.
pub const SESSION_TYPE_INDEX: u8 = 0xF8;
pub const LIST: u8 = 0xF9;
pub const CONSISTENT_LIST: u8 = 0xFA;
pub const MAP: u8 = 0xFB;
pub const OBJECT_REF: u8 = 0xFC;
pub const FULL_MANIFEST: u8 = 0xFD;
pub const VERSION_MANIFEST: u8 = 0xFE;
pub const KNOWN_TYPE_INDEX: u8 = 0xFF;

pub fn write_u8(sink: &mut dyn Write, value: u8) -> WireResult<()> {
    sink.write_all(&[value])?;
    Ok(())
}

pub fn write_u16(sink: &mut dyn Write, value: u16) -> WireResult<()> {
    sink.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_u32(sink: &mut dyn Write, value: u32) -> WireResult<()> {
    sink.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_u64(sink: &mut dyn Write, value: u64) -> WireResult<()> {
    sink.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Write a length-prefixed UTF-8 string.
pub fn write_str(sink: &mut dyn Write, value: &str) -> WireResult<()> {
    let bytes = value.as_bytes();
    let len = u32::try_from(bytes.len()).map_err(|_| WireError::ProtocolViolation {
        reason: "string longer than u32::MAX bytes".into(),
    })?;
    write_u32(sink, len)?;
    sink.write_all(bytes)?;
    Ok(())
}

pub fn read_u8(source: &mut dyn Read) -> WireResult<u8> {
    let mut buf = [0u8; 1];
    source.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_u16(source: &mut dyn Read) -> WireResult<u16> {
    let mut buf = [0u8; 2];
    source.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub fn read_u32(source: &mut dyn Read) -> WireResult<u32> {
    let mut buf = [0u8; 4];
    source.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub fn read_u64(source: &mut dyn Read) -> WireResult<u64> {
    let mut buf = [0u8; 8];
    source.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_and_composite_ranges_disjoint() {
        // Direct codes stay below the composite band.
        for code in [NULL, BOOL, I64, U64, F64, STRING, BYTES, UUID, TYPE_VALUE] {
            assert!(code < SESSION_TYPE_INDEX);
        }
        for code in [
            SESSION_TYPE_INDEX,
            LIST,
            CONSISTENT_LIST,
            MAP,
            OBJECT_REF,
            FULL_MANIFEST,
            VERSION_MANIFEST,
            KNOWN_TYPE_INDEX,
        ] {
            assert!(code >= 0xF8);
        }
    }

    #[test]
    fn test_scalar_roundtrip() {
        let mut buf = Vec::new();
        write_u8(&mut buf, 0xAB).expect("write u8");
        write_u16(&mut buf, 0xCDEF).expect("write u16");
        write_u32(&mut buf, 0x1234_5678).expect("write u32");
        write_u64(&mut buf, 0x1122_3344_5566_7788).expect("write u64");
        write_str(&mut buf, "wire").expect("write str");

        let mut cursor = buf.as_slice();
        assert_eq!(read_u8(&mut cursor).expect("read u8"), 0xAB);
        assert_eq!(read_u16(&mut cursor).expect("read u16"), 0xCDEF);
        assert_eq!(read_u32(&mut cursor).expect("read u32"), 0x1234_5678);
        assert_eq!(
            read_u64(&mut cursor).expect("read u64"),
            0x1122_3344_5566_7788
        );
        assert_eq!(read_u32(&mut cursor).expect("read len"), 4);
        assert_eq!(cursor, b"wire");
    }

    #[test]
    fn test_read_past_end_is_io_error() {
        let mut cursor: &[u8] = &[0x01];
        let err = read_u32(&mut cursor).unwrap_err();
        assert!(matches!(err, crate::error::WireError::Io(_)));
    }
}
