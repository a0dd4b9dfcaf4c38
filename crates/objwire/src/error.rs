// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for wire serialization.
//!
//! Errors surface synchronously to the `serialize`/`deserialize` caller.
//! There are no internal retries; the only tolerated mismatch is the
//! version-tolerance defaulting rule, which is not an error at all.

use std::fmt;

/// Serialization/deserialization error.
#[derive(Debug)]
pub enum WireError {
    /// No codec could be built for the type. Captured once at build time;
    /// every later use of the type fails with the same message.
    UnsupportedType { type_name: String, reason: String },
    /// Manifest byte outside all recognized codes.
    UnknownManifest { code: u8 },
    /// Index manifest referenced a slot outside the known-types table.
    KnownTypeIndexOutOfRange { index: usize, len: usize },
    /// Session type index referenced a type not yet seen in this stream.
    SessionTypeIndexOutOfRange { index: usize, len: usize },
    /// Object back-reference id has no previously constructed object.
    BackReferenceOutOfRange { id: u32, len: usize },
    /// Stream/configuration mismatch not covered by a more specific variant.
    ProtocolViolation { reason: String },
    /// Cycle encountered while reference preservation is disabled.
    CycleDetected { type_name: String },
    /// A value did not match the shape its codec expects.
    TypeMismatch { expected: String, found: String },
    /// A full manifest named a type the reader has no descriptor for.
    UnknownType { name: String },
    /// A field conversion or accessor failed during read or write.
    FieldAccess {
        type_name: String,
        field: String,
        reason: String,
    },
    /// Underlying byte sink/source failure.
    Io(std::io::Error),
    /// String payload was not valid UTF-8.
    Utf8(std::string::FromUtf8Error),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType { type_name, reason } => {
                write!(f, "unsupported type {}: {}", type_name, reason)
            }
            Self::UnknownManifest { code } => {
                write!(f, "unknown manifest byte 0x{:02X}", code)
            }
            Self::KnownTypeIndexOutOfRange { index, len } => {
                write!(
                    f,
                    "known-type index {} out of range (table has {} entries)",
                    index, len
                )
            }
            Self::SessionTypeIndexOutOfRange { index, len } => {
                write!(
                    f,
                    "session type index {} out of range ({} types seen in stream)",
                    index, len
                )
            }
            Self::BackReferenceOutOfRange { id, len } => {
                write!(
                    f,
                    "object back-reference {} out of range ({} objects read)",
                    id, len
                )
            }
            Self::ProtocolViolation { reason } => write!(f, "protocol violation: {}", reason),
            Self::CycleDetected { type_name } => {
                write!(
                    f,
                    "cycle detected at type {} without reference tracking",
                    type_name
                )
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            Self::UnknownType { name } => write!(f, "unknown type: {}", name),
            Self::FieldAccess {
                type_name,
                field,
                reason,
            } => {
                write!(f, "field access failed for {}.{}: {}", type_name, field, reason)
            }
            Self::Io(e) => write!(f, "io error: {}", e),
            Self::Utf8(e) => write!(f, "invalid utf-8 string payload: {}", e),
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Utf8(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WireError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<std::string::FromUtf8Error> for WireError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Self::Utf8(e)
    }
}

pub type WireResult<T> = core::result::Result<T, WireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_variants() {
        let err = WireError::UnknownManifest { code: 0xAB };
        assert_eq!(format!("{}", err), "unknown manifest byte 0xAB");

        let err = WireError::KnownTypeIndexOutOfRange { index: 9, len: 2 };
        assert_eq!(
            format!("{}", err),
            "known-type index 9 out of range (table has 2 entries)"
        );

        let err = WireError::CycleDetected {
            type_name: "Node".into(),
        };
        assert_eq!(
            format!("{}", err),
            "cycle detected at type Node without reference tracking"
        );

        let err = WireError::UnsupportedType {
            type_name: "Opaque".into(),
            reason: "no serializable fields".into(),
        };
        assert_eq!(
            format!("{}", err),
            "unsupported type Opaque: no serializable fields"
        );
    }

    #[test]
    fn test_io_error_source() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err = WireError::from(io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
