// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for runtime type information.
//!
//! A [`TypeDescriptor`] is the runtime identity of an object type. It is used
//! as the lookup key for the engine's codec caches and is never written to
//! the wire as a value itself, only inside manifests (as a name, an index,
//! or a name plus field table under version tolerance).

use crate::manifest;
use crate::value::Value;
use std::sync::Arc;

/// Shape discriminant for every [`Value`] variant.
///
/// Supplies the direct manifest code for primitives, the wire tag used in
/// version-manifest field tables, and the per-kind default value applied by
/// the version-tolerance rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
    Bytes,
    Timestamp,
    Uuid,
    Type,
    List,
    Map,
    Object,
}

impl ValueKind {
    /// Direct manifest code for the primitive fast path. Composite shapes
    /// (lists, maps, objects) have no direct code.
    pub fn manifest_code(self) -> Option<u8> {
        match self {
            Self::Null => Some(manifest::NULL),
            Self::Bool => Some(manifest::BOOL),
            Self::I8 => Some(manifest::I8),
            Self::I16 => Some(manifest::I16),
            Self::I32 => Some(manifest::I32),
            Self::I64 => Some(manifest::I64),
            Self::U8 => Some(manifest::U8),
            Self::U16 => Some(manifest::U16),
            Self::U32 => Some(manifest::U32),
            Self::U64 => Some(manifest::U64),
            Self::F32 => Some(manifest::F32),
            Self::F64 => Some(manifest::F64),
            Self::Char => Some(manifest::CHAR),
            Self::String => Some(manifest::STRING),
            Self::Bytes => Some(manifest::BYTES),
            Self::Timestamp => Some(manifest::TIMESTAMP),
            Self::Uuid => Some(manifest::UUID),
            Self::Type => Some(manifest::TYPE_VALUE),
            Self::List | Self::Map | Self::Object => None,
        }
    }

    /// Tag byte used in version-manifest field tables. Primitives reuse
    /// their direct code; composite shapes reuse their composite code.
    pub fn wire_tag(self) -> u8 {
        match self {
            Self::List => manifest::LIST,
            Self::Map => manifest::MAP,
            Self::Object => manifest::FULL_MANIFEST,
            other => other
                .manifest_code()
                .unwrap_or(manifest::NULL),
        }
    }

    /// Inverse of [`wire_tag`](Self::wire_tag).
    pub fn from_wire_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            manifest::NULL => Self::Null,
            manifest::BOOL => Self::Bool,
            manifest::I8 => Self::I8,
            manifest::I16 => Self::I16,
            manifest::I32 => Self::I32,
            manifest::I64 => Self::I64,
            manifest::U8 => Self::U8,
            manifest::U16 => Self::U16,
            manifest::U32 => Self::U32,
            manifest::U64 => Self::U64,
            manifest::F32 => Self::F32,
            manifest::F64 => Self::F64,
            manifest::CHAR => Self::Char,
            manifest::STRING => Self::String,
            manifest::BYTES => Self::Bytes,
            manifest::TIMESTAMP => Self::Timestamp,
            manifest::UUID => Self::Uuid,
            manifest::TYPE_VALUE => Self::Type,
            manifest::LIST => Self::List,
            manifest::MAP => Self::Map,
            manifest::FULL_MANIFEST => Self::Object,
            _ => return None,
        })
    }

    /// Default value a field of this kind receives when the incoming stream
    /// does not carry it (version tolerance).
    pub fn default_value(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::I8 => Value::I8(0),
            Self::I16 => Value::I16(0),
            Self::I32 => Value::I32(0),
            Self::I64 => Value::I64(0),
            Self::U8 => Value::U8(0),
            Self::U16 => Value::U16(0),
            Self::U32 => Value::U32(0),
            Self::U64 => Value::U64(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
            Self::Char => Value::Char('\0'),
            Self::String => Value::String(String::new()),
            Self::Bytes => Value::Bytes(Vec::new()),
            Self::Timestamp => Value::Timestamp(0),
            Self::Uuid => Value::Uuid([0u8; 16]),
            Self::List => Value::List(Vec::new()),
            Self::Map => Value::Map(Vec::new()),
            Self::Null | Self::Type | Self::Object => Value::Null,
        }
    }
}

/// Field descriptor for object members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name (version tolerance matches by this).
    pub name: String,
    /// Field shape.
    pub kind: ValueKind,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A complete type descriptor: name plus ordered serializable members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Fully qualified type name.
    pub name: Arc<str>,
    /// Ordered field list. Wire payloads are positional in this order.
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<Arc<str>>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Get field index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Fluent builder for descriptors assembled at runtime.
pub struct TypeDescriptorBuilder {
    name: Arc<str>,
    fields: Vec<FieldDescriptor>,
}

impl TypeDescriptorBuilder {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.fields.push(FieldDescriptor::new(name, kind));
        self
    }

    pub fn build(self) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor {
            name: self.name,
            fields: self.fields,
        })
    }
}
