// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime value graph.
//!
//! A [`Value`] is the serializer's view of an arbitrary object graph:
//! primitives, collections, maps and typed objects. Typed Rust structs enter
//! and leave this representation through the [`Reflect`](crate::Reflect)
//! boundary.
//!
//! Objects are held behind [`ObjRef`] (`Arc` + `RwLock`) so that graphs with
//! shared nodes or cycles can be built by callers and reconstructed by the
//! reader: allocate the node, register it, then fill its fields. `Arc`
//! pointer identity is what reference preservation tracks.

use crate::descriptor::{TypeDescriptor, ValueKind};
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, mutable handle to an object node.
pub type ObjRef = Arc<RwLock<ObjectValue>>;

/// A typed object: descriptor plus positional field values.
#[derive(Debug, Clone)]
pub struct ObjectValue {
    /// Runtime type of the object.
    pub descriptor: Arc<TypeDescriptor>,
    /// Field values, positional per `descriptor.fields`.
    pub fields: Vec<Value>,
}

impl ObjectValue {
    /// Create an object with every field defaulted per its kind.
    pub fn with_defaults(descriptor: &Arc<TypeDescriptor>) -> Self {
        let fields = descriptor
            .fields
            .iter()
            .map(|f| f.kind.default_value())
            .collect();
        Self {
            descriptor: descriptor.clone(),
            fields,
        }
    }

    /// Get a field value by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        let idx = self.descriptor.field_index(name)?;
        self.fields.get(idx)
    }

    /// Set a field value by name. Returns false if the descriptor has no
    /// such field.
    pub fn set_field(&mut self, name: &str, value: Value) -> bool {
        match self.descriptor.field_index(name) {
            Some(idx) if idx < self.fields.len() => {
                self.fields[idx] = value;
                true
            }
            _ => false,
        }
    }
}

/// A dynamic value covering every shape the wire protocol can carry.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
    /// Nanoseconds since the Unix epoch.
    Timestamp(i64),
    Uuid([u8; 16]),
    /// A runtime type carried as a value.
    Type(Arc<TypeDescriptor>),
    List(Vec<Value>),
    /// Ordered key/value pairs. Kept as a pair list so keys are not
    /// restricted to hashable shapes.
    Map(Vec<(Value, Value)>),
    Object(ObjRef),
}

impl Value {
    /// Construct an object value from a descriptor and positional fields.
    pub fn object(descriptor: &Arc<TypeDescriptor>, fields: Vec<Value>) -> Self {
        Self::Object(Arc::new(RwLock::new(ObjectValue {
            descriptor: descriptor.clone(),
            fields,
        })))
    }

    /// Shape discriminant of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::I8(_) => ValueKind::I8,
            Self::I16(_) => ValueKind::I16,
            Self::I32(_) => ValueKind::I32,
            Self::I64(_) => ValueKind::I64,
            Self::U8(_) => ValueKind::U8,
            Self::U16(_) => ValueKind::U16,
            Self::U32(_) => ValueKind::U32,
            Self::U64(_) => ValueKind::U64,
            Self::F32(_) => ValueKind::F32,
            Self::F64(_) => ValueKind::F64,
            Self::Char(_) => ValueKind::Char,
            Self::String(_) => ValueKind::String,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::Uuid(_) => ValueKind::Uuid,
            Self::Type(_) => ValueKind::Type,
            Self::List(_) => ValueKind::List,
            Self::Map(_) => ValueKind::Map,
            Self::Object(_) => ValueKind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjRef> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Convenience accessor: object field by name.
    pub fn get_field(&self, name: &str) -> Option<Value> {
        match self {
            Self::Object(obj) => obj.read().field(name).cloned(),
            _ => None,
        }
    }
}

/// Deep structural equality.
///
/// Objects compare by descriptor and field values, taking read locks along
/// the way. Comparing cyclic graphs with this impl recurses forever; cyclic
/// tests compare node identity (`Arc::ptr_eq`) instead.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::U8(a), Self::U8(b)) => a == b,
            (Self::U16(a), Self::U16(b)) => a == b,
            (Self::U32(a), Self::U32(b)) => a == b,
            (Self::U64(a), Self::U64(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a == b,
            (Self::F64(a), Self::F64(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::Uuid(a), Self::Uuid(b)) => a == b,
            (Self::Type(a), Self::Type(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.read(), b.read());
                a.descriptor == b.descriptor && a.fields == b.fields
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::I8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::I16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Self::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Self::U16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Char(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptorBuilder;

    #[test]
    fn test_primitive_accessors() {
        let v = Value::from(42i32);
        assert_eq!(v.as_i32(), Some(42));
        assert_eq!(v.as_u32(), None);
        assert_eq!(v.kind(), ValueKind::I32);

        let v = Value::from("hello");
        assert_eq!(v.as_str(), Some("hello"));
    }

    #[test]
    fn test_object_field_access() {
        let desc = TypeDescriptorBuilder::new("Point")
            .field("x", ValueKind::I32)
            .field("y", ValueKind::I32)
            .build();
        let v = Value::object(&desc, vec![Value::I32(1), Value::I32(2)]);
        assert_eq!(v.get_field("x"), Some(Value::I32(1)));
        assert_eq!(v.get_field("z"), None);

        if let Value::Object(obj) = &v {
            assert!(obj.write().set_field("y", Value::I32(9)));
            assert!(!obj.write().set_field("z", Value::Null));
        }
        assert_eq!(v.get_field("y"), Some(Value::I32(9)));
    }

    #[test]
    fn test_object_deep_equality() {
        let desc = TypeDescriptorBuilder::new("Point")
            .field("x", ValueKind::I32)
            .build();
        let a = Value::object(&desc, vec![Value::I32(7)]);
        let b = Value::object(&desc, vec![Value::I32(7)]);
        let c = Value::object(&desc, vec![Value::I32(8)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_defaults_match_descriptor() {
        let desc = TypeDescriptorBuilder::new("Person")
            .field("name", ValueKind::String)
            .field("age", ValueKind::I32)
            .build();
        let obj = ObjectValue::with_defaults(&desc);
        assert_eq!(obj.fields[0], Value::String(String::new()));
        assert_eq!(obj.fields[1], Value::I32(0));
    }

    #[test]
    fn test_list_from_vec() {
        let v = Value::from(vec![1u32, 2, 3]);
        assert_eq!(v.as_list().map(<[Value]>::len), Some(3));
    }
}
