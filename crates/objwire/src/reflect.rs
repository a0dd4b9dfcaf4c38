// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compile-time field enumeration boundary.
//!
//! Rust has no runtime reflection, so typed structs cross into the engine's
//! [`Value`] world through [`Reflect`]: a descriptor built exactly once per
//! type plus value conversions in both directions. `#[derive(Reflect)]`
//! (from `objwire-codegen`) generates the impl from a struct's named
//! fields, playing the role of the per-type generated accessors.

use crate::descriptor::{TypeDescriptor, ValueKind};
use crate::error::WireResult;
use crate::value::Value;
use std::sync::Arc;

/// A type the serializer can move in and out of the [`Value`] graph.
pub trait Reflect: Sized {
    /// The type's descriptor. Built on first use, cached for the process
    /// lifetime.
    fn descriptor() -> &'static Arc<TypeDescriptor>;

    /// Convert to the runtime value graph.
    fn to_value(&self) -> Value;

    /// Reconstruct from the runtime value graph.
    fn from_value(value: &Value) -> WireResult<Self>;
}

/// Per-field conversion used by generated `Reflect` impls.
///
/// Implemented for the scalar shapes; `#[derive(Reflect)]` emits an impl
/// for each derived struct so structs nest, and handles `Vec` fields
/// inline.
pub trait WireField: Sized {
    fn kind() -> ValueKind;
    fn to_field(&self) -> Value;
    /// None when the value's shape does not match this field type.
    fn from_field(value: &Value) -> Option<Self>;
}

macro_rules! scalar_wire_field {
    ($ty:ty, $variant:ident, $kind:expr) => {
        impl WireField for $ty {
            fn kind() -> ValueKind {
                $kind
            }

            fn to_field(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_field(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

scalar_wire_field!(bool, Bool, ValueKind::Bool);
scalar_wire_field!(i8, I8, ValueKind::I8);
scalar_wire_field!(i16, I16, ValueKind::I16);
scalar_wire_field!(i32, I32, ValueKind::I32);
scalar_wire_field!(i64, I64, ValueKind::I64);
scalar_wire_field!(u8, U8, ValueKind::U8);
scalar_wire_field!(u16, U16, ValueKind::U16);
scalar_wire_field!(u32, U32, ValueKind::U32);
scalar_wire_field!(u64, U64, ValueKind::U64);
scalar_wire_field!(f32, F32, ValueKind::F32);
scalar_wire_field!(f64, F64, ValueKind::F64);
scalar_wire_field!(char, Char, ValueKind::Char);
scalar_wire_field!(String, String, ValueKind::String);

impl<T: WireField> WireField for Option<T> {
    fn kind() -> ValueKind {
        T::kind()
    }

    fn to_field(&self) -> Value {
        match self {
            Some(v) => v.to_field(),
            None => Value::Null,
        }
    }

    fn from_field(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_field(other).map(Some),
        }
    }
}
