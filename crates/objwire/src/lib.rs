// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! objwire is a self-describing binary serializer for object graphs.
//!
//! Values travel as a manifest byte announcing the encoding, followed by
//! the payload. Object types carry their name (and, with version tolerance
//! enabled, their field table) in-band, so a reader needs no out-of-band
//! schema agreement beyond a registry of type descriptors. The engine is
//! built once from [`SerializerOptions`] and shared across threads; each
//! serialize or deserialize call opens its own session for back-reference
//! and learned-type bookkeeping.
//!
//! ```
//! use objwire::{Serializer, SerializerOptions, Value};
//!
//! let engine = Serializer::new(SerializerOptions::default());
//! let mut buf = Vec::new();
//! engine.serialize_value(&Value::I32(42), &mut buf).unwrap();
//! let back = engine.deserialize_value(&mut buf.as_slice()).unwrap();
//! assert_eq!(back, Value::I32(42));
//! ```

// Lets the derive macro expand to `objwire::` paths inside this crate.
extern crate self as objwire;

pub mod codec;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod manifest;
pub mod options;
pub mod reflect;
pub mod serializer;
pub mod session;
pub mod value;

pub use codec::surrogate::{Surrogate, SurrogateFn};
pub use codec::ValueSerializer;
pub use descriptor::{FieldDescriptor, TypeDescriptor, TypeDescriptorBuilder, ValueKind};
pub use error::{WireError, WireResult};
pub use factory::ValueSerializerFactory;
pub use options::{SerializerOptions, SerializerOptionsBuilder};
pub use reflect::{Reflect, WireField};
pub use serializer::Serializer;
pub use session::{DeserializationSession, SerializationSession, VersionMap};
pub use value::{ObjRef, ObjectValue, Value};

/// Derives [`Reflect`] for a named struct.
pub use objwire_codegen::Reflect;
