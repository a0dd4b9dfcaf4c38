// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Engine configuration.
//!
//! Built once via [`SerializerOptionsBuilder`], immutable afterwards. The
//! known-types list is positional: the position of a type is the compact
//! index written to the wire, so writer and reader must register the same
//! list in the same order.

use crate::codec::surrogate::Surrogate;
use crate::descriptor::TypeDescriptor;
use crate::factory::ValueSerializerFactory;
use crate::reflect::Reflect;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable configuration for a [`Serializer`](crate::Serializer).
pub struct SerializerOptions {
    pub(crate) version_tolerance: bool,
    pub(crate) preserve_object_references: bool,
    pub(crate) surrogates: Vec<Arc<Surrogate>>,
    pub(crate) factories: Vec<Arc<dyn ValueSerializerFactory>>,
    pub(crate) known_types: Vec<Arc<TypeDescriptor>>,
    known_index: HashMap<Arc<str>, u16>,
    registry: HashMap<Arc<str>, Arc<TypeDescriptor>>,
}

impl SerializerOptions {
    pub fn builder() -> SerializerOptionsBuilder {
        SerializerOptionsBuilder::new()
    }

    pub fn version_tolerance(&self) -> bool {
        self.version_tolerance
    }

    pub fn preserve_object_references(&self) -> bool {
        self.preserve_object_references
    }

    pub fn known_types(&self) -> &[Arc<TypeDescriptor>] {
        &self.known_types
    }

    /// Compact wire index for a known type name.
    pub fn known_index(&self, name: &str) -> Option<u16> {
        self.known_index.get(name).copied()
    }

    /// Descriptor for a type name seen in a full manifest, from known types
    /// and explicitly registered types.
    pub fn descriptor_by_name(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.registry.get(name).cloned()
    }
}

impl Default for SerializerOptions {
    fn default() -> Self {
        SerializerOptionsBuilder::new().build()
    }
}

/// Fluent builder for [`SerializerOptions`].
#[derive(Default)]
pub struct SerializerOptionsBuilder {
    version_tolerance: bool,
    preserve_object_references: bool,
    surrogates: Vec<Arc<Surrogate>>,
    factories: Vec<Arc<dyn ValueSerializerFactory>>,
    known_types: Vec<Arc<TypeDescriptor>>,
    registered: Vec<Arc<TypeDescriptor>>,
}

impl SerializerOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable schema-evolution tolerance: object manifests carry the field
    /// table and readers match incoming fields by name.
    pub fn version_tolerance(mut self, enabled: bool) -> Self {
        self.version_tolerance = enabled;
        self
    }

    /// Enable object-identity tracking so shared nodes and cycles
    /// round-trip as references.
    pub fn preserve_object_references(mut self, enabled: bool) -> Self {
        self.preserve_object_references = enabled;
        self
    }

    pub fn surrogate(mut self, surrogate: Arc<Surrogate>) -> Self {
        self.surrogates.push(surrogate);
        self
    }

    /// Append a user factory. User factories run after the built-in
    /// surrogate factory and before the generic object fallback.
    pub fn factory(mut self, factory: Arc<dyn ValueSerializerFactory>) -> Self {
        self.factories.push(factory);
        self
    }

    /// Register a known type. Its position in registration order is the
    /// compact index written on the wire.
    pub fn known_type(mut self, descriptor: Arc<TypeDescriptor>) -> Self {
        self.known_types.push(descriptor);
        self
    }

    /// Register a `Reflect` type as a known type.
    pub fn known_reflect<T: Reflect>(self) -> Self {
        self.known_type(T::descriptor().clone())
    }

    /// Make a type resolvable by name when it arrives in a full manifest,
    /// without assigning it a compact index.
    pub fn register(mut self, descriptor: Arc<TypeDescriptor>) -> Self {
        self.registered.push(descriptor);
        self
    }

    /// Register a `Reflect` type for by-name resolution.
    pub fn register_reflect<T: Reflect>(self) -> Self {
        self.register(T::descriptor().clone())
    }

    pub fn build(self) -> SerializerOptions {
        let mut known_index = HashMap::new();
        let mut registry = HashMap::new();
        for (position, descriptor) in self.known_types.iter().enumerate() {
            known_index.insert(descriptor.name.clone(), position as u16);
            registry.insert(descriptor.name.clone(), descriptor.clone());
        }
        for descriptor in &self.registered {
            registry.insert(descriptor.name.clone(), descriptor.clone());
        }
        SerializerOptions {
            version_tolerance: self.version_tolerance,
            preserve_object_references: self.preserve_object_references,
            surrogates: self.surrogates,
            factories: self.factories,
            known_types: self.known_types,
            known_index,
            registry,
        }
    }
}
