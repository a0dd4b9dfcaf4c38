// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Predicate-gated codec factories.
//!
//! The engine resolves codecs for object types by walking an ordered chain
//! of strategies: the surrogate factory first (so surrogate-mapped types
//! never fall through to field enumeration), then user-supplied factories
//! in registration order, then the generic object fallback. First match
//! wins; the order is fixed at engine construction.

use crate::codec::object::ObjectSerializer;
use crate::codec::surrogate::{Surrogate, SurrogateSerializer};
use crate::codec::ValueSerializer;
use crate::descriptor::TypeDescriptor;
use crate::error::WireResult;
use crate::Serializer;
use std::sync::Arc;

/// A strategy that can recognize a type shape and build its codec.
pub trait ValueSerializerFactory: Send + Sync {
    /// Can this factory build a write-path codec for the type?
    fn can_serialize(&self, descriptor: &TypeDescriptor) -> bool;

    /// Can this factory build a read-path codec for the type?
    fn can_deserialize(&self, descriptor: &TypeDescriptor) -> bool;

    /// Build the codec. Only called after the matching predicate accepted
    /// the descriptor.
    fn build(
        &self,
        engine: &Serializer,
        descriptor: &Arc<TypeDescriptor>,
    ) -> WireResult<Arc<dyn ValueSerializer>>;
}

/// Built-in factory for surrogate-mapped types. Matches source names on the
/// write path and stand-in names on the read path.
pub(crate) struct SurrogateFactory {
    surrogates: Vec<Arc<Surrogate>>,
}

impl SurrogateFactory {
    pub(crate) fn new(surrogates: Vec<Arc<Surrogate>>) -> Self {
        Self { surrogates }
    }
}

impl ValueSerializerFactory for SurrogateFactory {
    fn can_serialize(&self, descriptor: &TypeDescriptor) -> bool {
        self.surrogates
            .iter()
            .any(|s| **s.source_name() == *descriptor.name)
    }

    fn can_deserialize(&self, descriptor: &TypeDescriptor) -> bool {
        self.surrogates
            .iter()
            .any(|s| **s.target_name() == *descriptor.name)
    }

    fn build(
        &self,
        engine: &Serializer,
        descriptor: &Arc<TypeDescriptor>,
    ) -> WireResult<Arc<dyn ValueSerializer>> {
        // Read path: the descriptor names the stand-in; decode it with a
        // plain object codec, then map back.
        if let Some(surrogate) = self
            .surrogates
            .iter()
            .find(|s| **s.target_name() == *descriptor.name)
        {
            let inner = engine.build_object_serializer(descriptor)?;
            return Ok(Arc::new(SurrogateSerializer::new(
                surrogate.clone(),
                Some(inner),
            )));
        }
        // Write path: the descriptor names the source; the stand-in's own
        // codec writes the manifest after mapping.
        let surrogate = self
            .surrogates
            .iter()
            .find(|s| **s.source_name() == *descriptor.name)
            .ok_or_else(|| crate::error::WireError::ProtocolViolation {
                reason: format!("no surrogate registered for type {}", descriptor.name),
            })?
            .clone();
        Ok(Arc::new(SurrogateSerializer::new(surrogate, None)))
    }
}

/// Fallback strategy: the generic field-based object codec.
pub(crate) fn build_fallback(
    descriptor: &Arc<TypeDescriptor>,
    version_tolerance: bool,
    preserve_refs: bool,
) -> WireResult<Arc<dyn ValueSerializer>> {
    Ok(Arc::new(ObjectSerializer::build(
        descriptor,
        version_tolerance,
        preserve_refs,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{TypeDescriptorBuilder, ValueKind};

    fn factory() -> SurrogateFactory {
        SurrogateFactory::new(vec![Surrogate::new(
            "Holder",
            "Envelope",
            Box::new(|v| Ok(v.clone())),
            Box::new(|v| Ok(v.clone())),
        )])
    }

    #[test]
    fn test_predicates_are_directional() {
        let factory = factory();
        let holder = TypeDescriptorBuilder::new("Holder")
            .field("x", ValueKind::I32)
            .build();
        let envelope = TypeDescriptorBuilder::new("Envelope")
            .field("x", ValueKind::I32)
            .build();
        let other = TypeDescriptorBuilder::new("Other")
            .field("x", ValueKind::I32)
            .build();

        assert!(factory.can_serialize(&holder));
        assert!(!factory.can_deserialize(&holder));
        assert!(factory.can_deserialize(&envelope));
        assert!(!factory.can_serialize(&envelope));
        assert!(!factory.can_serialize(&other));
        assert!(!factory.can_deserialize(&other));
    }
}
