// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-call mutable session state.
//!
//! Exactly one session exists per in-flight serialize or deserialize call.
//! Sessions hold the identity tables for cycle/redundancy handling, the
//! types learned mid-stream (so repeats within one call use a compact
//! per-call index), the version-info map active under version tolerance,
//! and a scratch buffer that grows by doubling and never shrinks for the
//! call's duration. No internal locking: a session is owned and mutated by
//! a single logical call.

use crate::descriptor::{FieldDescriptor, TypeDescriptor};
use crate::value::ObjRef;
use std::collections::HashMap;
use std::sync::Arc;

const SCRATCH_MIN: usize = 64;

fn grow_scratch(scratch: &mut Vec<u8>, len: usize) -> &mut [u8] {
    if scratch.len() < len {
        let mut cap = scratch.len().max(SCRATCH_MIN);
        while cap < len {
            cap *= 2;
        }
        scratch.resize(cap, 0);
    }
    &mut scratch[..len]
}

/// Write-side session: object identity tracking plus the types written
/// inline during this call.
#[derive(Default)]
pub struct SerializationSession {
    /// Object pointer -> assigned id (reference preservation).
    object_ids: HashMap<usize, u32>,
    /// Objects currently being written (fail-fast cycle detection when
    /// reference preservation is off).
    in_progress: Vec<usize>,
    /// Type name -> per-call index for types already manifested in full.
    learned: HashMap<Arc<str>, u16>,
    scratch: Vec<u8>,
}

impl SerializationSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(obj: &ObjRef) -> usize {
        Arc::as_ptr(obj) as usize
    }

    /// Id previously assigned to this object, if any.
    pub fn reference_of(&self, obj: &ObjRef) -> Option<u32> {
        self.object_ids.get(&Self::key(obj)).copied()
    }

    /// Assign the next id to this object. Ids are handed out in pre-order
    /// write order, which the reader mirrors.
    pub fn track(&mut self, obj: &ObjRef) -> u32 {
        let id = self.object_ids.len() as u32;
        self.object_ids.insert(Self::key(obj), id);
        id
    }

    /// Mark an object as being written. Returns false if it is already on
    /// the write stack, i.e. a cycle.
    pub fn enter(&mut self, obj: &ObjRef) -> bool {
        let key = Self::key(obj);
        if self.in_progress.contains(&key) {
            return false;
        }
        self.in_progress.push(key);
        true
    }

    pub fn leave(&mut self, obj: &ObjRef) {
        let key = Self::key(obj);
        if let Some(pos) = self.in_progress.iter().rposition(|k| *k == key) {
            self.in_progress.remove(pos);
        }
    }

    /// Per-call index of a type already written in full this stream.
    pub fn learned_index(&self, name: &str) -> Option<u16> {
        self.learned.get(name).copied()
    }

    /// Record that this type's manifest has been written in full.
    pub fn learn(&mut self, name: Arc<str>) -> u16 {
        let idx = self.learned.len() as u16;
        self.learned.insert(name, idx);
        idx
    }

    /// Reusable scratch slice of exactly `len` bytes.
    pub fn scratch(&mut self, len: usize) -> &mut [u8] {
        grow_scratch(&mut self.scratch, len)
    }
}

/// Field mapping resolved once per stream type under version tolerance.
#[derive(Debug)]
pub struct VersionMap {
    /// Field table as the stream declared it.
    pub stream_fields: Vec<FieldDescriptor>,
    /// For each incoming field, the matching index in the local descriptor
    /// (None: unknown to the local type, value is read and dropped).
    pub to_target: Vec<Option<usize>>,
}

impl VersionMap {
    /// Match incoming fields to the target descriptor by name.
    pub fn resolve(stream_fields: Vec<FieldDescriptor>, target: &TypeDescriptor) -> Self {
        let to_target = stream_fields
            .iter()
            .map(|f| target.field_index(&f.name))
            .collect();
        Self {
            stream_fields,
            to_target,
        }
    }
}

/// Read-side session: positional object and type tables plus version info.
#[derive(Default)]
pub struct DeserializationSession {
    /// Already-constructed objects, positional by id.
    objects: Vec<ObjRef>,
    /// Types learned mid-stream, positional by session index.
    learned: Vec<Arc<TypeDescriptor>>,
    /// Type name -> resolved field mapping (version tolerance only).
    version_maps: HashMap<Arc<str>, Arc<VersionMap>>,
    scratch: Vec<u8>,
}

impl DeserializationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly constructed object and return its id. Called
    /// before its fields are read so back-references inside them resolve.
    pub fn register_object(&mut self, obj: ObjRef) -> u32 {
        let id = self.objects.len() as u32;
        self.objects.push(obj);
        id
    }

    pub fn object(&self, id: u32) -> Option<&ObjRef> {
        self.objects.get(id as usize)
    }

    pub fn objects_read(&self) -> usize {
        self.objects.len()
    }

    pub fn learn(&mut self, descriptor: Arc<TypeDescriptor>) -> u16 {
        let idx = self.learned.len() as u16;
        self.learned.push(descriptor);
        idx
    }

    pub fn learned(&self, index: u16) -> Option<&Arc<TypeDescriptor>> {
        self.learned.get(index as usize)
    }

    pub fn learned_count(&self) -> usize {
        self.learned.len()
    }

    pub fn set_version_map(&mut self, name: Arc<str>, map: Arc<VersionMap>) {
        self.version_maps.insert(name, map);
    }

    pub fn version_map(&self, name: &str) -> Option<Arc<VersionMap>> {
        self.version_maps.get(name).cloned()
    }

    /// Reusable scratch slice of exactly `len` bytes.
    pub fn scratch(&mut self, len: usize) -> &mut [u8] {
        grow_scratch(&mut self.scratch, len)
    }
}
