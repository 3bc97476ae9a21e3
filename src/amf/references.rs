//! Per-operation reference tables
//!
//! Encoders map a key (object identity, string contents, trait shape) to the
//! index it was first written at. Decoders keep the values in the order their
//! literals were read. Both sides are created empty for each top-level
//! `write_object`/`read_object` call and dropped at its end.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{AmfError, RefTable, Result};

use super::value::AmfValue;

/// Outcome of looking a key up while encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    /// Already written at this index; emit a reference
    Existing(usize),
    /// Newly assigned this index; emit the literal
    New(usize),
}

/// Encoder side: key to first index
#[derive(Debug)]
pub(crate) struct EncodeTable<K> {
    indices: HashMap<K, usize>,
    next: usize,
}

impl<K: Hash + Eq> EncodeTable<K> {
    pub(crate) fn new() -> Self {
        Self {
            indices: HashMap::new(),
            next: 0,
        }
    }

    /// Look `key` up, assigning the next index if it is new
    pub(crate) fn find_or_insert<Q>(&mut self, key: &Q) -> Slot
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        if let Some(&index) = self.indices.get(key) {
            return Slot::Existing(index);
        }
        let index = self.reserve();
        self.indices.insert(key.to_owned(), index);
        Slot::New(index)
    }

    /// Consume an index for a value that can never be referenced again
    pub(crate) fn reserve(&mut self) -> usize {
        let index = self.next;
        self.next += 1;
        index
    }
}

/// Encoder side object table, keyed by handle identity
///
/// Every handle that receives an index is kept alive until the table is
/// dropped, so a freed allocation cannot hand its address to a new value
/// within the same call.
#[derive(Debug)]
pub(crate) struct ObjectTable {
    indices: EncodeTable<usize>,
    handles: Vec<AmfValue>,
}

impl ObjectTable {
    pub(crate) fn new() -> Self {
        Self {
            indices: EncodeTable::new(),
            handles: Vec::new(),
        }
    }

    /// Look `value` up by identity, assigning the next index if it is new
    ///
    /// Kinds without identity always get a fresh index.
    pub(crate) fn find_or_insert(&mut self, value: &AmfValue) -> Slot {
        let Some(identity) = value.identity() else {
            return Slot::New(self.indices.reserve());
        };
        let slot = self.indices.find_or_insert(&identity);
        if let Slot::New(_) = slot {
            self.handles.push(value.clone());
        }
        slot
    }

    pub(crate) fn reserve(&mut self) -> usize {
        self.indices.reserve()
    }
}

/// Decoder side: values by index
#[derive(Debug)]
pub(crate) struct DecodeTable<T> {
    kind: RefTable,
    entries: Vec<T>,
}

impl<T> DecodeTable<T> {
    pub(crate) fn new(kind: RefTable) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, value: T) -> usize {
        self.entries.push(value);
        self.entries.len() - 1
    }

    pub(crate) fn get(&self, index: usize) -> Result<&T> {
        self.entries.get(index).ok_or(AmfError::UnresolvedReference {
            table: self.kind,
            index,
        })
    }
}
