//! # avldup
//!
//! An in-memory AVL tree index where one key may carry many values.
//!
//! Keys and values are [`Thing`]s of a type fixed when the index is created
//! (32/64-bit integers, 32/64-bit floats or strings). Entries are ordered by
//! key and then by value, so all values of a key sit next to each other and
//! come out of a range scan in ascending order.
//!
//! - [`DupTree`] is the single-threaded tree, mutated through `&mut self`.
//! - [`DupIndex`] wraps a tree for sharing between threads. Readers run
//!   concurrently up to a configurable limit, writers run alone, and
//!   [`DupIndex::destroy`] turns every later or waiting caller away.
//!
//! ## Example
//!
//! ```rust
//! use std::ops::ControlFlow;
//! use avldup::{DupIndex, Endpoint, Thing, TypeCode};
//!
//! let index = DupIndex::create(TypeCode::String, TypeCode::Int32, Some("tags"), 0);
//! index.add(&Thing::from("rust"), &Thing::Int32(2)).unwrap();
//! index.add(&Thing::from("rust"), &Thing::Int32(1)).unwrap();
//! index.add(&Thing::from("avl"), &Thing::Int32(7)).unwrap();
//! assert_eq!(index.count(), 3);
//!
//! let key = Thing::from("rust");
//! let mut values = Vec::new();
//! index
//!     .iterate(Some(Endpoint::included(&key)), Some(Endpoint::included(&key)), |_, v| {
//!         values.push(v.as_i32().unwrap());
//!         ControlFlow::Continue(())
//!     })
//!     .unwrap();
//! assert_eq!(values, vec![1, 2]);
//!
//! index.destroy();
//! assert!(index.add(&key, &Thing::Int32(3)).is_err());
//! ```

#![forbid(unsafe_code)]

pub mod compare;
pub mod error;
mod gate;
pub mod thing;
pub mod tree;

#[cfg(test)]
mod proptests;

pub use compare::Comparator;
pub use error::{Error, Result};
pub use thing::{copy_things, min_text_capacity, release_things, Thing, ThingString, TypeCode};
pub use tree::{DupTree, Endpoint, Traversal};

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use gate::ReaderGate;

/// Reader limit used by [`Config::default`]. Large enough to never bind in
/// practice.
pub const DEFAULT_MAX_READERS: usize = 1_000_000_000;

/// Configuration for a [`DupIndex`] or [`DupTree`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Type of every key.
    pub key_type: TypeCode,
    /// Type of every value.
    pub value_type: TypeCode,
    /// Optional label, reported in logs and dumps.
    pub name: Option<String>,
    /// Most readers allowed inside the index at once. Zero means no limit.
    pub max_readers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_type: TypeCode::Int32,
            value_type: TypeCode::Int32,
            name: None,
            max_readers: DEFAULT_MAX_READERS,
        }
    }
}

/// A [`DupTree`] that can be shared between threads.
///
/// Every operation takes `&self`. Lookups and iteration take a reader slot
/// and the read lock; `add` and `delete` take the write lock. Once
/// [`destroy`](Self::destroy) has been called every operation fails with
/// [`Error::AccessDenied`].
///
/// An [`iterate`](Self::iterate) callback runs while read access is held
/// and must not call back into the same index.
pub struct DupIndex {
    /// `None` once destroyed.
    inner: RwLock<Option<DupTree>>,
    gate: ReaderGate,
    /// Mirrors the tree's entry count.
    len: AtomicUsize,
    name: Option<Box<str>>,
    key_type: TypeCode,
    value_type: TypeCode,
    max_readers: usize,
}

impl DupIndex {
    /// Create an empty index. `max_readers` caps concurrent readers, zero
    /// meaning no cap.
    pub fn create(
        key_type: TypeCode,
        value_type: TypeCode,
        name: Option<&str>,
        max_readers: usize,
    ) -> Self {
        tracing::debug!(name, %key_type, %value_type, max_readers, "creating index");
        Self {
            inner: RwLock::new(Some(DupTree::new(key_type, value_type, name))),
            gate: ReaderGate::new(max_readers),
            len: AtomicUsize::new(0),
            name: name.map(Box::from),
            key_type,
            value_type,
            max_readers,
        }
    }

    /// Like [`create`](Self::create) but with raw four-character type codes
    /// such as `'LONG'` or `'CSTR'`.
    pub fn create_raw(
        key_type: u32,
        value_type: u32,
        name: Option<&str>,
        max_readers: usize,
    ) -> Result<Self> {
        let key_type = TypeCode::try_from(key_type)?;
        let value_type = TypeCode::try_from(value_type)?;
        Ok(Self::create(key_type, value_type, name, max_readers))
    }

    pub fn with_config(config: Config) -> Self {
        Self::create(
            config.key_type,
            config.value_type,
            config.name.as_deref(),
            config.max_readers,
        )
    }

    /// Release every entry and refuse all further access.
    ///
    /// Readers waiting for a slot are woken and fail, as does any caller still
    /// queued on the lock. Callers already inside the index finish first.
    /// Calling this again has no effect.
    pub fn destroy(&self) {
        if !self.gate.close() {
            return;
        }
        let tree = self.inner.write().take();
        self.len.store(0, Ordering::Release);
        tracing::debug!(
            name = self.name(),
            count = tree.as_ref().map_or(0, DupTree::len),
            "destroyed index"
        );
        drop(tree);
    }

    pub fn is_destroyed(&self) -> bool {
        self.gate.is_closed()
    }

    /// Number of entries. Does not block.
    #[inline]
    pub fn count(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn key_type(&self) -> TypeCode {
        self.key_type
    }

    pub fn value_type(&self) -> TypeCode {
        self.value_type
    }

    pub fn max_readers(&self) -> usize {
        self.max_readers
    }

    /// See [`DupTree::add`]. Any `Ok` is success; the flag only says whether
    /// the entry is new, so re-adding an existing pair gives `Ok(false)`.
    pub fn add(&self, key: &Thing, value: &Thing) -> Result<bool> {
        self.write(|tree| tree.add(key, value))
    }

    /// See [`DupTree::delete`]. `Ok(false)` means no such entry.
    pub fn delete(&self, key: &Thing, value: &Thing) -> Result<bool> {
        self.write(|tree| tree.delete(key, value))
    }

    /// See [`DupTree::iterate`]. The callback runs with read access held.
    pub fn iterate<F>(
        &self,
        low: Option<Endpoint<'_>>,
        high: Option<Endpoint<'_>>,
        callback: F,
    ) -> Result<Traversal>
    where
        F: FnMut(&Thing, &Thing) -> ControlFlow<()>,
    {
        self.read(|tree| tree.iterate(low, high, callback))
    }

    pub fn contains(&self, key: &Thing, value: &Thing) -> Result<bool> {
        self.read(|tree| tree.contains(key, value))
    }

    pub fn values_for_key(&self, key: &Thing) -> Result<Vec<Thing>> {
        self.read(|tree| tree.values_for_key(key))
    }

    pub fn count_values_for_key(&self, key: &Thing) -> Result<usize> {
        self.read(|tree| tree.count_values_for_key(key))
    }

    /// Copy of the smallest entry.
    pub fn first(&self) -> Result<Option<(Thing, Thing)>> {
        self.read(|tree| copy_entry(tree.first()))
    }

    /// Copy of the largest entry.
    pub fn last(&self) -> Result<Option<(Thing, Thing)>> {
        self.read(|tree| copy_entry(tree.last()))
    }

    pub fn next_larger_key(&self, key: &Thing) -> Result<Option<Thing>> {
        self.read(|tree| tree.next_larger_key(key)?.map(Thing::try_clone).transpose())
    }

    pub fn next_smaller_key(&self, key: &Thing) -> Result<Option<Thing>> {
        self.read(|tree| tree.next_smaller_key(key)?.map(Thing::try_clone).transpose())
    }

    pub fn keys_in_range(&self, low: &Thing, high: &Thing) -> Result<Vec<Thing>> {
        self.read(|tree| tree.keys_in_range(low, high))
    }

    pub fn height(&self) -> Result<u32> {
        self.read(|tree| Ok(tree.height()))
    }

    pub fn verify_integrity(&self) -> Result<Vec<String>> {
        self.read(|tree| Ok(tree.verify_integrity()))
    }

    pub fn debug_dump(&self) -> Result<String> {
        self.read(|tree| Ok(tree.debug_dump()))
    }

    fn read<T>(&self, op: impl FnOnce(&DupTree) -> Result<T>) -> Result<T> {
        let _slot = match self.gate.enter() {
            Ok(slot) => slot,
            Err(err) => {
                self.refused("read");
                return Err(err);
            }
        };
        let guard = self.inner.read();
        // A reader queued on the lock when the gate closed must not proceed.
        match guard.as_ref().filter(|_| !self.gate.is_closed()) {
            Some(tree) => op(tree),
            None => {
                self.refused("read");
                Err(Error::AccessDenied)
            }
        }
    }

    fn write<T>(&self, op: impl FnOnce(&mut DupTree) -> Result<T>) -> Result<T> {
        if let Err(err) = self.gate.check_open() {
            self.refused("write");
            return Err(err);
        }
        let mut guard = self.inner.write();
        // Likewise for a writer that was queued behind a reader.
        let Some(tree) = guard.as_mut().filter(|_| !self.gate.is_closed()) else {
            self.refused("write");
            return Err(Error::AccessDenied);
        };
        let result = op(tree);
        self.len.store(tree.len(), Ordering::Release);
        result
    }

    fn refused(&self, access: &str) {
        tracing::warn!(name = self.name(), access, "index destroyed, access refused");
    }
}

impl Default for DupIndex {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl std::fmt::Debug for DupIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DupIndex")
            .field("name", &self.name())
            .field("key_type", &self.key_type)
            .field("value_type", &self.value_type)
            .field("count", &self.count())
            .field("max_readers", &self.max_readers)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

fn copy_entry(entry: Option<(&Thing, &Thing)>) -> Result<Option<(Thing, Thing)>> {
    entry
        .map(|(key, value)| Ok((key.try_clone()?, value.try_clone()?)))
        .transpose()
}
