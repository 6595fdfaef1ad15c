//! Single-threaded AVL tree with composite (key, value) ordering.
//!
//! Entries are ordered by key first and by value when keys tie, so a key
//! with many values is simply a run of neighbouring nodes. No secondary
//! structure is needed to hold the duplicates.
//!
//! [`DupTree`] takes `&mut self` for mutation and relies on the borrow
//! checker for exclusivity. Wrap it in a [`DupIndex`](crate::DupIndex) to
//! share it between threads.

mod debug;
mod delete;
mod find;
mod insert;
mod iterate;
mod node;

pub use iterate::{Endpoint, Traversal};

use std::fmt;

use crate::compare::Comparator;
use crate::error::Result;
use crate::thing::{Thing, TypeCode};
use crate::Config;

use node::{Link, Schema};

/// An AVL tree indexing key/value pairs where one key may map to many
/// distinct values.
pub struct DupTree {
    root: Link,
    count: usize,
    key_type: TypeCode,
    value_type: TypeCode,
    schema: Schema,
    name: Option<Box<str>>,
}

impl DupTree {
    /// Create an empty tree. The key and value types are fixed for the
    /// lifetime of the tree.
    pub fn new(key_type: TypeCode, value_type: TypeCode, name: Option<&str>) -> Self {
        Self {
            root: None,
            count: 0,
            key_type,
            value_type,
            schema: Schema {
                key: Comparator::for_type(key_type),
                value: Comparator::for_type(value_type),
            },
            name: name.map(Box::from),
        }
    }

    pub fn with_config(config: &Config) -> Self {
        Self::new(config.key_type, config.value_type, config.name.as_deref())
    }

    /// Number of distinct (key, value) entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
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

    /// Height of the tree, 0 when empty.
    pub fn height(&self) -> u32 {
        node::height(&self.root)
    }

    /// Release every entry. Children are released before their parents.
    pub fn clear(&mut self) {
        if self.count > 0 {
            tracing::debug!(name = self.name(), count = self.count, "clearing tree");
        }
        self.root = None;
        self.count = 0;
    }

    fn check_entry(&self, key: &Thing, value: &Thing) -> Result<()> {
        key.expect_type(self.key_type)?;
        value.expect_type(self.value_type)
    }
}

impl fmt::Debug for DupTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DupTree")
            .field("name", &self.name())
            .field("key_type", &self.key_type)
            .field("value_type", &self.value_type)
            .field("len", &self.count)
            .field("height", &self.height())
            .finish()
    }
}
