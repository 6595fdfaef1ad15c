use std::cmp::Ordering;

use super::node::{rebalance, Link, Node, Schema};
use super::DupTree;
use crate::error::Result;
use crate::thing::Thing;

impl DupTree {
    /// Add a key/value pair.
    ///
    /// Returns `Ok(true)` if a new entry was created and `Ok(false)` if the
    /// exact pair was already present, in which case the tree is unchanged.
    /// Key and value are deep-copied; the caller keeps its originals.
    ///
    /// Fails with [`Error::TypeMismatch`](crate::Error::TypeMismatch) if
    /// either thing has the wrong type, or
    /// [`Error::OutOfMemory`](crate::Error::OutOfMemory) if copying fails.
    /// On failure the tree is left exactly as it was.
    pub fn add(&mut self, key: &Thing, value: &Thing) -> Result<bool> {
        self.check_entry(key, value)?;
        let added = insert(&self.schema, &mut self.root, key, value)?;
        if added {
            self.count += 1;
        }
        Ok(added)
    }
}

/// Descend to the insertion point, create the leaf there and rebalance every
/// ancestor on the way back up.
fn insert(schema: &Schema, slot: &mut Link, key: &Thing, value: &Thing) -> Result<bool> {
    let Some(node) = slot.as_mut() else {
        let key = key.try_clone()?;
        let value = value.try_clone()?;
        *slot = Some(Node::leaf(key, value));
        return Ok(true);
    };

    let added = match schema.compare(key, value, node) {
        Ordering::Equal => return Ok(false),
        Ordering::Less => insert(schema, &mut node.smaller, key, value)?,
        Ordering::Greater => insert(schema, &mut node.larger, key, value)?,
    };

    if added {
        rebalance(slot);
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thing::TypeCode;

    #[test]
    fn test_values_order_within_key() {
        let mut t = DupTree::new(TypeCode::String, TypeCode::Float64, None);
        for v in [3.5, -1.0, 2.25, 0.0] {
            assert!(t.add(&Thing::from("k"), &Thing::Float64(v)).unwrap());
        }
        let mut values = Vec::new();
        t.iterate(None, None, |_, v| {
            values.push(v.as_f64().unwrap());
            std::ops::ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(values, vec![-1.0, 0.0, 2.25, 3.5]);
    }

    #[test]
    fn test_negative_zero_is_the_same_value() {
        let mut t = DupTree::new(TypeCode::Int32, TypeCode::Float32, None);
        assert!(t.add(&Thing::Int32(1), &Thing::Float32(0.0)).unwrap());
        assert!(!t.add(&Thing::Int32(1), &Thing::Float32(-0.0)).unwrap());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_descending_inserts_rebalance() {
        let mut t = DupTree::new(TypeCode::Int64, TypeCode::Int64, None);
        for k in (0..7i64).rev() {
            t.add(&Thing::Int64(k), &Thing::Int64(k)).unwrap();
        }
        assert_eq!(t.height(), 3);
        assert!(t.verify_integrity().is_empty());
    }
}
