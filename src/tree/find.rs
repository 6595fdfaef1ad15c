//! Point lookups built on the composite order.

use std::cmp::Ordering;
use std::ops::ControlFlow;

use super::node::Node;
use super::{DupTree, Endpoint};
use crate::error::{Error, Result};
use crate::thing::Thing;

impl DupTree {
    /// Whether the exact (key, value) entry is present.
    pub fn contains(&self, key: &Thing, value: &Thing) -> Result<bool> {
        self.check_entry(key, value)?;
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match self.schema.compare(key, value, node) {
                Ordering::Equal => return Ok(true),
                Ordering::Less => node.smaller.as_deref(),
                Ordering::Greater => node.larger.as_deref(),
            };
        }
        Ok(false)
    }

    /// Copies of every value stored under `key`, ascending.
    pub fn values_for_key(&self, key: &Thing) -> Result<Vec<Thing>> {
        let mut values = Vec::new();
        let mut failure = None;
        self.iterate(
            Some(Endpoint::included(key)),
            Some(Endpoint::included(key)),
            |_, value| {
                if let Err(e) = values.try_reserve(1).map_err(|_| Error::OutOfMemory) {
                    failure = Some(e);
                    return ControlFlow::Break(());
                }
                match value.try_clone() {
                    Ok(v) => {
                        values.push(v);
                        ControlFlow::Continue(())
                    }
                    Err(e) => {
                        failure = Some(e);
                        ControlFlow::Break(())
                    }
                }
            },
        )?;
        match failure {
            Some(e) => Err(e),
            None => Ok(values),
        }
    }

    /// Number of values stored under `key`.
    pub fn count_values_for_key(&self, key: &Thing) -> Result<usize> {
        let mut n = 0;
        self.iterate(
            Some(Endpoint::included(key)),
            Some(Endpoint::included(key)),
            |_, _| {
                n += 1;
                ControlFlow::Continue(())
            },
        )?;
        Ok(n)
    }

    /// The smallest entry.
    pub fn first(&self) -> Option<(&Thing, &Thing)> {
        let mut node = self.root.as_deref()?;
        while let Some(smaller) = node.smaller.as_deref() {
            node = smaller;
        }
        Some((&node.key, &node.value))
    }

    /// The largest entry.
    pub fn last(&self) -> Option<(&Thing, &Thing)> {
        let mut node = self.root.as_deref()?;
        while let Some(larger) = node.larger.as_deref() {
            node = larger;
        }
        Some((&node.key, &node.value))
    }

    /// The smallest stored key strictly greater than `key`. `key` itself
    /// need not be present.
    pub fn next_larger_key(&self, key: &Thing) -> Result<Option<&Thing>> {
        key.expect_type(self.key_type)?;
        Ok(self.neighbour_key(key, Ordering::Less))
    }

    /// The largest stored key strictly smaller than `key`.
    pub fn next_smaller_key(&self, key: &Thing) -> Result<Option<&Thing>> {
        key.expect_type(self.key_type)?;
        Ok(self.neighbour_key(key, Ordering::Greater))
    }

    /// Walk towards `key`, remembering the last node that lies on the
    /// `toward` side. `Less` finds the successor key, `Greater` the
    /// predecessor. Runs of duplicates are skipped because only the key is
    /// compared.
    fn neighbour_key(&self, key: &Thing, toward: Ordering) -> Option<&Thing> {
        let mut best: Option<&Node> = None;
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            if self.schema.key.compare(key, &node.key) == toward {
                best = Some(node);
                cursor = match toward {
                    Ordering::Less => node.smaller.as_deref(),
                    _ => node.larger.as_deref(),
                };
            } else {
                cursor = match toward {
                    Ordering::Less => node.larger.as_deref(),
                    _ => node.smaller.as_deref(),
                };
            }
        }
        best.map(|n| &n.key)
    }

    /// Copies of the distinct keys between `low` and `high`, both inclusive.
    pub fn keys_in_range(&self, low: &Thing, high: &Thing) -> Result<Vec<Thing>> {
        let mut keys: Vec<Thing> = Vec::new();
        let mut failure = None;
        self.iterate(
            Some(Endpoint::included(low)),
            Some(Endpoint::included(high)),
            |key, _| {
                if keys
                    .last()
                    .is_some_and(|last| self.schema.key.compare(last, key) == Ordering::Equal)
                {
                    return ControlFlow::Continue(());
                }
                let copy = keys
                    .try_reserve(1)
                    .map_err(|_| Error::OutOfMemory)
                    .and_then(|()| key.try_clone());
                match copy {
                    Ok(k) => {
                        keys.push(k);
                        ControlFlow::Continue(())
                    }
                    Err(e) => {
                        failure = Some(e);
                        ControlFlow::Break(())
                    }
                }
            },
        )?;
        match failure {
            Some(e) => Err(e),
            None => Ok(keys),
        }
    }
}
