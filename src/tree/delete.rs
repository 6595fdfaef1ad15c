use std::cmp::Ordering;

use super::node::{rebalance, Link, Node, Schema};
use super::DupTree;
use crate::error::Result;
use crate::thing::Thing;

impl DupTree {
    /// Delete the entry matching both `key` and `value`.
    ///
    /// Both are needed because a key alone does not identify one entry.
    /// Returns `Ok(false)` if no such entry exists.
    pub fn delete(&mut self, key: &Thing, value: &Thing) -> Result<bool> {
        self.check_entry(key, value)?;
        let removed = remove(&self.schema, &mut self.root, key, value);
        if removed {
            self.count -= 1;
        }
        Ok(removed)
    }
}

fn remove(schema: &Schema, slot: &mut Link, key: &Thing, value: &Thing) -> bool {
    let Some(node) = slot.as_mut() else {
        return false;
    };

    let removed = match schema.compare(key, value, node) {
        Ordering::Less => remove(schema, &mut node.smaller, key, value),
        Ordering::Greater => remove(schema, &mut node.larger, key, value),
        Ordering::Equal => {
            unlink(slot);
            true
        }
    };

    if removed {
        rebalance(slot);
    }
    removed
}

/// Remove the node in `slot`, splicing in its only child or, when it has
/// two, its in-order successor. The removed node's key and value are
/// released.
fn unlink(slot: &mut Link) {
    let Some(mut doomed) = slot.take() else {
        return;
    };

    *slot = match (doomed.smaller.take(), doomed.larger.take()) {
        (smaller, None) => smaller,
        (None, larger) => larger,
        (Some(smaller), Some(larger)) => {
            let (mut successor, rest) = detach_smallest(larger);
            tracing::trace!(successor = ?successor.key, "promoting successor");
            successor.smaller = Some(smaller);
            successor.larger = rest;
            // Heights are fixed by the caller's rebalance.
            Some(successor)
        }
    };
}

/// Split the leftmost node off the subtree, returning it together with what
/// remains of the subtree (rebalanced along the detachment path).
fn detach_smallest(mut node: Box<Node>) -> (Box<Node>, Link) {
    match node.smaller.take() {
        None => {
            let rest = node.larger.take();
            (node, rest)
        }
        Some(smaller) => {
            let (smallest, rest) = detach_smallest(smaller);
            node.smaller = rest;
            let mut slot = Some(node);
            rebalance(&mut slot);
            (smallest, slot)
        }
    }
}
