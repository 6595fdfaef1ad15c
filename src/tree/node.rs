//! Tree nodes and AVL rebalancing.
//!
//! Every link is an owned `Option<Box<Node>>`. Rotations move boxes between
//! slots, so a node is never reachable from two places at once.

use std::cmp::Ordering;

use crate::compare::Comparator;
use crate::thing::Thing;

/// An owned child slot. `None` is an empty subtree.
pub(crate) type Link = Option<Box<Node>>;

pub(crate) struct Node {
    pub(crate) key: Thing,
    pub(crate) value: Thing,
    pub(crate) smaller: Link,
    pub(crate) larger: Link,
    /// Height of the subtree rooted here. A leaf has height 1.
    pub(crate) height: u32,
}

impl Node {
    pub(crate) fn leaf(key: Thing, value: Thing) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            smaller: None,
            larger: None,
            height: 1,
        })
    }

    #[inline]
    pub(crate) fn balance(&self) -> i64 {
        i64::from(height(&self.smaller)) - i64::from(height(&self.larger))
    }

    #[inline]
    pub(crate) fn update_height(&mut self) {
        self.height = 1 + height(&self.smaller).max(height(&self.larger));
    }
}

impl Drop for Node {
    // Tear children down iteratively so dropping a degenerate chain cannot
    // overflow the stack. Children are released before their parent.
    fn drop(&mut self) {
        let mut pending: Vec<Box<Node>> = Vec::new();
        pending.extend(self.smaller.take());
        pending.extend(self.larger.take());
        while let Some(mut node) = pending.pop() {
            pending.extend(node.smaller.take());
            pending.extend(node.larger.take());
        }
    }
}

/// Height of a possibly empty subtree.
#[inline]
pub(crate) fn height(link: &Link) -> u32 {
    link.as_ref().map_or(0, |n| n.height)
}

/// The key and value comparators of one tree, applied in composite order.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Schema {
    pub(crate) key: Comparator,
    pub(crate) value: Comparator,
}

impl Schema {
    /// Key first, then value when the keys tie.
    #[inline]
    pub(crate) fn compare(&self, key: &Thing, value: &Thing, node: &Node) -> Ordering {
        self.key
            .compare(key, &node.key)
            .then_with(|| self.value.compare(value, &node.value))
    }
}

/// Promote the smaller child into `slot`, pushing the old root down to the
/// larger side.
///
/// ```text
///      2          1
///     / \        / \
///    1   C  =>  A   2
///   / \            / \
///  A   B          B   C
/// ```
fn raise_smaller_child(slot: &mut Link) {
    let Some(mut two) = slot.take() else {
        return;
    };
    let Some(mut one) = two.smaller.take() else {
        *slot = Some(two);
        return;
    };
    two.smaller = one.larger.take();
    two.update_height();
    one.larger = Some(two);
    one.update_height();
    *slot = Some(one);
}

/// Promote the larger child into `slot`, pushing the old root down to the
/// smaller side.
///
/// ```text
///    1              2
///   / \            / \
///  A   2    =>    1   C
///     / \        / \
///    B   C      A   B
/// ```
fn raise_larger_child(slot: &mut Link) {
    let Some(mut one) = slot.take() else {
        return;
    };
    let Some(mut two) = one.larger.take() else {
        *slot = Some(one);
        return;
    };
    one.larger = two.smaller.take();
    one.update_height();
    two.smaller = Some(one);
    two.update_height();
    *slot = Some(two);
}

/// Restore the AVL property at `slot` after one of its subtrees changed
/// height by at most one, and recompute the node's height.
pub(crate) fn rebalance(slot: &mut Link) {
    let Some(node) = slot.as_mut() else {
        return;
    };

    let delta = node.balance();
    if delta <= -2 {
        // The promoted node must keep the deeper grandchild on its outer
        // side, otherwise the rotation just moves the imbalance across.
        if node.larger.as_ref().is_some_and(|larger| larger.balance() > 0) {
            tracing::trace!("double rotation, larger side");
            raise_smaller_child(&mut node.larger);
        }
        tracing::trace!("raising larger child");
        raise_larger_child(slot);
    } else if delta >= 2 {
        if node.smaller.as_ref().is_some_and(|smaller| smaller.balance() < 0) {
            tracing::trace!("double rotation, smaller side");
            raise_larger_child(&mut node.smaller);
        }
        tracing::trace!("raising smaller child");
        raise_smaller_child(slot);
    } else {
        node.update_height();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(k: i32) -> Box<Node> {
        Node::leaf(Thing::Int32(k), Thing::Int32(0))
    }

    fn keys_in_order(link: &Link, out: &mut Vec<i32>) {
        if let Some(n) = link {
            keys_in_order(&n.smaller, out);
            out.push(n.key.as_i32().unwrap());
            keys_in_order(&n.larger, out);
        }
    }

    #[test]
    fn test_single_rotation_right_heavy() {
        // 1 -> 2 -> 3 chain on the larger side.
        let mut three = leaf(3);
        three.update_height();
        let mut two = leaf(2);
        two.larger = Some(three);
        two.update_height();
        let mut one = leaf(1);
        one.larger = Some(two);
        one.update_height();
        let mut slot: Link = Some(one);

        rebalance(&mut slot);

        let root = slot.as_ref().unwrap();
        assert_eq!(root.key, Thing::Int32(2));
        assert_eq!(root.height, 2);
        assert_eq!(root.balance(), 0);
        let mut keys = Vec::new();
        keys_in_order(&slot, &mut keys);
        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[test]
    fn test_double_rotation_zig_zag() {
        // 3 has smaller child 1, which has larger child 2.
        let mut one = leaf(1);
        one.larger = Some(leaf(2));
        one.update_height();
        let mut three = leaf(3);
        three.smaller = Some(one);
        three.update_height();
        let mut slot: Link = Some(three);

        rebalance(&mut slot);

        let root = slot.as_ref().unwrap();
        assert_eq!(root.key, Thing::Int32(2));
        assert_eq!(root.height, 2);
        let mut keys = Vec::new();
        keys_in_order(&slot, &mut keys);
        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[test]
    fn test_balanced_node_only_updates_height() {
        let mut two = leaf(2);
        two.smaller = Some(leaf(1));
        two.height = 7;
        let mut slot: Link = Some(two);
        rebalance(&mut slot);
        assert_eq!(slot.as_ref().unwrap().height, 2);
        assert_eq!(slot.as_ref().unwrap().key, Thing::Int32(2));
    }

    #[test]
    fn test_empty_slot_is_noop() {
        let mut slot: Link = None;
        rebalance(&mut slot);
        assert!(slot.is_none());
    }

    #[test]
    fn test_drop_long_chain() {
        let mut slot: Link = None;
        for k in 0..200_000 {
            let mut n = leaf(k);
            n.smaller = slot.take();
            slot = Some(n);
        }
        drop(slot);
    }
}
