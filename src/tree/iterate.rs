//! Bounded in-order traversal.
//!
//! At every node the walk compares the node against each active bound and
//! skips whole subtrees that cannot intersect the range. Once a subtree is
//! known to lie entirely on the inside of a bound, that bound stops being
//! tested for the subtree.

use std::cmp::Ordering;
use std::ops::ControlFlow;

use super::node::{Node, Schema};
use super::DupTree;
use crate::error::Result;
use crate::thing::Thing;

/// One end of an iteration range.
///
/// A bound with no value is open on its side for that key: as a lower bound
/// it sits below every value of the key, as an upper bound above every
/// value. Passing the same key with no value as both bounds therefore
/// visits all values of that key.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint<'a> {
    pub key: &'a Thing,
    pub value: Option<&'a Thing>,
    /// Whether an entry equal to the bound is visited. Has no effect on a
    /// bound without a value, since no entry can equal it.
    pub inclusive: bool,
}

impl<'a> Endpoint<'a> {
    pub fn included(key: &'a Thing) -> Self {
        Self {
            key,
            value: None,
            inclusive: true,
        }
    }

    pub fn excluded(key: &'a Thing) -> Self {
        Self {
            key,
            value: None,
            inclusive: false,
        }
    }

    /// Narrow the bound to one exact (key, value) entry.
    pub fn with_value(mut self, value: &'a Thing) -> Self {
        self.value = Some(value);
        self
    }
}

/// How an iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Every entry in range was visited.
    Completed,
    /// The callback asked to stop.
    Aborted,
}

impl DupTree {
    /// Visit every entry between `low` and `high` in ascending composite
    /// order. A missing bound leaves that side unbounded.
    ///
    /// The callback returns [`ControlFlow::Break`] to stop early, which makes
    /// the call return [`Traversal::Aborted`].
    pub fn iterate<F>(
        &self,
        low: Option<Endpoint<'_>>,
        high: Option<Endpoint<'_>>,
        mut callback: F,
    ) -> Result<Traversal>
    where
        F: FnMut(&Thing, &Thing) -> ControlFlow<()>,
    {
        for bound in low.iter().chain(high.iter()) {
            bound.key.expect_type(self.key_type)?;
            if let Some(value) = bound.value {
                value.expect_type(self.value_type)?;
            }
        }

        let walk = RangeWalk {
            schema: &self.schema,
            low,
            high,
        };
        let flow = walk.visit(
            self.root.as_deref(),
            low.is_some(),
            high.is_some(),
            &mut callback,
        );
        Ok(match flow {
            ControlFlow::Continue(()) => Traversal::Completed,
            ControlFlow::Break(()) => Traversal::Aborted,
        })
    }
}

struct RangeWalk<'a> {
    schema: &'a Schema,
    low: Option<Endpoint<'a>>,
    high: Option<Endpoint<'a>>,
}

impl RangeWalk<'_> {
    /// Order of `bound` relative to `node`, with a missing bound value
    /// treated as `open` when the keys tie.
    fn compare_bound(&self, bound: &Endpoint<'_>, node: &Node, open: Ordering) -> Ordering {
        self.schema
            .key
            .compare(bound.key, &node.key)
            .then_with(|| match bound.value {
                Some(value) => self.schema.value.compare(value, &node.value),
                None => open,
            })
    }

    fn visit<F>(
        &self,
        node: Option<&Node>,
        test_low: bool,
        test_high: bool,
        callback: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(&Thing, &Thing) -> ControlFlow<()>,
    {
        let Some(node) = node else {
            return ControlFlow::Continue(());
        };
        if !test_low && !test_high {
            return visit_all(node, callback);
        }

        // Both orderings read as "bound compared to node".
        let (lower, low_inclusive) = match self.low.as_ref().filter(|_| test_low) {
            Some(low) => (self.compare_bound(low, node, Ordering::Less), low.inclusive),
            None => (Ordering::Less, true),
        };
        let (upper, high_inclusive) = match self.high.as_ref().filter(|_| test_high) {
            Some(high) => (self.compare_bound(high, node, Ordering::Greater), high.inclusive),
            None => (Ordering::Greater, true),
        };

        if lower == Ordering::Less {
            // Everything smaller than a node at or below the upper bound is
            // below it too.
            let test_high = test_high && upper == Ordering::Less;
            self.visit(node.smaller.as_deref(), test_low, test_high, callback)?;
        }

        let above_low = match lower {
            Ordering::Less => true,
            Ordering::Equal => low_inclusive,
            Ordering::Greater => false,
        };
        let below_high = match upper {
            Ordering::Greater => true,
            Ordering::Equal => high_inclusive,
            Ordering::Less => false,
        };
        if above_low && below_high {
            callback(&node.key, &node.value)?;
        }

        if upper == Ordering::Greater {
            let test_low = test_low && lower == Ordering::Greater;
            self.visit(node.larger.as_deref(), test_low, test_high, callback)?;
        }

        ControlFlow::Continue(())
    }
}

fn visit_all<F>(node: &Node, callback: &mut F) -> ControlFlow<()>
where
    F: FnMut(&Thing, &Thing) -> ControlFlow<()>,
{
    if let Some(smaller) = node.smaller.as_deref() {
        visit_all(smaller, callback)?;
    }
    callback(&node.key, &node.value)?;
    if let Some(larger) = node.larger.as_deref() {
        visit_all(larger, callback)?;
    }
    ControlFlow::Continue(())
}
