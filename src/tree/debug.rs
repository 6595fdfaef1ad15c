//! Structural checks and dumps for tests and troubleshooting.

use std::cmp::Ordering;
use std::fmt::Write;

use super::node::{height, Link, Node};
use super::DupTree;

impl DupTree {
    /// Check every structural invariant and describe each violation found.
    /// An empty result means the tree is sound.
    ///
    /// Checked: stored heights, AVL balance, strictly ascending composite
    /// order with no duplicate entries, entry types, and the entry count.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut previous: Option<&Node> = None;
        let mut seen = 0usize;
        self.check_subtree(&self.root, 0, &mut previous, &mut seen, &mut issues);
        if seen != self.count {
            issues.push(format!("count is {} but {} nodes are reachable", self.count, seen));
        }
        issues
    }

    fn check_subtree<'a>(
        &'a self,
        link: &'a Link,
        depth: usize,
        previous: &mut Option<&'a Node>,
        seen: &mut usize,
        issues: &mut Vec<String>,
    ) -> u32 {
        let Some(node) = link.as_deref() else {
            return 0;
        };

        let smaller = self.check_subtree(&node.smaller, depth + 1, previous, seen, issues);

        *seen += 1;
        if node.key.type_code() != self.key_type {
            issues.push(format!("depth {depth}: key {} has type {}", node.key, node.key.type_code()));
        }
        if node.value.type_code() != self.value_type {
            issues.push(format!(
                "depth {depth}: value {} has type {}",
                node.value,
                node.value.type_code()
            ));
        }
        if let Some(prev) = *previous {
            if self.schema.compare(&prev.key, &prev.value, node) != Ordering::Less {
                issues.push(format!(
                    "depth {depth}: ({}, {}) does not sort after ({}, {})",
                    node.key, node.value, prev.key, prev.value
                ));
            }
        }
        *previous = Some(node);

        let larger = self.check_subtree(&node.larger, depth + 1, previous, seen, issues);

        let expected = 1 + smaller.max(larger);
        if node.height != expected {
            issues.push(format!(
                "depth {depth}: ({}, {}) stores height {} but has height {expected}",
                node.key, node.value, node.height
            ));
        }
        if smaller.abs_diff(larger) > 1 {
            issues.push(format!(
                "depth {depth}: ({}, {}) is out of balance ({smaller} vs {larger})",
                node.key, node.value
            ));
        }
        expected
    }

    /// Render the tree sideways, larger side up, one node per line.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} ({} -> {}), {} entries, height {}",
            self.name().unwrap_or("<unnamed>"),
            self.key_type,
            self.value_type,
            self.count,
            height(&self.root)
        );
        dump(&self.root, 0, &mut out);
        out
    }
}

fn dump(link: &Link, depth: usize, out: &mut String) {
    let Some(node) = link.as_deref() else {
        return;
    };
    dump(&node.larger, depth + 1, out);
    let _ = writeln!(
        out,
        "{:indent$}{} = {} [h{} b{}]",
        "",
        node.key,
        node.value,
        node.height,
        node.balance(),
        indent = depth * 4
    );
    dump(&node.smaller, depth + 1, out);
}
