//! The result history: a bounded ring of the last few reductions,
//! addressable from the prompt as `$`.
//!
//! Entries are fully expanded before they go in, so a later redefinition of
//! an abbreviation cannot retroactively change what `$` meant.

use std::collections::VecDeque;

use crate::term::Tree;

#[derive(Debug)]
pub(crate) struct HistoryRing {
    cap: usize,
    items: VecDeque<Tree>,
}

impl Default for HistoryRing {
    fn default() -> HistoryRing {
        HistoryRing::with_capacity(10)
    }
}

impl HistoryRing {
    pub(crate) fn with_capacity(cap: usize) -> HistoryRing {
        HistoryRing { cap, items: VecDeque::with_capacity(cap) }
    }

    /// Pushes a snapshot, dropping the oldest entry once full.
    pub(crate) fn push(&mut self, tree: Tree) {
        if self.items.len() == self.cap {
            self.items.pop_front();
        }
        self.items.push_back(tree);
    }

    pub(crate) fn latest(&self) -> Option<&Tree> {
        self.items.back()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{Node, Tree};

    fn entry(n: u32) -> Tree {
        let mut tree = Tree::new();
        let leaf = tree.alloc_detached(Node::Church(n));
        let root = tree.root();
        tree.attach(root, crate::term::Side::Left, leaf);
        tree
    }

    fn latest_value(ring: &HistoryRing) -> u32 {
        let tree = ring.latest().unwrap();
        match tree.node(tree.root_child().unwrap()) {
            Node::Church(n) => *n,
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[test]
    fn oldest_entry_drops_first() {
        let mut ring = HistoryRing::with_capacity(3);
        for n in 0..5 {
            ring.push(entry(n));
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(latest_value(&ring), 4);
    }

    #[test]
    fn default_capacity_is_ten() {
        let mut ring = HistoryRing::default();
        for n in 0..12 {
            ring.push(entry(n));
        }
        assert_eq!(ring.len(), 10);
    }
}
