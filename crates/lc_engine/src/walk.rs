//! The outline walker, the one traversal shared by the preparer, reducer,
//! printer and expander.
//!
//! It yields `(side, node)` pairs in "outline" order: the side says from
//! which direction the node was entered. A `Call` is therefore seen three
//! times (down, between children, up), a `Func` twice, a leaf once.
//! Visitors that rewrite the tree mid-walk reposition the cursor with
//! `reseat` or `skip_subtree`.
//!
//! The walk never touches anything above its start node, so a detached
//! subtree can be walked as well as an attached one.

use crate::term::{Node, NodeId, Side, Tree};

pub(crate) struct Walker {
    start: NodeId,
    cur: NodeId,
    from: Side,
    first: bool,
    done: bool,
    queued: Option<(Side, NodeId)>,
}

impl Walker {
    pub(crate) fn new(start: NodeId) -> Walker {
        Walker { start, cur: start, from: Side::Up, first: true, done: false, queued: None }
    }

    pub(crate) fn next(&mut self, tree: &Tree) -> Option<(Side, NodeId)> {
        if self.first {
            self.first = false;
            return Some((self.from, self.cur));
        }
        if self.done {
            return None;
        }
        if let Some((side, node)) = self.queued.take() {
            self.from = side;
            self.cur = node;
            return Some((side, node));
        }

        // Stepping upward out of the start node ends the walk without ever
        // touching its parent; the start may not have one.
        if self.cur == self.start && self.exits_upward(tree) {
            self.done = true;
            return None;
        }

        let (from, to) = step(tree, self.from, self.cur);
        // A Root is emitted once on the way in, not again on the way out.
        if to == self.start && matches!(tree.node(self.start), Node::Root) {
            self.done = true;
            return None;
        }
        self.from = from;
        self.cur = to;
        Some((from, to))
    }

    /// Continues the walk from `node` as if it had just been entered from
    /// above. Used after rewriting the node the cursor stands on.
    pub(crate) fn reseat(&mut self, node: NodeId) {
        self.cur = node;
        self.from = Side::Up;
    }

    /// Continues the walk as if `node`'s subtree had already been fully
    /// visited: the next pair is the re-entry into its parent.
    pub(crate) fn skip_subtree(&mut self, tree: &Tree, node: NodeId) {
        let (parent, side) =
            tree.parent(node).unwrap_or_else(|| panic!("cannot skip an unattached subtree"));
        if parent == self.start && matches!(tree.node(self.start), Node::Root) {
            self.done = true;
        } else {
            self.queued = Some((side, parent));
        }
    }

    /// Whether the next move would leave the start node's subtree.
    fn exits_upward(&self, tree: &Tree) -> bool {
        match (tree.node(self.cur), self.from) {
            (Node::Root, _) => false,
            (Node::Func(_), Side::Left) => true,
            (Node::Call, Side::Right) => true,
            (Node::Func(_), _) | (Node::Call, _) => false,
            // A leaf start has nothing below it.
            (_, _) => true,
        }
    }
}

fn step(tree: &Tree, from: Side, cur: NodeId) -> (Side, NodeId) {
    let go_left = |cur| (Side::Up, require_child(tree, cur, Side::Left));
    let go_right = |cur| (Side::Up, require_child(tree, cur, Side::Right));
    let go_up = |cur| {
        let (parent, side) =
            tree.parent(cur).unwrap_or_else(|| panic!("walked above an unattached node"));
        (side, parent)
    };

    match (tree.node(cur), from) {
        (Node::Root, Side::Up) => go_left(cur),
        (Node::Call, Side::Up) => go_left(cur),
        (Node::Call, Side::Left) => go_right(cur),
        (Node::Call, Side::Right) => go_up(cur),
        (Node::Func(_), Side::Up) => go_left(cur),
        (Node::Func(_), Side::Left) => go_up(cur),
        (Node::Root, _) | (Node::Func(_), Side::Right) => {
            panic!("invalid walker state: {:?} from {:?}", tree.node(cur), from)
        }
        // Leaves are only ever entered from above.
        (_, _) => go_up(cur),
    }
}

fn require_child(tree: &Tree, id: NodeId, side: Side) -> NodeId {
    tree.child(id, side).unwrap_or_else(|| panic!("node is missing its {:?} child", side))
}
