//! The term tree.
//!
//! Nodes live in an arena owned by their `Tree`; children and parents are
//! ids, so splicing a subtree during reduction is a pair of index writes.
//! A node replaced out of the tree simply becomes unreachable and is
//! reclaimed by the next `collect`.

use lc_arena::{impl_arena_id, Arena, RawId};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(RawId);
impl_arena_id!(NodeId);

/// Identity of a binder. Two `Bound` nodes refer to the same `Func` iff
/// their ids are equal; names are display hints only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinderId(u32);

impl BinderId {
    /// Placeholder carried by freshly lowered trees; the preparer replaces
    /// every occurrence before the tree is allowed near the reducer.
    pub(crate) const DUMMY: BinderId = BinderId(u32::MAX);
}

/// Hands out binder ids. Owned by the driver and threaded through the
/// preparer and the cloner, so ids stay unique across every tree of a
/// session.
#[derive(Debug, Default)]
pub(crate) struct IdSource {
    next: u32,
}

impl IdSource {
    pub(crate) fn fresh(&mut self) -> BinderId {
        let id = BinderId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binder {
    pub name: SmolStr,
    pub id: BinderId,
}

/// Which side of its parent a node hangs on, and which direction the
/// outline walker entered a node from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Up,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Single-child wrapper at the top of every managed tree.
    Root,
    /// Application: left is the function position, right the argument.
    Call,
    /// Abstraction: the body is the left child, right is unused.
    Func(Binder),
    Bound(Binder),
    /// An identifier the parser could not resolve. Survives preparation
    /// only when it names a defined abbreviation.
    Macro(SmolStr),
    Free(SmolStr),
    Church(u32),
    /// `$`. Eliminated by the preparer; never reaches the reducer.
    Hist,
}

impl Node {
    pub(crate) fn is_expandable(&self) -> bool {
        match self {
            Node::Macro(_) | Node::Church(_) | Node::Hist => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeData {
    pub(crate) parent: Option<(NodeId, Side)>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) node: Node,
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Arena<NodeId, NodeData>,
    root: NodeId,
}

impl Tree {
    pub(crate) fn new() -> Tree {
        let mut nodes = Arena::default();
        let root = nodes.alloc(NodeData { parent: None, left: None, right: None, node: Node::Root });
        Tree { nodes, root }
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn root_child(&self) -> Option<NodeId> {
        self.nodes[self.root].left
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id].node
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id].node
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id]
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<(NodeId, Side)> {
        self.nodes[id].parent
    }

    pub(crate) fn child(&self, id: NodeId, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.nodes[id].left,
            Side::Right => self.nodes[id].right,
            Side::Up => None,
        }
    }

    /// Allocates a node with no links; `attach` wires it in.
    pub(crate) fn alloc_detached(&mut self, node: Node) -> NodeId {
        self.nodes.alloc(NodeData { parent: None, left: None, right: None, node })
    }

    /// Puts `child` into `parent`'s `side` slot and records the back link.
    /// A node previously in the slot keeps its stale parent link: visitors
    /// standing on a spliced-out node still find their way up.
    pub(crate) fn attach(&mut self, parent: NodeId, side: Side, child: NodeId) {
        match side {
            Side::Left => self.nodes[parent].left = Some(child),
            Side::Right => self.nodes[parent].right = Some(child),
            Side::Up => panic!("cannot attach upward"),
        }
        self.nodes[child].parent = Some((parent, side));
    }

    /// Replaces the subtree at `old` with `new` in `old`'s parent slot.
    pub(crate) fn replace(&mut self, old: NodeId, new: NodeId) {
        let (parent, side) =
            self.parent(old).unwrap_or_else(|| panic!("cannot replace the root node"));
        self.attach(parent, side, new);
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Copies the live subtree into a fresh arena, dropping everything that
    /// reduction spliced out. Node ids are invalidated; binder ids survive.
    pub(crate) fn collect(&mut self) {
        let mut fresh: Arena<NodeId, NodeData> = Arena::default();
        let root =
            fresh.alloc(NodeData { parent: None, left: None, right: None, node: Node::Root });
        let mut stack = Vec::new();
        if let Some(child) = self.root_child() {
            stack.push((child, root, Side::Left));
        }
        while let Some((old, parent, side)) = stack.pop() {
            let data = &self.nodes[old];
            let node = data.node.clone();
            let (old_left, old_right) = (data.left, data.right);
            let new = fresh.alloc(NodeData {
                parent: Some((parent, side)),
                left: None,
                right: None,
                node,
            });
            match side {
                Side::Left => fresh[parent].left = Some(new),
                Side::Right => fresh[parent].right = Some(new),
                Side::Up => unreachable!(),
            }
            if let Some(r) = old_right {
                stack.push((r, new, Side::Right));
            }
            if let Some(l) = old_left {
                stack.push((l, new, Side::Left));
            }
        }
        self.nodes = fresh;
        self.root = root;
    }
}

/// Structural equality up to renaming of bound variables.
pub fn alpha_eq(a: &Tree, b: &Tree) -> bool {
    let mut pairs = FxHashMap::default();
    match (a.root_child(), b.root_child()) {
        (Some(x), Some(y)) => alpha_eq_at(a, x, b, y, &mut pairs),
        (None, None) => true,
        _ => false,
    }
}

fn alpha_eq_at(
    a: &Tree,
    x: NodeId,
    b: &Tree,
    y: NodeId,
    pairs: &mut FxHashMap<BinderId, BinderId>,
) -> bool {
    match (a.node(x), b.node(y)) {
        (Node::Func(ba), Node::Func(bb)) => {
            pairs.insert(ba.id, bb.id);
            match (a.child(x, Side::Left), b.child(y, Side::Left)) {
                (Some(xl), Some(yl)) => alpha_eq_at(a, xl, b, yl, pairs),
                _ => false,
            }
        }
        (Node::Call, Node::Call) => {
            let left = match (a.child(x, Side::Left), b.child(y, Side::Left)) {
                (Some(xl), Some(yl)) => alpha_eq_at(a, xl, b, yl, pairs),
                _ => false,
            };
            left && match (a.child(x, Side::Right), b.child(y, Side::Right)) {
                (Some(xr), Some(yr)) => alpha_eq_at(a, xr, b, yr, pairs),
                _ => false,
            }
        }
        (Node::Bound(ba), Node::Bound(bb)) => {
            // Binders outside the compared subtrees only match by identity.
            pairs.get(&ba.id).map_or(ba.id == bb.id, |mapped| *mapped == bb.id)
        }
        (Node::Macro(na), Node::Macro(nb)) => na == nb,
        (Node::Free(na), Node::Free(nb)) => na == nb,
        (Node::Church(va), Node::Church(vb)) => va == vb,
        (Node::Hist, Node::Hist) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_tree(node: Node) -> Tree {
        let mut tree = Tree::new();
        let id = tree.alloc_detached(node);
        let root = tree.root();
        tree.attach(root, Side::Left, id);
        tree
    }

    #[test]
    fn attach_links_both_directions() {
        let mut tree = Tree::new();
        let call = tree.alloc_detached(Node::Call);
        let f = tree.alloc_detached(Node::Free("f".into()));
        let a = tree.alloc_detached(Node::Free("a".into()));
        let root = tree.root();
        tree.attach(root, Side::Left, call);
        tree.attach(call, Side::Left, f);
        tree.attach(call, Side::Right, a);

        assert_eq!(tree.root_child(), Some(call));
        assert_eq!(tree.parent(f), Some((call, Side::Left)));
        assert_eq!(tree.parent(a), Some((call, Side::Right)));
    }

    #[test]
    fn replace_keeps_stale_parent_link() {
        let mut tree = leaf_tree(Node::Free("x".into()));
        let old = tree.root_child().unwrap();
        let new = tree.alloc_detached(Node::Church(1));
        tree.replace(old, new);

        assert_eq!(tree.root_child(), Some(new));
        // The orphan still knows where it used to hang.
        assert_eq!(tree.parent(old), Some((tree.root(), Side::Left)));
    }

    #[test]
    fn collect_drops_garbage() {
        let mut tree = leaf_tree(Node::Free("x".into()));
        let old = tree.root_child().unwrap();
        let new = tree.alloc_detached(Node::Church(7));
        tree.replace(old, new);
        assert_eq!(tree.len(), 3);

        tree.collect();
        assert_eq!(tree.len(), 2);
        let child = tree.root_child().unwrap();
        assert_eq!(tree.node(child), &Node::Church(7));
    }

    #[test]
    fn alpha_eq_ignores_names_but_not_structure() {
        let mut ids = IdSource::default();

        let mk = |ids: &mut IdSource, param: &str| {
            let mut tree = Tree::new();
            let id = ids.fresh();
            let func =
                tree.alloc_detached(Node::Func(Binder { name: param.into(), id }));
            let bound =
                tree.alloc_detached(Node::Bound(Binder { name: param.into(), id }));
            let root = tree.root();
            tree.attach(root, Side::Left, func);
            tree.attach(func, Side::Left, bound);
            tree
        };

        let identity_x = mk(&mut ids, "x");
        let identity_y = mk(&mut ids, "y");
        assert!(alpha_eq(&identity_x, &identity_y));

        let constant = leaf_tree(Node::Church(0));
        assert!(!alpha_eq(&identity_x, &constant));
    }
}
