//! Deep copies of subtrees.
//!
//! Every copy allocates fresh ids for the binders it passes and rewrites
//! inner `Bound`s through an old→new map, so a clone can never capture
//! variables of the tree it lands in. Bounds referring to binders *outside*
//! the copied subtree keep their ids. The copy walks children only and
//! rebuilds parent links from scratch.

use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};

use crate::term::{Binder, BinderId, IdSource, Node, NodeId, Side, Tree};

/// Clones `src` (a subtree of `tree` itself) and returns the detached copy.
pub(crate) fn clone_within(tree: &mut Tree, src: NodeId, ids: &mut IdSource) -> NodeId {
    copy(tree, None, src, ids)
}

/// Clones `src` out of `from` into `tree`, e.g. a macro body or a history
/// snapshot into the expression under reduction.
pub(crate) fn clone_across(
    tree: &mut Tree,
    from: &Tree,
    src: NodeId,
    ids: &mut IdSource,
) -> NodeId {
    copy(tree, Some(from), src, ids)
}

fn copy(dst: &mut Tree, src_tree: Option<&Tree>, src: NodeId, ids: &mut IdSource) -> NodeId {
    let mut remap: FxHashMap<BinderId, BinderId> = FxHashMap::default();
    let mut result = None;
    // (source node, destination slot); a parent is always copied before its
    // children, so the remap already covers every binder in scope.
    let mut stack: SmallVec<[(NodeId, Option<(NodeId, Side)>); 16]> = smallvec![(src, None)];

    while let Some((node_id, slot)) = stack.pop() {
        let data = match src_tree {
            Some(tree) => tree.data(node_id).clone(),
            None => dst.data(node_id).clone(),
        };
        debug_assert!(data.node != Node::Root, "tried to clone a Root");

        let node = match data.node {
            Node::Func(binder) => {
                let fresh = ids.fresh();
                remap.insert(binder.id, fresh);
                Node::Func(Binder { name: binder.name, id: fresh })
            }
            Node::Bound(binder) => {
                let id = remap.get(&binder.id).copied().unwrap_or(binder.id);
                Node::Bound(Binder { name: binder.name, id })
            }
            other => other,
        };

        let new = dst.alloc_detached(node);
        match slot {
            Some((parent, side)) => dst.attach(parent, side, new),
            None => result = Some(new),
        }

        if let Some(right) = data.right {
            stack.push((right, Some((new, Side::Right))));
        }
        if let Some(left) = data.left {
            stack.push((left, Some((new, Side::Left))));
        }
    }

    result.unwrap_or_else(|| panic!("clone produced no nodes"))
}
