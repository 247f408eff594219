//! β-reduction, one step at a time.
//!
//! The strategy is leftmost-outermost over `Call` nodes: the walker visits
//! lambda bodies to *find* a redex, but a `Call` is always resolved before
//! anything inside its children. Abbreviations, Church numerals and history
//! references expand only when they end up in function position.

use std::fmt;

use crate::clone::{clone_across, clone_within};
use crate::history::HistoryRing;
use crate::macros::MacroTable;
use crate::term::{Binder, BinderId, IdSource, Node, NodeId, Side, Tree};
use crate::walk::Walker;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReductionKind {
    /// The only formal reduction step; everything else is bookkeeping.
    FunctionApply,
    MacroExpand,
    AutoChurch,
    HistExpand,
}

impl fmt::Display for ReductionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ReductionKind::FunctionApply => "function application",
            ReductionKind::MacroExpand => "macro expansion",
            ReductionKind::AutoChurch => "church expansion",
            ReductionKind::HistExpand => "history expansion",
        };
        f.write_str(text)
    }
}

/// Performs one reduction. Returns `None` when the tree is in β-normal form.
pub(crate) fn reduce(
    tree: &mut Tree,
    ids: &mut IdSource,
    macros: &MacroTable,
    history: &HistoryRing,
) -> Result<Option<ReductionKind>, Error> {
    let mut walker = Walker::new(tree.root());
    while let Some((side, id)) = walker.next(tree) {
        if side != Side::Up || tree.node(id) != &Node::Call {
            continue;
        }
        let fn_slot = require(tree, id, Side::Left);
        match tree.node(fn_slot).clone() {
            Node::Func(binder) => {
                let arg = require(tree, id, Side::Right);
                let body = apply(tree, fn_slot, binder.id, arg, ids);
                tree.replace(id, body);
                log::trace!("step: {}", ReductionKind::FunctionApply);
                return Ok(Some(ReductionKind::FunctionApply));
            }
            node if node.is_expandable() => {
                let (kind, expansion) = expand_leaf(tree, fn_slot, ids, macros, history)?;
                tree.attach(id, Side::Left, expansion);
                log::trace!("step: {}", kind);
                return Ok(Some(kind));
            }
            _ => {}
        }
    }
    Ok(None)
}

/// Substitutes `arg` for every occurrence of `param` in the function body
/// and returns the body, detached from the `Func`. Each occurrence gets its
/// own clone of the argument; the argument tree itself is never reused.
fn apply(
    tree: &mut Tree,
    func: NodeId,
    param: BinderId,
    arg: NodeId,
    ids: &mut IdSource,
) -> NodeId {
    let mut walker = Walker::new(func);
    while let Some((side, id)) = walker.next(tree) {
        if side != Side::Up {
            continue;
        }
        let hit = match tree.node(id) {
            Node::Bound(binder) => binder.id == param,
            _ => false,
        };
        if hit {
            let copy = clone_within(tree, arg, ids);
            tree.replace(id, copy);
            // The walker is left standing on the detached bound; its stale
            // parent link climbs out, and the copy is never re-visited.
        }
    }
    require(tree, func, Side::Left)
}

/// Builds the replacement for one expandable leaf. The result is detached;
/// the caller splices it where it wants it.
pub(crate) fn expand_leaf(
    tree: &mut Tree,
    leaf: NodeId,
    ids: &mut IdSource,
    macros: &MacroTable,
    history: &HistoryRing,
) -> Result<(ReductionKind, NodeId), Error> {
    match tree.node(leaf).clone() {
        Node::Macro(name) => {
            let def = macros.get(&name).ok_or(Error::UndefinedMacro(name))?;
            let body = def.root_child().unwrap_or_else(|| panic!("a definition has no body"));
            Ok((ReductionKind::MacroExpand, clone_across(tree, def, body, ids)))
        }
        Node::Church(n) => Ok((ReductionKind::AutoChurch, church(tree, n, ids))),
        Node::Hist => {
            let latest = history.latest().ok_or(Error::EmptyHistory)?;
            let body = latest.root_child().ok_or(Error::EmptyHistory)?;
            Ok((ReductionKind::HistExpand, clone_across(tree, latest, body, ids)))
        }
        other => panic!("cannot expand {:?}", other),
    }
}

/// The canonical Church expansion `λf.λa.f (f (… (f a) …))`.
fn church(tree: &mut Tree, n: u32, ids: &mut IdSource) -> NodeId {
    let f = Binder { name: "f".into(), id: ids.fresh() };
    let a = Binder { name: "a".into(), id: ids.fresh() };

    let mut chain = tree.alloc_detached(Node::Bound(a.clone()));
    for _ in 0..n {
        let fun = tree.alloc_detached(Node::Bound(f.clone()));
        let call = tree.alloc_detached(Node::Call);
        tree.attach(call, Side::Left, fun);
        tree.attach(call, Side::Right, chain);
        chain = call;
    }

    let inner = tree.alloc_detached(Node::Func(a));
    tree.attach(inner, Side::Left, chain);
    let outer = tree.alloc_detached(Node::Func(f));
    tree.attach(outer, Side::Left, inner);
    outer
}

/// Expands every expandable leaf left in the tree, recursing into the
/// expansions. `cap` bounds the pass: mutually recursive definitions would
/// otherwise unfold forever. Returns the number of expansions performed.
pub(crate) fn expand_all(
    tree: &mut Tree,
    ids: &mut IdSource,
    macros: &MacroTable,
    history: &HistoryRing,
    cap: Option<usize>,
) -> Result<usize, Error> {
    let mut count = 0;
    let mut walker = Walker::new(tree.root());
    while let Some((side, id)) = walker.next(tree) {
        if side != Side::Up || !tree.node(id).is_expandable() {
            continue;
        }
        if cap.map_or(false, |cap| count >= cap) {
            log::debug!("expansion cap of {:?} reached, leaving the rest folded", cap);
            break;
        }
        let (_, expansion) = expand_leaf(tree, id, ids, macros, history)?;
        tree.replace(id, expansion);
        walker.reseat(expansion);
        count += 1;
    }
    Ok(count)
}

fn require(tree: &Tree, id: NodeId, side: Side) -> NodeId {
    tree.child(id, side).unwrap_or_else(|| panic!("node is missing its {:?} child", side))
}
