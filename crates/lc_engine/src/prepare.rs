//! Turns a freshly lowered tree into a reduction-ready one, in a single
//! outline pass:
//!
//! - binds names to the enclosing `Func`s, giving every binder a fresh id;
//! - leaves names of defined abbreviations as lazy `Macro` leaves;
//! - converts everything else to `Free`, with a warning;
//! - splices the latest history entry over `$`.
//!
//! Afterwards no `Hist` node and no undefined `Macro` remains anywhere in
//! the tree.

use std::fmt;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::clone::clone_across;
use crate::history::HistoryRing;
use crate::macros::MacroTable;
use crate::print::print_node;
use crate::term::{Binder, BinderId, IdSource, Node, Side, Tree};
use crate::walk::Walker;
use crate::Error;

/// Non-fatal notes surfaced before a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    FreeName(SmolStr),
    HistoryExpanded(String),
    Redefined(SmolStr),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::FreeName(name) => write!(f, "name {} is a free variable", name),
            Warning::HistoryExpanded(term) => write!(f, "$ will be expanded to {}", term),
            Warning::Redefined(name) => write!(f, "macro {} was redefined", name),
        }
    }
}

pub(crate) fn prepare(
    tree: &mut Tree,
    ids: &mut IdSource,
    macros: &MacroTable,
    history: &HistoryRing,
    ban: Option<&str>,
) -> Result<Vec<Warning>, Error> {
    let mut warnings = Vec::new();
    // Scope of enclosing binders, keyed by the name as written (subscripts
    // included). The second map recovers the key when a binder goes out of
    // scope, since the resolved node only keeps the display name.
    let mut scope: FxHashMap<SmolStr, Binder> = FxHashMap::default();
    let mut scope_keys: FxHashMap<BinderId, SmolStr> = FxHashMap::default();

    let mut walker = Walker::new(tree.root());
    while let Some((side, id)) = walker.next(tree) {
        match tree.node(id).clone() {
            Node::Func(binder) => match side {
                Side::Up => {
                    if scope.contains_key(&binder.name) {
                        return Err(Error::NameConflict(binder.name));
                    }
                    let resolved = Binder {
                        name: lc_parser::strip_subscripts(&binder.name),
                        id: ids.fresh(),
                    };
                    *tree.node_mut(id) = Node::Func(resolved.clone());
                    scope_keys.insert(resolved.id, binder.name.clone());
                    scope.insert(binder.name, resolved);
                }
                Side::Left => {
                    if let Some(key) = scope_keys.remove(&binder.id) {
                        scope.remove(&key);
                    }
                }
                Side::Right => {}
            },
            Node::Macro(name) => {
                if ban == Some(name.as_str()) {
                    return Err(Error::SelfReference(name));
                }
                if let Some(binder) = scope.get(&name) {
                    *tree.node_mut(id) = Node::Bound(binder.clone());
                } else if !macros.contains(&name) {
                    warnings.push(Warning::FreeName(name.clone()));
                    *tree.node_mut(id) = Node::Free(name);
                }
            }
            Node::Hist => {
                let latest = history.latest().ok_or(Error::EmptyHistory)?;
                let body = latest.root_child().ok_or(Error::EmptyHistory)?;
                let spliced = clone_across(tree, latest, body, ids);
                // Printed while still detached, so the splice shows without
                // the parentheses of its destination slot.
                warnings.push(Warning::HistoryExpanded(print_node(tree, spliced, false)));
                tree.replace(id, spliced);
                // The splice was validated when it was recorded; walking
                // into it would re-check its binders against our scope.
                walker.skip_subtree(tree, spliced);
            }
            _ => {}
        }
    }

    log::debug!("prepared a tree with {} warnings", warnings.len());
    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lower::lower;
    use lc_parser::{parse_line, Line};

    fn lowered(line: &str) -> Tree {
        match parse_line(line).unwrap() {
            Line::Expr(expr) => lower(&expr),
            other => panic!("expected an expression, got {:?}", other),
        }
    }

    fn prepare_bare(tree: &mut Tree) -> Result<Vec<Warning>, Error> {
        let mut ids = IdSource::default();
        prepare(tree, &mut ids, &MacroTable::default(), &HistoryRing::default(), None)
    }

    #[test]
    fn binds_names_to_enclosing_funcs() {
        let mut tree = lowered("λx.x");
        prepare_bare(&mut tree).unwrap();

        let func = tree.root_child().unwrap();
        let body = tree.child(func, Side::Left).unwrap();
        match (tree.node(func), tree.node(body)) {
            (Node::Func(binder), Node::Bound(var)) => assert_eq!(binder.id, var.id),
            other => panic!("unexpected nodes {:?}", other),
        }
    }

    #[test]
    fn sibling_scopes_may_reuse_a_name() {
        let mut tree = lowered("(λx.x) (λx.x)");
        prepare_bare(&mut tree).unwrap();
    }

    #[test]
    fn shadowing_is_a_conflict() {
        let mut tree = lowered("λx.λx.x");
        match prepare_bare(&mut tree) {
            Err(Error::NameConflict(name)) => assert_eq!(name, "x"),
            other => panic!("expected a name conflict, got {:?}", other),
        }
    }

    #[test]
    fn undefined_names_become_free() {
        let mut tree = lowered("x y");
        let warnings = prepare_bare(&mut tree).unwrap();
        assert_eq!(
            warnings,
            vec![Warning::FreeName("x".into()), Warning::FreeName("y".into())]
        );

        let call = tree.root_child().unwrap();
        let left = tree.child(call, Side::Left).unwrap();
        assert_eq!(tree.node(left), &Node::Free("x".into()));
    }

    #[test]
    fn defined_abbreviations_stay_lazy() {
        let mut table = MacroTable::default();
        let mut ids = IdSource::default();
        let mut body = lowered("λab.a");
        prepare(&mut body, &mut ids, &table, &HistoryRing::default(), None).unwrap();
        table.insert("T".into(), body);

        let mut tree = lowered("T T");
        let warnings =
            prepare(&mut tree, &mut ids, &table, &HistoryRing::default(), None).unwrap();
        assert!(warnings.is_empty());

        let call = tree.root_child().unwrap();
        let left = tree.child(call, Side::Left).unwrap();
        assert_eq!(tree.node(left), &Node::Macro("T".into()));
    }

    #[test]
    fn self_reference_is_rejected() {
        let mut tree = lowered("λa.(a REC)");
        let mut ids = IdSource::default();
        let result = prepare(
            &mut tree,
            &mut ids,
            &MacroTable::default(),
            &HistoryRing::default(),
            Some("REC"),
        );
        match result {
            Err(Error::SelfReference(name)) => assert_eq!(name, "REC"),
            other => panic!("expected a self-reference error, got {:?}", other),
        }
    }

    #[test]
    fn history_token_without_history_fails() {
        let mut tree = lowered("$");
        match prepare_bare(&mut tree) {
            Err(Error::EmptyHistory) => {}
            other => panic!("expected an empty-history error, got {:?}", other),
        }
    }

    #[test]
    fn history_token_splices_the_latest_entry() {
        let mut ids = IdSource::default();
        let mut history = HistoryRing::default();
        let mut entry = lowered("λx.x");
        prepare(&mut entry, &mut ids, &MacroTable::default(), &history, None).unwrap();
        history.push(entry);

        let mut tree = lowered("$ y'");
        let warnings =
            prepare(&mut tree, &mut ids, &MacroTable::default(), &history, None).unwrap();
        assert_eq!(warnings, vec![Warning::HistoryExpanded("λx.x".to_string())]);

        let call = tree.root_child().unwrap();
        let left = tree.child(call, Side::Left).unwrap();
        match tree.node(left) {
            Node::Func(_) => {}
            other => panic!("expected the spliced body, got {:?}", other),
        }
    }

    #[test]
    fn history_splice_does_not_conflict_with_enclosing_binders() {
        let mut ids = IdSource::default();
        let mut history = HistoryRing::default();
        let mut entry = lowered("λx.x");
        prepare(&mut entry, &mut ids, &MacroTable::default(), &history, None).unwrap();
        history.push(entry);

        // The user's `x` binder and the snapshot's `x` binder coexist.
        let mut tree = lowered("λx.(x $)");
        prepare(&mut tree, &mut ids, &MacroTable::default(), &history, None).unwrap();
    }

    #[test]
    fn subscripted_binders_display_stripped() {
        let mut tree = lowered("λx₂.x₂");
        prepare_bare(&mut tree).unwrap();
        let func = tree.root_child().unwrap();
        match tree.node(func) {
            Node::Func(binder) => assert_eq!(binder.name, "x"),
            other => panic!("expected a func, got {:?}", other),
        }
    }
}
