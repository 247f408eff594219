//! Renders a tree back to source. The output re-parses to an α-equivalent
//! term: calls are parenthesized, nested λs collapse into one head, free
//! variables carry their `'` marker, and binders whose display names clash
//! are renamed with base-4 subscripts on the fly.

use rustc_hash::FxHashMap;

use crate::term::{BinderId, Node, NodeId, Side, Tree};
use crate::walk::Walker;

impl Tree {
    /// Renders the whole tree. `export` marks output destined for a macro
    /// file; both modes produce re-parsable text, and they currently
    /// coincide glyph for glyph.
    pub fn print(&self, export: bool) -> String {
        print_node(self, self.root(), export)
    }
}

pub(crate) fn print_node(tree: &Tree, start: NodeId, export: bool) -> String {
    let _ = export;
    let mut out = String::new();
    // Display names of the binders in scope, by id. Entries leave when the
    // walker leaves the binder's subtree.
    let mut renames: FxHashMap<BinderId, String> = FxHashMap::default();

    let mut walker = Walker::new(start);
    while let Some((side, id)) = walker.next(tree) {
        match tree.node(id) {
            Node::Root => {}
            Node::Bound(binder) => match renames.get(&binder.id) {
                Some(display) => out.push_str(display),
                // A binder outside the printed subtree; show the hint.
                None => out.push_str(&binder.name),
            },
            Node::Free(name) => {
                out.push_str(name);
                out.push('\'');
            }
            Node::Macro(name) => out.push_str(name),
            Node::Church(n) => out.push_str(&n.to_string()),
            Node::Hist => out.push('$'),
            Node::Call => match side {
                Side::Up => out.push('('),
                Side::Left => out.push(' '),
                Side::Right => out.push(')'),
            },
            Node::Func(binder) => match side {
                Side::Up => {
                    let mut display = binder.name.to_string();
                    if renames.values().any(|taken| *taken == display) {
                        let base = display;
                        let mut n = 0;
                        display = loop {
                            let candidate = format!("{}{}", base, lc_parser::subscript(n));
                            if !renames.values().any(|taken| *taken == candidate) {
                                break candidate;
                            }
                            n += 1;
                        };
                    }

                    let under_call = matches!(parent_node(tree, id), Some(Node::Call));
                    let under_func = matches!(parent_node(tree, id), Some(Node::Func(_)));
                    if under_call {
                        out.push('(');
                    }
                    if under_func {
                        out.push_str(&display);
                    } else {
                        out.push('λ');
                        out.push_str(&display);
                    }
                    let body_is_func = tree
                        .child(id, Side::Left)
                        .map_or(false, |body| matches!(tree.node(body), Node::Func(_)));
                    if !body_is_func {
                        out.push('.');
                    }
                    renames.insert(binder.id, display);
                }
                Side::Left => {
                    if matches!(parent_node(tree, id), Some(Node::Call)) {
                        out.push(')');
                    }
                    renames.remove(&binder.id);
                }
                Side::Right => {}
            },
        }
    }
    out
}

fn parent_node<'t>(tree: &'t Tree, id: NodeId) -> Option<&'t Node> {
    tree.parent(id).map(|(parent, _)| tree.node(parent))
}
