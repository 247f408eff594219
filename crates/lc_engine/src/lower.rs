//! Builds a term tree from the parser's AST. Every identifier comes in as
//! an unresolved `Macro` leaf; binder ids are placeholders until the
//! preparer assigns real ones.

use lc_parser::Expr;

use crate::term::{Binder, BinderId, Node, NodeId, Side, Tree};

pub(crate) fn lower(expr: &Expr) -> Tree {
    let mut tree = Tree::new();
    let child = lower_expr(&mut tree, expr);
    let root = tree.root();
    tree.attach(root, Side::Left, child);
    tree
}

fn lower_expr(tree: &mut Tree, expr: &Expr) -> NodeId {
    match expr {
        Expr::Name(name) => tree.alloc_detached(Node::Macro(name.clone())),
        Expr::Free(name) => tree.alloc_detached(Node::Free(name.clone())),
        Expr::Church(n) => tree.alloc_detached(Node::Church(*n)),
        Expr::Hist => tree.alloc_detached(Node::Hist),
        Expr::Call(f, a) => {
            let left = lower_expr(tree, f);
            let right = lower_expr(tree, a);
            let call = tree.alloc_detached(Node::Call);
            tree.attach(call, Side::Left, left);
            tree.attach(call, Side::Right, right);
            call
        }
        Expr::Func { param, body } => {
            let body = lower_expr(tree, body);
            let func = tree
                .alloc_detached(Node::Func(Binder { name: param.clone(), id: BinderId::DUMMY }));
            tree.attach(func, Side::Left, body);
            func
        }
    }
}
