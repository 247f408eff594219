//! Property tests over random λ-terms.

use proptest::prelude::*;

use lc_engine::{alpha_eq, parse_expr, Headless, Outcome, Runner, StopReason};

/// A random term shape. Rendering assigns binder names by nesting depth,
/// so no term ever shadows a name; variables pick among the binders in
/// scope, or fall back to a free name at the top level.
#[derive(Debug, Clone)]
enum Shape {
    Var(usize),
    Free(u8),
    Church(u8),
    Lam(Box<Shape>),
    App(Box<Shape>, Box<Shape>),
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        any::<usize>().prop_map(Shape::Var),
        (0u8..3).prop_map(Shape::Free),
        (0u8..5).prop_map(Shape::Church),
    ];
    leaf.prop_recursive(8, 48, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|body| Shape::Lam(Box::new(body))),
            (inner.clone(), inner)
                .prop_map(|(f, a)| Shape::App(Box::new(f), Box::new(a))),
        ]
    })
}

fn binder(depth: usize) -> char {
    (b'a' + depth as u8) as char
}

fn render(shape: &Shape, depth: usize) -> String {
    match shape {
        Shape::Var(i) => {
            if depth == 0 {
                "w'".to_string()
            } else {
                binder(i % depth).to_string()
            }
        }
        Shape::Free(i) => ["F", "G", "H"][*i as usize].to_string(),
        Shape::Church(n) => n.to_string(),
        Shape::Lam(body) => format!("λ{}.{}", binder(depth), render(body, depth + 1)),
        Shape::App(f, a) => {
            format!("(({}) ({}))", render(f, depth), render(a, depth))
        }
    }
}

/// The free names of a printed term: identifier runs with a `'` marker.
fn free_names(term: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for c in term.chars() {
        if c.is_ascii_alphabetic() || c == '_' {
            current.push(c);
        } else if c == '\'' && !current.is_empty() {
            out.push(std::mem::replace(&mut current, String::new()));
        } else {
            current.clear();
        }
    }
    out.sort();
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Printing in export mode and re-parsing yields an α-equivalent term.
    #[test]
    fn print_parse_round_trip(shape in arb_shape()) {
        let source = render(&shape, 0);
        let tree = parse_expr(&source).unwrap();
        let printed = tree.print(true);
        let reparsed = parse_expr(&printed).unwrap();
        prop_assert!(
            alpha_eq(&tree, &reparsed),
            "round trip changed the term: {:?} vs {:?}",
            printed,
            reparsed.print(true)
        );
    }

    /// Printing is idempotent: the printed form prints to itself.
    #[test]
    fn printing_is_stable(shape in arb_shape()) {
        let source = render(&shape, 0);
        let printed = parse_expr(&source).unwrap().print(true);
        let again = parse_expr(&printed).unwrap().print(true);
        prop_assert_eq!(printed, again);
    }

    /// Reduction never invents free variables.
    #[test]
    fn reduction_preserves_free_names(shape in arb_shape()) {
        let source = render(&shape, 0);
        let before = free_names(&parse_expr(&source).unwrap().print(false));

        let mut runner = Runner::new();
        runner.set_reduction_limit(Some(50)).unwrap();
        let report = match runner.run_line(&source, &mut Headless).unwrap() {
            Outcome::Reduced(report) => report,
            other => panic!("expected a reduction, got {:?}", other),
        };

        let after = free_names(&report.term);
        for name in &after {
            prop_assert!(
                before.contains(name),
                "reduction invented the free name {:?} in {:?}",
                name,
                report.term
            );
        }
    }

    /// The strategy is deterministic: two sessions reduce the same source
    /// to the same printed normal form.
    #[test]
    fn reduction_is_deterministic(shape in arb_shape()) {
        let source = render(&shape, 0);
        let reduce = |line: &str| {
            let mut runner = Runner::new();
            runner.set_reduction_limit(Some(50)).unwrap();
            match runner.run_line(line, &mut Headless).unwrap() {
                Outcome::Reduced(report) => report,
                other => panic!("expected a reduction, got {:?}", other),
            }
        };
        let first = reduce(&source);
        let second = reduce(&source);
        prop_assert_eq!(first.stop, second.stop);
        if first.stop == StopReason::BetaNormal {
            prop_assert_eq!(first.term, second.term);
            prop_assert_eq!(first.beta_reductions, second.beta_reductions);
        }
    }
}
