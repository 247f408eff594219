//! The abbreviation table. Lookup is by name; iteration follows definition
//! order, which the save format depends on (a saved file must reload
//! top-to-bottom with later lines free to use earlier names).

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::term::Tree;

#[derive(Debug, Default)]
pub(crate) struct MacroTable {
    map: FxHashMap<SmolStr, Tree>,
    order: Vec<SmolStr>,
}

impl MacroTable {
    /// Stores a definition. Returns `true` when an existing one was
    /// overwritten; the overwritten definition keeps its position.
    pub(crate) fn insert(&mut self, name: SmolStr, body: Tree) -> bool {
        let redefined = self.map.insert(name.clone(), body).is_some();
        if !redefined {
            self.order.push(name);
        }
        redefined
    }

    pub(crate) fn remove(&mut self, name: &str) -> bool {
        if self.map.remove(name).is_some() {
            self.order.retain(|n| n != name);
            true
        } else {
            false
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Tree> {
        self.map.get(name)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&SmolStr, &Tree)> {
        self.order.iter().map(move |name| (name, &self.map[name]))
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{Node, Side, Tree};

    fn body(n: u32) -> Tree {
        let mut tree = Tree::new();
        let leaf = tree.alloc_detached(Node::Church(n));
        let root = tree.root();
        tree.attach(root, Side::Left, leaf);
        tree
    }

    #[test]
    fn iteration_follows_definition_order() {
        let mut table = MacroTable::default();
        table.insert("B".into(), body(0));
        table.insert("A".into(), body(1));
        table.insert("C".into(), body(2));
        // Redefinition keeps the original position.
        assert!(table.insert("B".into(), body(3)));

        let names: Vec<&SmolStr> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["B", "A", "C"]);
    }

    #[test]
    fn remove_forgets_the_name() {
        let mut table = MacroTable::default();
        table.insert("K".into(), body(0));
        assert!(table.remove("K"));
        assert!(!table.remove("K"));
        assert!(table.is_empty());
    }
}
