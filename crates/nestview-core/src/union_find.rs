//! Disjoint-set (union-find) over string node ids.
//!
//! Used by hierarchy collapse to track which nodes have been merged into an
//! anchor. Unlike a rank-balanced union-find, [`DisjointSet::union`] is
//! asymmetric: the root of the first argument is always attached under the
//! root of the second, so the caller decides which representative survives.

use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct DisjointSet {
    parent: HashMap<String, String>,
}

impl DisjointSet {
    /// Create a set in which every id is its own representative.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parent = ids
            .into_iter()
            .map(|id| {
                let id = id.into();
                (id.clone(), id)
            })
            .collect();
        Self { parent }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.parent.contains_key(id)
    }

    /// Representative of `id`, compressing the path behind it.
    ///
    /// Unknown ids are registered as singletons.
    pub fn find(&mut self, id: &str) -> String {
        if !self.parent.contains_key(id) {
            self.parent.insert(id.to_string(), id.to_string());
            return id.to_string();
        }

        let mut root = id.to_string();
        while let Some(next) = self.parent.get(&root).filter(|p| **p != root) {
            root = next.clone();
        }

        let mut cursor = id.to_string();
        while cursor != root {
            let next = self
                .parent
                .insert(cursor, root.clone())
                .unwrap_or_else(|| root.clone());
            cursor = next;
        }

        root
    }

    /// Attach the root of `a` under the root of `b`.
    ///
    /// Returns `false` if both were already in the same set.
    pub fn union(&mut self, a: &str, b: &str) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        self.parent.insert(ra, rb);
        true
    }

    /// `true` if `a` and `b` share a representative.
    pub fn same_set(&mut self, a: &str, b: &str) -> bool {
        self.find(a) == self.find(b)
    }

    /// Every distinct representative.
    pub fn representatives(&mut self) -> BTreeSet<String> {
        let ids: Vec<String> = self.parent.keys().cloned().collect();
        ids.iter().map(|id| self.find(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_their_own_representative() {
        let mut ds = DisjointSet::new(["a", "b"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.find("a"), "a");
        assert!(!ds.same_set("a", "b"));
    }

    #[test]
    fn union_keeps_second_root() {
        let mut ds = DisjointSet::new(["a", "b", "c"]);
        assert!(ds.union("a", "b"));
        assert_eq!(ds.find("a"), "b");

        assert!(ds.union("b", "c"));
        assert_eq!(ds.find("a"), "c");
        assert_eq!(ds.find("b"), "c");
        assert!(!ds.union("a", "c"), "already merged");
    }

    #[test]
    fn union_order_controls_survivor() {
        let mut ds = DisjointSet::new(["x", "y"]);
        ds.union("y", "x");
        assert_eq!(ds.find("y"), "x");
    }

    #[test]
    fn unknown_ids_become_singletons() {
        let mut ds = DisjointSet::default();
        assert!(ds.is_empty());
        assert_eq!(ds.find("ghost"), "ghost");
        assert!(ds.contains("ghost"));
    }

    #[test]
    fn find_compresses_long_chains() {
        let ids: Vec<String> = (0..50).map(|i| format!("n{i}")).collect();
        let mut ds = DisjointSet::new(ids.iter().cloned());
        for pair in ids.windows(2) {
            ds.union(&pair[0], &pair[1]);
        }
        assert_eq!(ds.find("n0"), "n49");
        // After compression every member points straight at the root.
        assert_eq!(ds.parent.get("n0").map(String::as_str), Some("n49"));
        assert_eq!(ds.parent.get("n1").map(String::as_str), Some("n49"));
    }

    #[test]
    fn representatives_lists_each_set_once() {
        let mut ds = DisjointSet::new(["a", "b", "c", "d"]);
        ds.union("a", "b");
        ds.union("c", "b");
        let reps: Vec<String> = ds.representatives().into_iter().collect();
        assert_eq!(reps, vec!["b".to_string(), "d".to_string()]);
    }
}
