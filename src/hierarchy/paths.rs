//! Per-item ancestor paths.

use std::collections::{btree_map, BTreeMap, BTreeSet};

/// Ancestor path of every item in a hierarchical clustering.
///
/// Each path runs from a root id down towards the item. A cluster that
/// continues as a singleton branch repeats its own id down the path
/// (`r.a.x.x`), and leaves may either end with their own id (`r.a.x`) or stop
/// at their parent (`r.a`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyPaths {
    paths: BTreeMap<String, Vec<String>>,
}

impl HierarchyPaths {
    /// Create an empty set of paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path of an item, returning the previous one if any.
    pub fn insert(&mut self, id: impl Into<String>, path: Vec<String>) -> Option<Vec<String>> {
        self.paths.insert(id.into(), path)
    }

    /// Path of an item.
    pub fn get(&self, id: &str) -> Option<&[String]> {
        self.paths.get(id).map(Vec::as_slice)
    }

    /// Whether an item has a path.
    pub fn contains(&self, id: &str) -> bool {
        self.paths.contains_key(id)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether there are no items.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate `(id, path)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.paths.iter().map(|(id, p)| (id.as_str(), p.as_slice()))
    }

    /// Item ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.paths.keys().map(String::as_str)
    }

    /// Distinct first path elements: the top level of the hierarchy.
    pub fn roots(&self) -> BTreeSet<String> {
        self.paths
            .values()
            .filter_map(|p| p.first().cloned())
            .collect()
    }

    /// Length of the longest path.
    pub fn depth(&self) -> usize {
        self.paths.values().map(Vec::len).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a HierarchyPaths {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = btree_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

impl<K, P, S> FromIterator<(K, P)> for HierarchyPaths
where
    K: Into<String>,
    P: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        let paths = iter
            .into_iter()
            .map(|(id, path)| (id.into(), path.into_iter().map(Into::into).collect()))
            .collect();
        Self { paths }
    }
}
