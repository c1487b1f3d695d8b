//! Parent/level → children lookup, built once from all paths.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::paths::HierarchyPaths;
use crate::error::{Error, Result};

static NO_CHILDREN: BTreeSet<String> = BTreeSet::new();

/// Direct children of every `(parent, level)` position in a hierarchy.
///
/// An item `x` with path `P` of length `L` is a child of `P[lvl]` at level
/// `lvl` when either
///
/// - `lvl + 1 < L` and `P[lvl + 1] == x` (the next step is `x` itself), or
/// - `lvl + 1 == L` (the path ends at its parent).
///
/// An item is never registered under its own id, so the repeated trailing id
/// of a singleton branch (`r.a.x.x`) yields a single registration under `a`.
///
/// Construction rejects paths that would place an item twice, hang it under
/// a parent whose own path disagrees, or leave it unreachable from the roots.
#[derive(Debug, Clone, Default)]
pub struct ChildrenIndex {
    children: HashMap<(String, usize), BTreeSet<String>>,
    parent_of: HashMap<String, (String, usize)>,
    roots: BTreeSet<String>,
    depth: usize,
}

impl ChildrenIndex {
    /// Build the index and check that it describes a tree.
    pub fn build(paths: &HierarchyPaths) -> Result<Self> {
        let mut index = ChildrenIndex {
            roots: paths.roots(),
            depth: paths.depth(),
            ..Default::default()
        };

        for (id, path) in paths.iter() {
            if path.is_empty() {
                return Err(Error::inconsistent(id, "empty path"));
            }
            let len = path.len();
            for (level, parent) in path.iter().enumerate() {
                let registers = level + 1 == len || path[level + 1] == id;
                if registers && parent != id {
                    index.register(id, parent, level)?;
                }
            }
        }

        index.check(paths)?;
        debug!(
            items = paths.len(),
            groups = index.children.len(),
            roots = index.roots.len(),
            depth = index.depth,
            "built children index"
        );
        Ok(index)
    }

    fn register(&mut self, id: &str, parent: &str, level: usize) -> Result<()> {
        if let Some((p, l)) = self.parent_of.get(id) {
            return Err(Error::inconsistent(
                id,
                format!("child of both '{p}' at level {l} and '{parent}' at level {level}"),
            ));
        }
        self.parent_of
            .insert(id.to_string(), (parent.to_string(), level));
        self.children
            .entry((parent.to_string(), level))
            .or_default()
            .insert(id.to_string());
        Ok(())
    }

    fn check(&self, paths: &HierarchyPaths) -> Result<()> {
        for root in &self.roots {
            if let Some((p, l)) = self.parent_of.get(root) {
                return Err(Error::inconsistent(
                    root,
                    format!("root is also a child of '{p}' at level {l}"),
                ));
            }
        }

        for (id, (parent, level)) in &self.parent_of {
            if let (Some(parent_path), Some(path)) = (paths.get(parent), paths.get(id)) {
                // A cluster's own path may stop at its parent (`D: R` for `C: R.D`).
                let shared = parent_path.len().min(level + 1);
                let agrees = parent_path[..shared] == path[..shared];
                if !agrees {
                    return Err(Error::inconsistent(
                        id,
                        format!("path does not extend the path of its parent '{parent}'"),
                    ));
                }
            }
            if *level > 0 {
                match self.parent_of.get(parent) {
                    Some((_, l)) if l + 1 == *level => {}
                    Some((_, l)) => {
                        return Err(Error::inconsistent(
                            id,
                            format!(
                                "parent '{parent}' sits at level {} but is expected at level {}",
                                l + 1,
                                level
                            ),
                        ))
                    }
                    None => {
                        return Err(Error::inconsistent(
                            id,
                            format!("parent '{parent}' is not reachable from any root"),
                        ))
                    }
                }
            }
        }

        for id in paths.ids() {
            if !self.roots.contains(id) && !self.parent_of.contains_key(id) {
                return Err(Error::inconsistent(id, "item is not reachable from any root"));
            }
        }
        Ok(())
    }

    /// Direct children of `parent` at `level`; empty if there are none.
    pub fn children_of(&self, parent: &str, level: usize) -> &BTreeSet<String> {
        self.children
            .get(&(parent.to_string(), level))
            .unwrap_or(&NO_CHILDREN)
    }

    /// Parent and level under which `id` is registered.
    pub fn parent_of(&self, id: &str) -> Option<(&str, usize)> {
        self.parent_of.get(id).map(|(p, l)| (p.as_str(), *l))
    }

    /// Top-level ids, sorted.
    pub fn roots(&self) -> &BTreeSet<String> {
        &self.roots
    }

    /// Length of the longest path.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of non-empty `(parent, level)` groups.
    pub fn n_groups(&self) -> usize {
        self.children.len()
    }

    /// Every id that receives a coordinate: the roots plus all children.
    pub fn nodes(&self) -> BTreeSet<&str> {
        self.roots
            .iter()
            .map(String::as_str)
            .chain(self.parent_of.keys().map(String::as_str))
            .collect()
    }
}
