//! Fixed coordinates, grown monotonically over an embedding run.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use ndarray::ArrayView2;

/// A point in 3-D space.
pub type Point = [f64; 3];

/// Finalized coordinates, keyed by item id.
///
/// An id is fixed at most once; later writes for the same id are ignored.
/// The solver commits only the ids of the batch it was given, so a parent's
/// coordinate can never move while its children are being placed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateStore {
    fixed: HashMap<String, Point>,
}

impl CoordinateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the coordinate of `id` if it is not fixed yet.
    ///
    /// Returns `false` (and keeps the old value) when `id` was already fixed.
    pub fn fix(&mut self, id: impl Into<String>, point: Point) -> bool {
        match self.fixed.entry(id.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(point);
                true
            }
        }
    }

    /// Write back the solved positions of one batch; row `i` belongs to `ids[i]`.
    pub(super) fn commit(&mut self, ids: &[&str], positions: ArrayView2<'_, f64>) {
        for (id, row) in ids.iter().zip(positions.outer_iter()) {
            self.fix(*id, [row[0], row[1], row[2]]);
        }
    }

    /// Coordinate of `id`, if fixed.
    pub fn get(&self, id: &str) -> Option<Point> {
        self.fixed.get(id).copied()
    }

    /// Whether `id` is fixed.
    pub fn contains(&self, id: &str) -> bool {
        self.fixed.contains_key(id)
    }

    /// Number of fixed ids.
    pub fn len(&self) -> usize {
        self.fixed.len()
    }

    /// Whether nothing is fixed yet.
    pub fn is_empty(&self) -> bool {
        self.fixed.is_empty()
    }

    /// Iterate `(id, point)` in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Point)> + '_ {
        self.fixed.iter().map(|(id, p)| (id.as_str(), *p))
    }

    /// Consume the store.
    pub fn into_inner(self) -> HashMap<String, Point> {
        self.fixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn fixing_twice_keeps_first_value() {
        let mut store = CoordinateStore::new();
        assert!(store.fix("a", [1.0, 2.0, 3.0]));
        assert!(!store.fix("a", [0.0, 0.0, 0.0]));
        assert_eq!(store.get("a"), Some([1.0, 2.0, 3.0]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn commit_writes_only_batch_rows() {
        let mut store = CoordinateStore::new();
        store.fix("anchor", [9.0, 9.0, 9.0]);

        let positions = array![[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]];
        store.commit(&["x", "anchor"], positions.view());

        assert_eq!(store.get("x"), Some([0.1, 0.2, 0.3]));
        assert_eq!(store.get("anchor"), Some([9.0, 9.0, 9.0]));
        assert_eq!(store.len(), 2);
    }
}
