//! Top-down embedding of a whole hierarchy.
//!
//! The roots are placed first. Each placed node's children then form the next
//! sibling group, one level down, placed against the coordinates already
//! fixed above them:
//!
//! ```text
//! level 0:  place {R}
//! level 1:  place children(R, 0) = {A, B, D}
//! level 2:  place children(D, 1) = {C}
//! ```
//!
//! A parent's group is always finalized before any of its descendants is
//! touched, and the parent's fixed coordinate anchors its children's solve.
//! The walk keeps an explicit stack, so depth is bounded by memory rather
//! than by the call stack; groups are visited in the same pre-order a
//! recursive walk would produce.

use rand::Rng;
use tracing::info;

use crate::distance::DistanceOracle;
use crate::error::Result;
use crate::hierarchy::ChildrenIndex;
use crate::spe::{BatchReport, CoordinateStore, SpeSolver};

/// One sibling group placed during a walk.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupReport {
    /// Parent of the group, `None` for the top-level group.
    pub parent: Option<String>,
    /// Level of the group's members.
    pub level: usize,
    /// Members, in placement order.
    pub members: Vec<String>,
    /// Solver outcome.
    pub batch: BatchReport,
}

/// Result of embedding a hierarchy.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Fixed coordinate of every placed node.
    pub coordinates: CoordinateStore,
    /// Groups in the order they were placed.
    pub groups: Vec<GroupReport>,
}

impl Layout {
    /// Largest per-group stress, ignoring unconstrained groups.
    pub fn worst_stress(&self) -> Option<f64> {
        self.groups
            .iter()
            .filter_map(|g| g.batch.stress)
            .fold(None, |acc, s| Some(acc.map_or(s, |m: f64| m.max(s))))
    }
}

/// Walks a [`ChildrenIndex`] top-down, placing each sibling group with SPE.
#[derive(Debug)]
pub struct RecursiveEmbedder<'a, O: ?Sized> {
    solver: SpeSolver,
    index: &'a ChildrenIndex,
    oracle: &'a O,
}

impl<'a, O> RecursiveEmbedder<'a, O>
where
    O: DistanceOracle + ?Sized,
{
    /// Create an embedder over a hierarchy and a distance oracle.
    pub fn new(solver: SpeSolver, index: &'a ChildrenIndex, oracle: &'a O) -> Self {
        Self {
            solver,
            index,
            oracle,
        }
    }

    /// Embed the whole hierarchy, starting from its roots at level 0.
    pub fn embed_all<R: Rng>(&self, rng: &mut R) -> Result<Layout> {
        let roots: Vec<&str> = self.index.roots().iter().map(String::as_str).collect();
        let mut coordinates = CoordinateStore::new();
        let groups = if roots.is_empty() {
            Vec::new()
        } else {
            self.embed(&roots, 0, &mut coordinates, rng)?
        };

        info!(
            placed = coordinates.len(),
            groups = groups.len(),
            depth = self.index.depth(),
            "embedded hierarchy"
        );
        Ok(Layout {
            coordinates,
            groups,
        })
    }

    /// Place `node_ids` at `level`, then every group below them.
    ///
    /// Coordinates already in `store` are never changed. Each child group is
    /// solved with its parent as an anchor.
    pub fn embed<R: Rng>(
        &self,
        node_ids: &[&str],
        level: usize,
        store: &mut CoordinateStore,
        rng: &mut R,
    ) -> Result<Vec<GroupReport>> {
        let mut reports = Vec::new();
        let mut pending: Vec<(Option<String>, usize, Vec<String>)> = vec![(
            None,
            level,
            node_ids.iter().map(|id| id.to_string()).collect(),
        )];

        while let Some((parent, level, members)) = pending.pop() {
            let ids: Vec<&str> = members.iter().map(String::as_str).collect();
            let anchors: Vec<&str> = parent.as_deref().into_iter().collect();
            let batch = self.solver.place(&ids, &anchors, self.oracle, store, rng)?;

            for id in members.iter().rev() {
                let children = self.index.children_of(id, level);
                if !children.is_empty() {
                    pending.push((Some(id.clone()), level + 1, children.iter().cloned().collect()));
                }
            }
            reports.push(GroupReport {
                parent,
                level,
                members,
                batch,
            });
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::SimilarityGraph;
    use crate::error::Error;
    use crate::hierarchy::HierarchyPaths;
    use crate::spe::SpeConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn scenario() -> ChildrenIndex {
        let paths: HierarchyPaths = [
            ("A", vec!["R"]),
            ("B", vec!["R"]),
            ("C", vec!["R", "D"]),
            ("D", vec!["R", "D"]),
        ]
        .into_iter()
        .collect();
        ChildrenIndex::build(&paths).unwrap()
    }

    fn solver() -> SpeSolver {
        SpeSolver::new(SpeConfig::default().with_cycles(20)).unwrap()
    }

    #[test]
    fn scenario_places_every_node_once() {
        let index = scenario();
        let distances = SimilarityGraph::new().into_distances();
        let embedder = RecursiveEmbedder::new(solver(), &index, &distances);
        let layout = embedder.embed_all(&mut StdRng::seed_from_u64(1)).unwrap();

        let placed: BTreeSet<&str> = layout.coordinates.iter().map(|(id, _)| id).collect();
        assert_eq!(placed, ["A", "B", "C", "D", "R"].into_iter().collect());

        let levels: Vec<(Option<&str>, usize, Vec<&str>)> = layout
            .groups
            .iter()
            .map(|g| {
                (
                    g.parent.as_deref(),
                    g.level,
                    g.members.iter().map(String::as_str).collect(),
                )
            })
            .collect();
        assert_eq!(
            levels,
            vec![
                (None, 0, vec!["R"]),
                (Some("R"), 1, vec!["A", "B", "D"]),
                (Some("D"), 2, vec!["C"]),
            ]
        );

        let total: usize = layout.groups.iter().map(|g| g.members.len()).sum();
        assert_eq!(total, layout.coordinates.len());
    }

    #[test]
    fn groups_follow_preorder() {
        let paths: HierarchyPaths = [
            ("a", vec!["r", "a"]),
            ("b", vec!["r", "b"]),
            ("a1", vec!["r", "a", "a1"]),
            ("a2", vec!["r", "a", "a2"]),
            ("b1", vec!["r", "b", "b1"]),
            ("x", vec!["r", "a", "a1", "x"]),
        ]
        .into_iter()
        .collect();
        let index = ChildrenIndex::build(&paths).unwrap();
        let distances = SimilarityGraph::new().into_distances();
        let layout = RecursiveEmbedder::new(solver(), &index, &distances)
            .embed_all(&mut StdRng::seed_from_u64(2))
            .unwrap();

        let parents: Vec<Option<&str>> = layout.groups.iter().map(|g| g.parent.as_deref()).collect();
        assert_eq!(parents, vec![None, Some("r"), Some("a"), Some("a1"), Some("b")]);
    }

    #[test]
    fn fixed_parents_stay_put_while_children_are_placed() {
        let index = scenario();
        let graph: SimilarityGraph =
            [("A", "B", 3.0), ("B", "D", 1.0), ("D", "C", 2.0), ("C", "R", 5.0)]
                .into_iter()
                .collect();
        let distances = graph.into_distances();
        let embedder = RecursiveEmbedder::new(solver(), &index, &distances);

        let mut store = CoordinateStore::new();
        store.fix("R", [0.5, 0.5, 0.5]);
        store.fix("D", [2.0, 2.0, 2.0]);
        let mut rng = StdRng::seed_from_u64(3);
        embedder.embed(&["R"], 0, &mut store, &mut rng).unwrap();

        assert_eq!(store.get("R"), Some([0.5, 0.5, 0.5]));
        assert_eq!(store.get("D"), Some([2.0, 2.0, 2.0]));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn children_are_placed_around_their_parent() {
        let index = scenario();
        let graph: SimilarityGraph = [("D", "C", 10.0), ("A", "B", 2.0)].into_iter().collect();
        let distances = graph.into_distances();
        let embedder = RecursiveEmbedder::new(solver(), &index, &distances);

        let mut store = CoordinateStore::new();
        store.fix("D", [5.0, 5.0, 5.0]);
        let reports = embedder
            .embed(&["R"], 0, &mut store, &mut StdRng::seed_from_u64(6))
            .unwrap();

        let c = store.get("C").unwrap();
        let dist = c.iter().map(|v| (v - 5.0).powi(2)).sum::<f64>().sqrt();
        assert!(dist < 0.1, "C at {c:?}, {dist} from D");

        let group = reports.iter().find(|g| g.parent.as_deref() == Some("D")).unwrap();
        assert_eq!(group.members, vec!["C"]);
        assert_eq!(group.batch.size, 1);
        assert_eq!(group.batch.constraints, 2);
    }

    #[test]
    fn same_seed_same_layout() {
        let index = scenario();
        let graph: SimilarityGraph = [("A", "B", 3.0), ("B", "D", 1.0)].into_iter().collect();
        let distances = graph.into_distances();
        let embedder = RecursiveEmbedder::new(solver(), &index, &distances);

        let a = embedder.embed_all(&mut StdRng::seed_from_u64(9)).unwrap();
        let b = embedder.embed_all(&mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.coordinates, b.coordinates);
    }

    #[test]
    fn empty_start_group_is_rejected() {
        let index = scenario();
        let distances = SimilarityGraph::new().into_distances();
        let embedder = RecursiveEmbedder::new(solver(), &index, &distances);
        let mut store = CoordinateStore::new();
        let result = embedder.embed(&[], 0, &mut store, &mut StdRng::seed_from_u64(4));
        assert!(matches!(result, Err(Error::EmptyBatch)));
    }

    #[test]
    fn empty_hierarchy_places_nothing() {
        let index = ChildrenIndex::build(&HierarchyPaths::new()).unwrap();
        let distances = SimilarityGraph::new().into_distances();
        let layout = RecursiveEmbedder::new(solver(), &index, &distances)
            .embed_all(&mut StdRng::seed_from_u64(5))
            .unwrap();
        assert!(layout.coordinates.is_empty());
        assert_eq!(layout.worst_stress(), None);
    }
}
