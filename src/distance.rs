//! Similarity graphs and the distances derived from them.
//!
//! The similarity graph is sparse: most pairs of items have no recorded
//! relationship. A missing pair means "no constraint", never distance 0.
//!
//! # Conversion
//!
//! Scores are rescaled against the largest observed score:
//!
//! ```text
//! d(a, b) = 1 - s(a, b) / max(s)      if max(s) > 0
//! d(a, b) = 1                         otherwise
//! ```
//!
//! The most similar pair lands at distance 0; a pair with similarity 0 lands
//! at distance 1. Negative scores are clamped to distance 1.
//! [`SimilarityGraph`] and [`DistanceTable`] are distinct types, so a table
//! cannot be converted twice.
//!
//! # Pair keys
//!
//! Pairs are unordered. Both tables store each pair under both orientations,
//! so lookups never depend on the order in which an edge was inserted.

use std::collections::HashMap;

use tracing::warn;

/// Undirected pair storage shared by similarity and distance tables.
#[derive(Debug, Clone, Default)]
struct PairMap {
    adjacency: HashMap<String, HashMap<String, f64>>,
    n_pairs: usize,
}

impl PairMap {
    fn insert(&mut self, a: &str, b: &str, value: f64) -> Option<f64> {
        let previous = self
            .adjacency
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string(), value);
        self.adjacency
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string(), value);
        if previous.is_none() {
            self.n_pairs += 1;
        }
        previous
    }

    fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.adjacency.get(a).and_then(|nbrs| nbrs.get(b)).copied()
    }

    fn neighbors<'a>(&'a self, a: &str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.adjacency
            .get(a)
            .into_iter()
            .flat_map(|nbrs| nbrs.iter().map(|(b, &v)| (b.as_str(), v)))
    }

    /// Each unordered pair exactly once, smaller id first.
    fn pairs(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.adjacency.iter().flat_map(|(a, nbrs)| {
            nbrs.iter()
                .filter(move |(b, _)| a.as_str() <= b.as_str())
                .map(move |(b, &v)| (a.as_str(), b.as_str(), v))
        })
    }

    fn map_values(&mut self, f: impl Fn(f64) -> f64) {
        for nbrs in self.adjacency.values_mut() {
            for value in nbrs.values_mut() {
                *value = f(*value);
            }
        }
    }
}

/// Raw pairwise similarity scores, as read from an edge list.
#[derive(Debug, Clone, Default)]
pub struct SimilarityGraph {
    pairs: PairMap,
}

impl SimilarityGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the similarity of an unordered pair.
    ///
    /// Returns the previous score if the pair was already present (in either
    /// orientation); the new score replaces it.
    pub fn insert(&mut self, a: &str, b: &str, score: f64) -> Option<f64> {
        self.pairs.insert(a, b, score)
    }

    /// Similarity of a pair, in either orientation.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.pairs.get(a, b)
    }

    /// Number of distinct unordered pairs.
    pub fn len(&self) -> usize {
        self.pairs.n_pairs
    }

    /// Whether the graph has no edges.
    pub fn is_empty(&self) -> bool {
        self.pairs.n_pairs == 0
    }

    /// Iterate each unordered pair once.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.pairs.pairs()
    }

    /// Largest score, or 0 for an empty graph.
    pub fn max_score(&self) -> f64 {
        self.pairs
            .pairs()
            .map(|(_, _, s)| s)
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |m| m.max(s))))
            .unwrap_or(0.0)
    }

    /// Convert to distances. See [`similarity_to_distance`].
    pub fn into_distances(self) -> DistanceTable {
        similarity_to_distance(self)
    }
}

impl<S: AsRef<str>> FromIterator<(S, S, f64)> for SimilarityGraph {
    fn from_iter<I: IntoIterator<Item = (S, S, f64)>>(iter: I) -> Self {
        let mut graph = SimilarityGraph::new();
        for (a, b, score) in iter {
            graph.insert(a.as_ref(), b.as_ref(), score);
        }
        graph
    }
}

/// Rescale similarity scores into dissimilarities in `[0, 1]`.
///
/// No pair is added or removed. If the largest score is not positive
/// (including an empty graph), every pair becomes distance 1.
pub fn similarity_to_distance(graph: SimilarityGraph) -> DistanceTable {
    let mut pairs = graph.pairs;
    let max = pairs.pairs().map(|(_, _, s)| s).fold(0.0f64, f64::max);

    if max > 0.0 {
        pairs.map_values(|s| (1.0 - s / max).clamp(0.0, 1.0));
    } else {
        if pairs.n_pairs > 0 {
            warn!(
                pairs = pairs.n_pairs,
                "no positive similarity score; all pairs set to maximal distance"
            );
        }
        pairs.map_values(|_| 1.0);
    }

    DistanceTable { pairs }
}

/// Normalized dissimilarities, queried by the SPE solver.
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    pairs: PairMap,
}

impl DistanceTable {
    /// Number of distinct unordered pairs.
    pub fn len(&self) -> usize {
        self.pairs.n_pairs
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.pairs.n_pairs == 0
    }

    /// Iterate each unordered pair once.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.pairs.pairs()
    }
}

/// Target distances over pairs of item ids.
pub trait DistanceOracle {
    /// Target distance for a pair, or `None` if the pair is unconstrained.
    fn distance(&self, a: &str, b: &str) -> Option<f64>;

    /// All constrained ordered pairs `(i, j, d)` among `ids`, as positions
    /// into `ids`. Self pairs are excluded.
    ///
    /// The default probes every pair; implementations with adjacency
    /// information should override it.
    fn constraints_among(&self, ids: &[&str]) -> HashMap<(usize, usize), f64> {
        let mut out = HashMap::new();
        for (i, a) in ids.iter().enumerate() {
            for (j, b) in ids.iter().enumerate() {
                if i == j {
                    continue;
                }
                if let Some(d) = self.distance(a, b) {
                    out.insert((i, j), d);
                }
            }
        }
        out
    }
}

impl DistanceOracle for DistanceTable {
    fn distance(&self, a: &str, b: &str) -> Option<f64> {
        self.pairs.get(a, b)
    }

    fn constraints_among(&self, ids: &[&str]) -> HashMap<(usize, usize), f64> {
        let position: HashMap<&str, usize> =
            ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let mut out = HashMap::new();
        for (i, a) in ids.iter().enumerate() {
            for (b, d) in self.pairs.neighbors(a) {
                if let Some(&j) = position.get(b) {
                    if i != j {
                        out.insert((i, j), d);
                    }
                }
            }
        }
        out
    }
}
