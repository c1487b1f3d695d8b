//! The SPE relaxation for one sibling group.

use std::collections::{HashMap, HashSet};

use ndarray::{Array2, ArrayView2};
use petgraph::algo::connected_components;
use petgraph::graph::UnGraph;
use rand::Rng;
use tracing::debug;

use super::config::SpeConfig;
use super::store::CoordinateStore;
use crate::distance::DistanceOracle;
use crate::error::{Error, Result};

/// Outcome of placing one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Number of distinct ids placed.
    pub size: usize,
    /// Ordered pairs among batch ids and anchors with a target distance.
    pub constraints: usize,
    /// Connected components of the constraint graph over batch ids and
    /// anchors.
    pub components: usize,
    /// RMS residual between embedded and target distances, if any pair is
    /// constrained.
    pub stress: Option<f64>,
}

/// Stochastic proximity embedding (Agrafiotis, 2003) over a batch of ids.
///
/// Each update draws two ids at random and moves both along the line joining
/// them, by half the discrepancy between their current and target distance,
/// scaled by a learning rate that anneals linearly to zero:
///
/// ```text
/// Δ = λ · ½ · (r_ij − d_ij) / (d_ij + ε) · (x_i − x_j)
/// x_i ← x_i + Δ        x_j ← x_j − Δ
/// ```
///
/// Ids already present in the [`CoordinateStore`], and explicit anchors
/// passed alongside the batch, take part in updates but never move.
#[derive(Debug, Clone)]
pub struct SpeSolver {
    config: SpeConfig,
}

impl SpeSolver {
    /// Create a solver, validating its parameters.
    pub fn new(config: SpeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Parameters in use.
    pub fn config(&self) -> &SpeConfig {
        &self.config
    }

    /// Place every id of `ids` and fix it in `store`.
    ///
    /// Ids not yet fixed start at a uniform random point in `[0, 1)^3`.
    /// `anchors` are fixed ids from outside the batch (typically the group's
    /// parent) that take part in pair draws so the batch is pulled towards
    /// them; anchors missing from `store` are ignored. Pairs without a target
    /// distance are never used as constraints, so a batch with no known
    /// distances keeps its random starting points. Only the batch's own ids
    /// are written to `store`.
    ///
    /// Duplicate ids are placed once. Fails with [`Error::EmptyBatch`] if
    /// `ids` is empty.
    pub fn place<O, R>(
        &self,
        ids: &[&str],
        anchors: &[&str],
        oracle: &O,
        store: &mut CoordinateStore,
        rng: &mut R,
    ) -> Result<BatchReport>
    where
        O: DistanceOracle + ?Sized,
        R: Rng,
    {
        if ids.is_empty() {
            return Err(Error::EmptyBatch);
        }
        let mut seen = HashSet::with_capacity(ids.len() + anchors.len());
        let batch: Vec<&str> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        let n = batch.len();

        // Batch rows first, then anchor rows; only the first `n` are committed.
        let mut rows = batch.clone();
        rows.extend(
            anchors
                .iter()
                .copied()
                .filter(|id| store.contains(id) && seen.insert(*id)),
        );

        let mut positions = Array2::<f64>::zeros((rows.len(), 3));
        let mut movable = vec![true; rows.len()];
        for (i, id) in rows.iter().enumerate() {
            let start = match store.get(id) {
                Some(p) => {
                    movable[i] = false;
                    p
                }
                None => [rng.random::<f64>(), rng.random::<f64>(), rng.random::<f64>()],
            };
            for (k, v) in start.into_iter().enumerate() {
                positions[[i, k]] = v;
            }
        }

        let constraints = oracle.constraints_among(&rows);
        if movable.iter().any(|&m| m) && !constraints.is_empty() {
            self.relax(&mut positions, &movable, &constraints, rng);
        }

        let report = BatchReport {
            size: n,
            constraints: constraints.len(),
            components: count_components(rows.len(), &constraints),
            stress: residual_rms(positions.view(), &constraints),
        };
        store.commit(&batch, positions.view());

        debug!(
            size = report.size,
            anchors = rows.len() - n,
            constraints = report.constraints,
            components = report.components,
            stress = ?report.stress,
            "placed batch"
        );
        Ok(report)
    }

    fn relax<R: Rng>(
        &self,
        positions: &mut Array2<f64>,
        movable: &[bool],
        constraints: &HashMap<(usize, usize), f64>,
        rng: &mut R,
    ) {
        let n = movable.len();
        let steps = self.config.steps_per_point * n;
        let eps = self.config.epsilon;

        for cycle in 0..self.config.cycles {
            let lambda = self.config.lambda_at(cycle);
            for _ in 0..steps {
                let i = rng.random_range(0..n);
                let j = rng.random_range(0..n);
                if i == j {
                    continue;
                }
                let Some(&target) = constraints.get(&(i, j)) else {
                    continue;
                };

                let diff = &positions.row(i) - &positions.row(j);
                let dist = diff.dot(&diff).sqrt();
                if dist == target {
                    continue;
                }
                let incr = diff * (lambda * 0.5 * (target - dist) / (dist + eps));

                if movable[i] {
                    let mut row = positions.row_mut(i);
                    row += &incr;
                }
                if movable[j] {
                    let mut row = positions.row_mut(j);
                    row -= &incr;
                }
            }
        }
    }
}

fn count_components(n: usize, constraints: &HashMap<(usize, usize), f64>) -> usize {
    let mut graph = UnGraph::<(), ()>::with_capacity(n, constraints.len());
    let nodes: Vec<_> = (0..n).map(|_| graph.add_node(())).collect();
    for &(i, j) in constraints.keys() {
        if i < j {
            graph.add_edge(nodes[i], nodes[j], ());
        }
    }
    connected_components(&graph)
}

fn residual_rms(
    positions: ArrayView2<'_, f64>,
    constraints: &HashMap<(usize, usize), f64>,
) -> Option<f64> {
    if constraints.is_empty() {
        return None;
    }
    let sum: f64 = constraints
        .iter()
        .map(|(&(i, j), &target)| {
            let diff = &positions.row(i) - &positions.row(j);
            let dist = diff.dot(&diff).sqrt();
            (dist - target).powi(2)
        })
        .sum();
    Some((sum / constraints.len() as f64).sqrt())
}

/// RMS residual between fixed and target distances over the constrained
/// pairs of `ids`. Ids without a fixed coordinate are ignored.
pub fn stress<O>(ids: &[&str], oracle: &O, store: &CoordinateStore) -> Option<f64>
where
    O: DistanceOracle + ?Sized,
{
    let placed: Vec<&str> = ids.iter().copied().filter(|id| store.contains(id)).collect();
    let mut positions = Array2::<f64>::zeros((placed.len(), 3));
    for (i, id) in placed.iter().enumerate() {
        if let Some(p) = store.get(id) {
            for (k, v) in p.into_iter().enumerate() {
                positions[[i, k]] = v;
            }
        }
    }
    residual_rms(positions.view(), &oracle.constraints_among(&placed))
}
