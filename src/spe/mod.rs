//! Stochastic proximity embedding of sibling groups.
//!
//! SPE places points so that their Euclidean distances approximate a set of
//! target dissimilarities. It needs no full distance matrix: each update uses
//! a single randomly drawn pair, and pairs without a target are skipped.
//!
//! # Write scope
//!
//! A solve reads the [`CoordinateStore`] and writes only the ids of its own
//! batch, each at most once. Ids fixed by an earlier solve keep their
//! coordinate for the rest of the run.
//!
//! # References
//!
//! - Agrafiotis, D. K. (2003). "Stochastic proximity embedding."
//!   Journal of Computational Chemistry 24(10), 1215–1221.

mod config;
mod solver;
mod store;

pub use config::SpeConfig;
pub use solver::{stress, BatchReport, SpeSolver};
pub use store::{CoordinateStore, Point};
