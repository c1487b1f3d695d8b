//! # hspe
//!
//! Hierarchical stochastic proximity embedding: 3-D layouts of items
//! organized in a hierarchical clustering, for visualization.
//!
//! Given a sparse similarity graph and one ancestor path per item, every node
//! of the hierarchy is placed so that strongly similar items end up close
//! together. Placement runs top-down, one sibling group at a time; a group is
//! finalized before any group below it is placed.
//!
//! ```text
//! similarity graph ──► similarity_to_distance ──► DistanceTable ─┐
//!                                                                ├─► RecursiveEmbedder ──► CoordinateStore
//! hierarchy paths  ──► ChildrenIndex::build ─────────────────────┘         │
//!                                                                          └─ SpeSolver per sibling group
//! ```
//!
//! ```rust
//! use hspe::{ChildrenIndex, HierarchyPaths, RecursiveEmbedder, SimilarityGraph, SpeConfig, SpeSolver};
//!
//! let graph: SimilarityGraph = [("A", "B", 10.0), ("B", "C", 5.0)].into_iter().collect();
//! let paths: HierarchyPaths = [
//!     ("A", vec!["R"]),
//!     ("B", vec!["R"]),
//!     ("C", vec!["R", "D"]),
//!     ("D", vec!["R", "D"]),
//! ]
//! .into_iter()
//! .collect();
//!
//! let distances = graph.into_distances();
//! let index = ChildrenIndex::build(&paths).unwrap();
//! let config = SpeConfig::default().with_seed(42);
//! let mut rng = config.rng();
//! let solver = SpeSolver::new(config).unwrap();
//!
//! let layout = RecursiveEmbedder::new(solver, &index, &distances)
//!     .embed_all(&mut rng)
//!     .unwrap();
//! assert_eq!(layout.coordinates.len(), 5); // A, B, C, D and the root R
//! ```
//!
//! The [`io`] and [`pipeline`] modules read the line-based input files and
//! write the directory tree consumed by the viewer.

pub mod config;
pub mod distance;
pub mod embed;
/// Error types used across `hspe`.
pub mod error;
pub mod hierarchy;
pub mod io;
pub mod pipeline;
pub mod spe;

pub use config::LayoutConfig;
pub use distance::{similarity_to_distance, DistanceOracle, DistanceTable, SimilarityGraph};
pub use embed::{GroupReport, Layout, RecursiveEmbedder};
pub use error::{Error, Result};
pub use hierarchy::{ChildrenIndex, HierarchyPaths};
pub use pipeline::{Inputs, RunSummary, Workflow};
pub use spe::{stress, BatchReport, CoordinateStore, Point, SpeConfig, SpeSolver};
