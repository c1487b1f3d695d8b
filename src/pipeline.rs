//! End-to-end run: read inputs, embed, write the viewer tree.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::LayoutConfig;
use crate::distance::SimilarityGraph;
use crate::embed::{Layout, RecursiveEmbedder};
use crate::error::{Error, Result};
use crate::hierarchy::{ChildrenIndex, HierarchyPaths};
use crate::io::{self, LayoutWriter, WriteSummary};
use crate::spe::SpeSolver;

/// Input files of a run. Only the graph and hierarchy are required.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    /// `id1 id2 score` edge list.
    pub similarity_graph: PathBuf,
    /// `path id` hierarchy.
    pub hierarchy: PathBuf,
    /// `id "line" …` display lines.
    pub metadata: Option<PathBuf>,
    /// `id v1 … vN` property intensities.
    pub property_intensities: Option<PathBuf>,
    /// JSON list of property names, copied into the output.
    pub property_names: Option<PathBuf>,
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Items in the hierarchy.
    pub items: usize,
    /// Nodes placed (items plus roots that are not items).
    pub placed: usize,
    /// Sibling groups embedded.
    pub groups: usize,
    /// Distinct pairs in the similarity graph.
    pub pairs: usize,
    /// Largest per-group stress.
    pub worst_stress: Option<f64>,
    /// Output files and directories.
    pub written: WriteSummary,
}

/// Read → convert → index → embed → write.
#[derive(Debug, Clone)]
pub struct Workflow {
    config: LayoutConfig,
    solver: SpeSolver,
}

impl Workflow {
    /// Create a workflow, validating the solver parameters.
    pub fn new(config: LayoutConfig) -> Result<Self> {
        let solver = SpeSolver::new(config.spe.clone())?;
        Ok(Self { config, solver })
    }

    /// Configuration in use.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Embed an in-memory graph and hierarchy.
    ///
    /// The similarity graph is converted to distances here, exactly once.
    pub fn layout(
        &self,
        graph: SimilarityGraph,
        paths: &HierarchyPaths,
    ) -> Result<(ChildrenIndex, Layout)> {
        if graph.is_empty() {
            return Err(Error::EmptyInput {
                what: "similarity graph",
            });
        }
        if paths.is_empty() {
            return Err(Error::EmptyInput { what: "hierarchy" });
        }

        let index = ChildrenIndex::build(paths)?;
        let distances = graph.into_distances();
        let mut rng = self.config.spe.rng();
        let layout = RecursiveEmbedder::new(self.solver.clone(), &index, &distances)
            .embed_all(&mut rng)?;
        Ok((index, layout))
    }

    /// Run on files and write the output tree into `base_dir`.
    pub fn run(&self, inputs: &Inputs, base_dir: &Path) -> Result<RunSummary> {
        let graph = io::read_similarity_graph(
            io::open(&inputs.similarity_graph)?,
            &inputs.similarity_graph.display().to_string(),
        )?;
        let paths = io::read_hierarchy(
            io::open(&inputs.hierarchy)?,
            &inputs.hierarchy.display().to_string(),
        )?;
        let metadata = match &inputs.metadata {
            Some(path) => io::read_metadata(io::open(path)?, &path.display().to_string())?,
            None => BTreeMap::new(),
        };
        let intensities = match &inputs.property_intensities {
            Some(path) => {
                io::read_property_intensities(io::open(path)?, &path.display().to_string())?
            }
            None => BTreeMap::new(),
        };
        info!(
            pairs = graph.len(),
            items = paths.len(),
            metadata = metadata.len(),
            intensities = intensities.len(),
            "read inputs"
        );

        let pairs = graph.len();
        let (index, layout) = self.layout(graph, &paths)?;

        let records = io::point_records(&layout.coordinates, &paths, &metadata, &intensities)?;
        let mut writer = LayoutWriter::new(base_dir, &index, &records)
            .with_big_data_mode(self.config.big_data_mode);
        if let Some(names) = &inputs.property_names {
            writer = writer.with_property_names(names);
        }
        let written = writer.write()?;

        let summary = RunSummary {
            items: paths.len(),
            placed: layout.coordinates.len(),
            groups: layout.groups.len(),
            pairs,
            worst_stress: layout.worst_stress(),
            written,
        };
        info!(
            placed = summary.placed,
            groups = summary.groups,
            files = written.files,
            output = %base_dir.display(),
            "layout written"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spe::SpeConfig;

    fn workflow() -> Workflow {
        Workflow::new(LayoutConfig {
            spe: SpeConfig::default().with_cycles(10).with_seed(1),
            big_data_mode: true,
        })
        .unwrap()
    }

    fn scenario_paths() -> HierarchyPaths {
        [
            ("A", vec!["R"]),
            ("B", vec!["R"]),
            ("C", vec!["R", "D"]),
            ("D", vec!["R", "D"]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn empty_graph_is_rejected() {
        let result = workflow().layout(SimilarityGraph::new(), &scenario_paths());
        assert!(matches!(result, Err(Error::EmptyInput { .. })));
    }

    #[test]
    fn inconsistent_hierarchy_aborts_before_embedding() {
        let graph: SimilarityGraph = [("A", "B", 1.0)].into_iter().collect();
        let paths: HierarchyPaths = [("A", vec!["R"]), ("C", vec!["R", "ghost"])]
            .into_iter()
            .collect();
        let result = workflow().layout(graph, &paths);
        assert!(matches!(result, Err(Error::InconsistentHierarchy { .. })));
    }

    #[test]
    fn layout_places_scenario() {
        let graph: SimilarityGraph = [("A", "B", 10.0), ("B", "D", 5.0)].into_iter().collect();
        let (index, layout) = workflow().layout(graph, &scenario_paths()).unwrap();
        assert_eq!(index.n_groups(), 2);
        assert_eq!(layout.coordinates.len(), 5);
        assert_eq!(layout.groups.len(), 3);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = LayoutConfig {
            spe: SpeConfig::default().with_cycles(0),
            ..Default::default()
        };
        assert!(Workflow::new(config).is_err());
    }
}
