use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hspe::{Inputs, LayoutConfig, Workflow};
use tracing_subscriber::EnvFilter;

/// Create input files for the hierarchical cluster viewer.
#[derive(Parser, Debug)]
#[command(name = "hspe", version, about)]
struct Cli {
    /// Similarity graph in edge-list format (`id1 id2 score`)
    #[arg(short = 'i', long = "graph")]
    graph: PathBuf,

    /// Hierarchical clusters (`path id`)
    #[arg(short = 'c', long = "clusters")]
    clusters: PathBuf,

    /// Cluster metadata (`id "line1" "line2" ...`)
    #[arg(short = 'm', long = "meta")]
    meta: Option<PathBuf>,

    /// Base directory to store output files (replaced if it exists)
    #[arg(short = 'd', long = "base-dir")]
    base_dir: PathBuf,

    /// Property intensities per item (`id v1 v2 ... vN`)
    #[arg(short = 'p', long = "properties")]
    properties: Option<PathBuf>,

    /// JSON file with the property names, copied into the output
    #[arg(long)]
    property_names: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for a reproducible layout
    #[arg(long)]
    seed: Option<u64>,

    /// Number of SPE cycles per sibling group
    #[arg(long)]
    cycles: Option<usize>,

    /// Also write smalldata.json so the viewer can load every level at once
    #[arg(long)]
    small_data: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => LayoutConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => LayoutConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.spe.seed = Some(seed);
    }
    if let Some(cycles) = cli.cycles {
        config.spe.cycles = cycles;
    }
    if cli.small_data {
        config.big_data_mode = false;
    }

    let inputs = Inputs {
        similarity_graph: cli.graph,
        hierarchy: cli.clusters,
        metadata: cli.meta,
        property_intensities: cli.properties,
        property_names: cli.property_names,
    };

    let workflow = Workflow::new(config).context("invalid configuration")?;
    let summary = workflow
        .run(&inputs, &cli.base_dir)
        .with_context(|| format!("layout into {} failed", cli.base_dir.display()))?;

    println!(
        "placed {} nodes in {} groups ({} similarity pairs), wrote {} files",
        summary.placed, summary.groups, summary.pairs, summary.written.files
    );
    if let Some(stress) = summary.worst_stress {
        println!("worst group stress: {stress:.4}");
    }
    Ok(())
}
