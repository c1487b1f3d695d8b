//! Reading the input files and writing the viewer's output tree.

mod readers;
mod writer;

pub use readers::{
    open, read_hierarchy, read_metadata, read_property_intensities, read_similarity_graph,
};
pub use writer::{point_records, LayoutWriter, PointRecord, WriteSummary};
