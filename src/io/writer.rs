//! Output directory tree for the viewer.
//!
//! ```text
//! out/
//! ├── data.json          top-level group
//! ├── MetaData.js        var bigData =true;
//! ├── R/
//! │   ├── data.json      children of R
//! │   └── D/
//! │       └── data.json  children of D
//! └── smalldata.json     every record (only when big-data mode is off)
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::hierarchy::{ChildrenIndex, HierarchyPaths};
use crate::spe::{CoordinateStore, Point};

/// Everything the viewer shows for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PointRecord {
    /// Ancestor path.
    pub path: Vec<String>,
    /// Fixed 3-D coordinate.
    pub coordinates: Point,
    /// Display lines.
    pub categories: Vec<String>,
    /// Property intensities, verbatim.
    pub properties: Vec<String>,
}

/// Assemble one record per item, plus one per root that is not an item.
///
/// Items without metadata or intensities get empty lists. Every item and
/// root must have a coordinate.
pub fn point_records(
    store: &CoordinateStore,
    paths: &HierarchyPaths,
    metadata: &BTreeMap<String, Vec<String>>,
    intensities: &BTreeMap<String, Vec<String>>,
) -> Result<BTreeMap<String, PointRecord>> {
    let mut records = BTreeMap::new();
    let mut missing_metadata = 0usize;

    for (id, path) in paths.iter() {
        let coordinates = store
            .get(id)
            .ok_or_else(|| Error::inconsistent(id, "item was never placed"))?;
        let categories = match metadata.get(id) {
            Some(lines) => lines.clone(),
            None => {
                missing_metadata += 1;
                Vec::new()
            }
        };
        records.insert(
            id.to_string(),
            PointRecord {
                path: path.to_vec(),
                coordinates,
                categories,
                properties: intensities.get(id).cloned().unwrap_or_default(),
            },
        );
    }

    for root in paths.roots() {
        if records.contains_key(&root) {
            continue;
        }
        let coordinates = store
            .get(&root)
            .ok_or_else(|| Error::inconsistent(root.as_str(), "root was never placed"))?;
        records.insert(
            root.clone(),
            PointRecord {
                path: vec![root],
                coordinates,
                categories: Vec::new(),
                properties: Vec::new(),
            },
        );
    }

    if missing_metadata > 0 && !metadata.is_empty() {
        warn!(items = missing_metadata, "items without metadata");
    }
    Ok(records)
}

/// Counts of what a [`LayoutWriter`] produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Files written (including copies).
    pub files: usize,
    /// Directories created below the base directory.
    pub directories: usize,
}

/// Writes point records as a directory per sibling group.
#[derive(Debug)]
pub struct LayoutWriter<'a> {
    base_dir: PathBuf,
    index: &'a ChildrenIndex,
    records: &'a BTreeMap<String, PointRecord>,
    big_data_mode: bool,
    property_names: Option<PathBuf>,
}

impl<'a> LayoutWriter<'a> {
    /// Create a writer rooted at `base_dir`.
    pub fn new(
        base_dir: impl Into<PathBuf>,
        index: &'a ChildrenIndex,
        records: &'a BTreeMap<String, PointRecord>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            index,
            records,
            big_data_mode: true,
            property_names: None,
        }
    }

    /// In big-data mode the viewer loads one level at a time; otherwise
    /// `smalldata.json` with every record is written as well.
    pub fn with_big_data_mode(mut self, on: bool) -> Self {
        self.big_data_mode = on;
        self
    }

    /// Copy a property-names file into the output.
    pub fn with_property_names(mut self, path: impl Into<PathBuf>) -> Self {
        self.property_names = Some(path.into());
        self
    }

    /// Replace `base_dir` with a fresh tree.
    pub fn write(&self) -> Result<WriteSummary> {
        if self.base_dir.exists() {
            fs::remove_dir_all(&self.base_dir)?;
        }
        fs::create_dir_all(&self.base_dir)?;
        let mut summary = WriteSummary::default();

        let roots: Vec<String> = self.index.roots().iter().cloned().collect();
        let mut pending = vec![(self.base_dir.clone(), 0usize, roots)];
        while let Some((dir, level, members)) = pending.pop() {
            self.write_group(&dir, &members)?;
            summary.files += 1;

            for id in members.iter().rev() {
                let children = self.index.children_of(id, level);
                if children.is_empty() {
                    continue;
                }
                let child_dir = dir.join(dir_name(id)?);
                fs::create_dir_all(&child_dir)?;
                summary.directories += 1;
                pending.push((child_dir, level + 1, children.iter().cloned().collect()));
            }
        }

        if !self.big_data_mode {
            write_json(&self.base_dir.join("smalldata.json"), self.records)?;
            summary.files += 1;
        }

        fs::write(
            self.base_dir.join("MetaData.js"),
            format!("var bigData ={};", self.big_data_mode),
        )?;
        summary.files += 1;

        if let Some(src) = &self.property_names {
            let name = src.file_name().ok_or(Error::InvalidParameter {
                name: "property_names",
                message: "path has no file name",
            })?;
            fs::copy(src, self.base_dir.join(name))?;
            summary.files += 1;
        }

        debug!(
            base_dir = %self.base_dir.display(),
            files = summary.files,
            directories = summary.directories,
            "wrote layout"
        );
        Ok(summary)
    }

    fn write_group(&self, dir: &Path, members: &[String]) -> Result<()> {
        let mut group = BTreeMap::new();
        for id in members {
            let record = self
                .records
                .get(id)
                .ok_or_else(|| Error::inconsistent(id, "no point record"))?;
            group.insert(id.as_str(), record);
        }
        write_json(&dir.join("data.json"), &group)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut out, value)?;
    out.flush()?;
    Ok(())
}

/// Node ids become directory names; refuse anything that would escape.
fn dir_name(id: &str) -> Result<&str> {
    let unsafe_id = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\'])
        || id.contains('\0');
    if unsafe_id {
        return Err(Error::UnsafeId { id: id.to_string() });
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scenario() -> (HierarchyPaths, ChildrenIndex, CoordinateStore) {
        let paths: HierarchyPaths = [
            ("A", vec!["R"]),
            ("B", vec!["R"]),
            ("C", vec!["R", "D"]),
            ("D", vec!["R", "D"]),
        ]
        .into_iter()
        .collect();
        let index = ChildrenIndex::build(&paths).unwrap();
        let mut store = CoordinateStore::new();
        for (i, id) in ["A", "B", "C", "D", "R"].into_iter().enumerate() {
            store.fix(id, [i as f64, 0.0, 0.0]);
        }
        (paths, index, store)
    }

    fn read(path: &Path) -> BTreeMap<String, PointRecord> {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn records_cover_items_and_roots() {
        let (paths, _, store) = scenario();
        let metadata: BTreeMap<String, Vec<String>> =
            [("A".to_string(), vec!["alpha".to_string()])].into_iter().collect();
        let records = point_records(&store, &paths, &metadata, &BTreeMap::new()).unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(records["A"].categories, vec!["alpha"]);
        assert!(records["B"].categories.is_empty());
        assert_eq!(records["R"].path, vec!["R"]);
        assert_eq!(records["C"].coordinates, [2.0, 0.0, 0.0]);
    }

    #[test]
    fn record_json_uses_viewer_keys() {
        let record = PointRecord {
            path: vec!["R".into()],
            coordinates: [0.5, 0.25, 1.0],
            categories: vec!["x".into()],
            properties: vec!["1".into()],
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"Path":["R"],"Coordinates":[0.5,0.25,1.0],"Categories":["x"],"Properties":["1"]}"#
        );
    }

    #[test]
    fn unplaced_item_is_an_error() {
        let (paths, _, _) = scenario();
        let result = point_records(&CoordinateStore::new(), &paths, &BTreeMap::new(), &BTreeMap::new());
        assert!(matches!(result, Err(Error::InconsistentHierarchy { .. })));
    }

    #[test]
    fn writes_one_directory_per_group() {
        let (paths, index, store) = scenario();
        let records = point_records(&store, &paths, &BTreeMap::new(), &BTreeMap::new()).unwrap();
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");

        let names = tmp.path().join("NamesOfProperties.json");
        fs::write(&names, r#"[["Age", "Size"]]"#).unwrap();

        let summary = LayoutWriter::new(&out, &index, &records)
            .with_big_data_mode(false)
            .with_property_names(&names)
            .write()
            .unwrap();

        let top = read(&out.join("data.json"));
        assert_eq!(top.keys().collect::<Vec<_>>(), vec!["R"]);
        let level1 = read(&out.join("R").join("data.json"));
        assert_eq!(level1.keys().collect::<Vec<_>>(), vec!["A", "B", "D"]);
        let level2 = read(&out.join("R").join("D").join("data.json"));
        assert_eq!(level2.keys().collect::<Vec<_>>(), vec!["C"]);

        assert_eq!(read(&out.join("smalldata.json")).len(), 5);
        assert_eq!(
            fs::read_to_string(out.join("MetaData.js")).unwrap(),
            "var bigData =false;"
        );
        assert!(out.join("NamesOfProperties.json").exists());
        assert_eq!(summary, WriteSummary { files: 6, directories: 2 });
    }

    #[test]
    fn rewrites_existing_output() {
        let (paths, index, store) = scenario();
        let records = point_records(&store, &paths, &BTreeMap::new(), &BTreeMap::new()).unwrap();
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("stale.txt"), "old").unwrap();

        LayoutWriter::new(tmp.path(), &index, &records).write().unwrap();

        assert!(!tmp.path().join("stale.txt").exists());
        assert!(!tmp.path().join("smalldata.json").exists());
        assert_eq!(
            fs::read_to_string(tmp.path().join("MetaData.js")).unwrap(),
            "var bigData =true;"
        );
    }

    #[test]
    fn path_like_ids_are_refused() {
        assert!(dir_name("cluster_7").is_ok());
        assert!(matches!(dir_name(".."), Err(Error::UnsafeId { .. })));
        assert!(matches!(dir_name("a/b"), Err(Error::UnsafeId { .. })));
    }
}
