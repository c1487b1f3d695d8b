//! Line-oriented input formats.
//!
//! | Input | Line format |
//! |-------|-------------|
//! | similarity graph | `id1 id2 score` |
//! | clustering hierarchy | `root.c1.c2 id` |
//! | metadata | `id "line 1" "line 2" …` |
//! | property intensities | `id v1 v2 … vN` |
//!
//! Blank lines are skipped everywhere. Fields are separated by whitespace,
//! except in metadata, where fields are separated by single spaces and may be
//! double-quoted.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::distance::SimilarityGraph;
use crate::error::{Error, Result};
use crate::hierarchy::HierarchyPaths;

/// Open a file for one of the readers below.
pub fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

/// Call `f` with each non-blank line and its 1-based number.
fn for_each_line<R, F>(reader: R, mut f: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(usize, &str) -> Result<()>,
{
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        f(i + 1, &line)?;
    }
    Ok(())
}

fn parse_error(source: &str, line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        source_name: source.to_string(),
        line,
        message: message.into(),
    }
}

/// Read a sparse similarity graph from `id1 id2 score` lines.
///
/// A pair listed twice keeps its last score. Scores must be finite.
pub fn read_similarity_graph<R: BufRead>(reader: R, source: &str) -> Result<SimilarityGraph> {
    let mut graph = SimilarityGraph::new();
    for_each_line(reader, |n, line| {
        let mut fields = line.split_whitespace();
        let (Some(a), Some(b), Some(score)) = (fields.next(), fields.next(), fields.next()) else {
            return Err(parse_error(source, n, "expected 'id1 id2 score'"));
        };
        let score: f64 = score
            .parse()
            .map_err(|_| parse_error(source, n, format!("invalid score '{score}'")))?;
        if !score.is_finite() {
            return Err(parse_error(source, n, format!("non-finite score '{score}'")));
        }
        graph.insert(a, b, score);
        Ok(())
    })?;
    Ok(graph)
}

/// Read per-item ancestor paths from `root.c1.c2 id` lines.
pub fn read_hierarchy<R: BufRead>(reader: R, source: &str) -> Result<HierarchyPaths> {
    let mut paths = HierarchyPaths::new();
    for_each_line(reader, |n, line| {
        let mut fields = line.split_whitespace();
        let (Some(path), Some(id)) = (fields.next(), fields.next()) else {
            return Err(parse_error(source, n, "expected 'path id'"));
        };
        let path: Vec<String> = path.split('.').map(str::to_string).collect();
        if path.iter().any(String::is_empty) {
            return Err(parse_error(source, n, "empty path component"));
        }
        paths.insert(id, path);
        Ok(())
    })?;
    Ok(paths)
}

/// Read display lines per item from `id "line 1" "line 2"` lines.
pub fn read_metadata<R: BufRead>(reader: R, source: &str) -> Result<BTreeMap<String, Vec<String>>> {
    let mut metadata = BTreeMap::new();
    for_each_line(reader, |n, line| {
        let mut fields = split_quoted(line).map_err(|msg| parse_error(source, n, msg))?;
        if fields.is_empty() || fields[0].is_empty() {
            return Err(parse_error(source, n, "missing id"));
        }
        let id = fields.remove(0);
        metadata.insert(id, fields);
        Ok(())
    })?;
    Ok(metadata)
}

/// Read property intensities per item from `id v1 v2 …` lines.
///
/// Values are passed through verbatim; a line must carry at least one.
pub fn read_property_intensities<R: BufRead>(
    reader: R,
    source: &str,
) -> Result<BTreeMap<String, Vec<String>>> {
    let mut intensities = BTreeMap::new();
    for_each_line(reader, |n, line| {
        let mut fields = line.split_whitespace().map(str::to_string);
        let Some(id) = fields.next() else {
            return Err(parse_error(source, n, "missing id"));
        };
        let values: Vec<String> = fields.collect();
        if values.is_empty() {
            return Err(parse_error(source, n, format!("no intensities for '{id}'")));
        }
        intensities.insert(id, values);
        Ok(())
    })?;
    Ok(intensities)
}

/// Split on single spaces, honouring double quotes (`""` inside quotes is a
/// literal quote).
fn split_quoted(line: &str) -> std::result::Result<Vec<String>, &'static str> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut at_start = true;
    let mut chars = line.trim_end_matches(['\r', '\n']).chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if at_start => {
                in_quotes = true;
                at_start = false;
            }
            ' ' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
                at_start = true;
            }
            _ => {
                field.push(c);
                at_start = false;
            }
        }
    }
    if in_quotes {
        return Err("unterminated quoted field");
    }
    fields.push(field);
    Ok(fields)
}
