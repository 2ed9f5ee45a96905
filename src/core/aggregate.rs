//! Schema aggregation over a plugin directory.
//!
//! Walks the tree, extracts every candidate file, and merges the results into
//! one mapping. Files are visited in directory-walk order and a later file
//! overwrites an earlier definition of the same key. Per-file failures never
//! abort the walk; they are collected as issues and listed in the report.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use glob::Pattern;
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{EXCLUDED_FILE_NAMES, SOURCE_EXTENSION, TEST_FILE_PREFIXES};
use crate::core::extract::{SchemaExtractor, TypeTables};
use crate::core::parsers::python::parse_python_source;
use crate::core::schema::{NodeMap, normalize_node_map};
use crate::issues::{Issue, ParseFailureIssue};

/// Result of scanning a plugin directory.
#[derive(Debug)]
pub struct ScanResult {
    /// Candidate files in walk order.
    pub files: Vec<PathBuf>,
    /// Entries that could not be read during the walk.
    pub skipped_count: usize,
}

/// Enumerate candidate source files under `root`.
///
/// Fails only if `root` is missing or not a directory.
pub fn scan_source_files(root: &Path, ignore_patterns: &[Pattern]) -> Result<ScanResult> {
    if !root.exists() {
        bail!("Directory not found: {}", root.display());
    }
    if !root.is_dir() {
        bail!("Not a directory: {}", root.display());
    }

    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let mut files = Vec::new();
    let mut skipped_count = 0;

    for entry in WalkDir::new(&root) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                skipped_count += 1;
                warn!("Cannot access path: {}", e);
                continue;
            }
        };
        let path = entry.path();
        let path_str = path.to_string_lossy();

        if ignore_patterns.iter().any(|p| p.matches(&path_str)) {
            continue;
        }

        if entry.file_type().is_file() && is_candidate_file(path) {
            files.push(path.to_path_buf());
        }
    }

    Ok(ScanResult {
        files,
        skipped_count,
    })
}

fn is_candidate_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION)
        && !EXCLUDED_FILE_NAMES.contains(&name)
        && !TEST_FILE_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Debug report persisted next to the extraction artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectionReport {
    pub total_files: usize,
    pub processed_files: usize,
    pub found_nodes: usize,
    pub file_details: Vec<FileDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FileDetail {
    Parsed {
        file: String,
        nodes_found: usize,
        node_names: Vec<String>,
    },
    Failed {
        file: String,
        error: String,
    },
}

/// Combined output of one aggregation.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub nodes: NodeMap,
    pub report: DetectionReport,
    /// Parse failures, one per skipped file.
    pub issues: Vec<Issue>,
    /// Set when the directory itself could not be scanned.
    pub scan_error: Option<String>,
}

pub struct SchemaAggregator<'a> {
    tables: &'a TypeTables,
    ignore_patterns: &'a [Pattern],
}

impl<'a> SchemaAggregator<'a> {
    pub fn new(tables: &'a TypeTables, ignore_patterns: &'a [Pattern]) -> Self {
        Self {
            tables,
            ignore_patterns,
        }
    }

    pub fn aggregate(&self, root: &Path) -> Aggregation {
        let scan = match scan_source_files(root, self.ignore_patterns) {
            Ok(scan) => scan,
            Err(e) => {
                warn!("{}", e);
                return Aggregation {
                    scan_error: Some(e.to_string()),
                    ..Default::default()
                };
            }
        };

        if scan.skipped_count > 0 {
            warn!(
                "{}: {} path(s) could not be accessed",
                root.display(),
                scan.skipped_count
            );
        }

        let extractor = SchemaExtractor::new(self.tables);
        let mut aggregation = Aggregation::default();
        aggregation.report.total_files = scan.files.len();

        for file in &scan.files {
            let file_name = file.to_string_lossy().to_string();
            match self.extract_file(&extractor, file) {
                Ok(nodes) => {
                    debug!("{}: {} node(s)", file_name, nodes.len());
                    aggregation.report.processed_files += 1;
                    // Counts every definition, including ones a later file overrides.
                    aggregation.report.found_nodes += nodes.len();
                    aggregation.report.file_details.push(FileDetail::Parsed {
                        file: file_name,
                        nodes_found: nodes.len(),
                        node_names: nodes.keys().cloned().collect(),
                    });
                    for (key, schema) in nodes {
                        if aggregation.nodes.contains_key(&key) {
                            debug!("{} redefined in {}", key, file.display());
                        }
                        aggregation.nodes.insert(key, schema);
                    }
                }
                Err(error) => {
                    warn!("Skipping {}: {}", file_name, error);
                    aggregation.report.file_details.push(FileDetail::Failed {
                        file: file_name.clone(),
                        error: error.clone(),
                    });
                    aggregation.issues.push(Issue::ParseFailure(ParseFailureIssue {
                        file_path: file_name,
                        error,
                    }));
                }
            }
        }

        normalize_node_map(&mut aggregation.nodes, self.tables.primitive_labels());
        info!(
            "{}: {} node(s) from {}/{} file(s)",
            root.display(),
            aggregation.nodes.len(),
            aggregation.report.processed_files,
            aggregation.report.total_files
        );

        aggregation
    }

    fn extract_file(
        &self,
        extractor: &SchemaExtractor<'_>,
        file: &Path,
    ) -> std::result::Result<NodeMap, String> {
        let source = fs::read_to_string(file).map_err(|e| e.to_string())?;
        let module = parse_python_source(&source).map_err(|e| e.to_string())?;
        Ok(extractor.extract(&module, Some(file)))
    }
}
