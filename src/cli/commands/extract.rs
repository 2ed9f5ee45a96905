use std::path::Path;

use anyhow::Result;
use glob::Pattern;
use rayon::prelude::*;

use super::super::args::ExtractCommand;
use super::helper::{finish, load_settings, output_root};
use super::{CommandResult, CommandSummary, ExtractSummary, PluginExtraction};
use crate::core::artifact::save_json;
use crate::core::output::PluginOutputDirs;
use crate::core::schema::strip_provenance;
use crate::core::{SchemaAggregator, TypeTables};
use crate::issues::Issue;

pub fn extract(cmd: ExtractCommand) -> Result<CommandResult> {
    let config = load_settings(&cmd.common)?;
    let tables = TypeTables::from_config(&config);
    let patterns = config.ignore_patterns();
    let root = output_root(&config);

    // One aggregation per plugin; each stays single-threaded.
    let results: Vec<Result<(PluginExtraction, Vec<Issue>)>> = cmd
        .plugins
        .par_iter()
        .map(|plugin| extract_plugin(&tables, &patterns, &root, plugin))
        .collect();

    let mut plugins = Vec::with_capacity(results.len());
    let mut issues = Vec::new();
    let mut scan_errors = 0;
    for result in results {
        let (extraction, plugin_issues) = result?;
        if extraction.scan_error.is_some() {
            scan_errors += 1;
        }
        issues.extend(plugin_issues);
        plugins.push(extraction);
    }

    Ok(finish(
        CommandSummary::Extract(ExtractSummary { plugins }),
        issues,
        scan_errors,
        true,
    ))
}

/// Aggregate one plugin and persist its extraction artifact and detection
/// report.
pub(crate) fn extract_plugin(
    tables: &TypeTables,
    patterns: &[Pattern],
    output_root: &Path,
    plugin: &Path,
) -> Result<(PluginExtraction, Vec<Issue>)> {
    let aggregation = SchemaAggregator::new(tables, patterns).aggregate(plugin);
    // Name artifacts after the resolved directory so that `.` gets a real name.
    let plugin = &plugin
        .canonicalize()
        .unwrap_or_else(|_| plugin.to_path_buf());
    let dirs = PluginOutputDirs::new(output_root, plugin);

    let nodes_file = dirs.nodes_file();
    let report_file = dirs.detection_report_file();
    if aggregation.scan_error.is_none() {
        PluginOutputDirs::create(output_root, plugin)?;
        save_json(&nodes_file, &strip_provenance(&aggregation.nodes))?;
        save_json(&report_file, &aggregation.report)?;
    }

    Ok((
        PluginExtraction {
            plugin: dirs.plugin,
            nodes_file,
            report_file,
            report: aggregation.report,
            nodes: aggregation.nodes,
            scan_error: aggregation.scan_error,
        },
        aggregation.issues,
    ))
}
