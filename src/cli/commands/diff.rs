use std::path::{Path, PathBuf};

use anyhow::Result;

use super::super::args::DiffCommand;
use super::helper::{finish, load_settings};
use super::{CommandResult, CommandSummary, DiffSummary};
use crate::core::NameNormalizer;
use crate::core::artifact::{load_json_object, save_json};
use crate::core::diff::diff_nodes;

pub const ADDED_NODES_FILE: &str = "added_nodes.json";

pub fn diff(cmd: DiffCommand) -> Result<CommandResult> {
    let config = load_settings(&cmd.common)?;
    let old = load_json_object(&cmd.old)?;
    let new = load_json_object(&cmd.new)?;

    let normalizer = NameNormalizer::from_config(&config);
    let diff = diff_nodes(&old, &new, &normalizer);

    let output_file = if diff.is_empty() {
        None
    } else {
        let dir = cmd.output.clone().unwrap_or_else(|| {
            cmd.new
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(PathBuf::new)
        });
        let file = dir.join(ADDED_NODES_FILE);
        save_json(&file, &diff.added_normalized)?;
        Some(file)
    };

    let added: Vec<String> = diff.added_names().into_iter().map(String::from).collect();
    let added_count = added.len();

    Ok(finish(
        CommandSummary::Diff(DiffSummary {
            old_count: old.len(),
            new_count: new.len(),
            added,
            output_file,
        }),
        Vec::new(),
        added_count,
        true,
    ))
}
