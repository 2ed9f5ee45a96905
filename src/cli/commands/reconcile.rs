use std::path::{Path, PathBuf};

use anyhow::Result;

use super::super::args::{ReconcileCommand, ReconcileMode};
use super::helper::{finish, load_settings};
use super::{CommandResult, CommandSummary, ReconcileSummary};
use crate::core::artifact::{load_json_object, load_node_map, save_json};
use crate::core::reconcile::{Glossary, cross_check, final_validation, reconcile_batch};

/// File name of the strict-mode name table, written next to the output.
pub const TRANSLATION_TABLE_FILE: &str = "translation_mapping.json";

pub fn reconcile(cmd: ReconcileCommand) -> Result<CommandResult> {
    let config = load_settings(&cmd.common)?;
    let original = load_node_map(&cmd.original)?;
    let output_file = cmd
        .output
        .clone()
        .unwrap_or_else(|| default_output_file(&cmd.translated));

    let mut table_file = None;
    let mut corrections_made = None;
    let (mut nodes, mut log) = match cmd.mode {
        ReconcileMode::Batch => {
            let candidate = load_json_object(&cmd.translated)?;
            let reconciled = reconcile_batch(&original, &candidate);
            (reconciled.nodes, reconciled.log)
        }
        ReconcileMode::Final => {
            let candidate = load_json_object(&cmd.translated)?;
            let reconciled = final_validation(&original, &candidate);
            (reconciled.nodes, reconciled.log)
        }
        ReconcileMode::Strict => {
            let translated = load_node_map(&cmd.translated)?;
            let checked = cross_check(&original, &translated);
            let table_path = output_file.with_file_name(TRANSLATION_TABLE_FILE);
            save_json(&table_path, &checked.table)?;
            table_file = Some(table_path);
            corrections_made = Some(checked.corrections_made);
            (checked.nodes, checked.log)
        }
    };

    if cmd.glossary || config.glossary.enabled {
        Glossary::from_config(&config.glossary).apply(&mut nodes, &mut log);
    }

    save_json(&output_file, &nodes)?;

    Ok(finish(
        CommandSummary::Reconcile(ReconcileSummary {
            mode: cmd.mode,
            output_file,
            node_count: nodes.len(),
            table_file,
            corrections_made,
        }),
        log.into_entries(),
        0,
        false,
    ))
}

/// `<dir>/<stem>_reconciled.json` next to the translated artifact.
fn default_output_file(translated: &Path) -> PathBuf {
    let stem = translated
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "translation".to_string());
    translated.with_file_name(format!("{}_reconciled.json", stem))
}
