use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use super::super::args::CommonArgs;
use super::{CommandResult, CommandSummary};
use crate::config::{Config, load_config};
use crate::issues::{Issue, Report, Severity};

/// Load the config discovered from the working directory and apply the
/// common CLI overrides.
pub fn load_settings(common: &CommonArgs) -> Result<Config> {
    let loaded = load_config(Path::new("."))?;
    if loaded.from_file {
        debug!("Loaded config file");
    }

    let mut config = loaded.config;
    if let Some(output_dir) = &common.output_dir {
        config.output_dir = output_dir.to_string_lossy().to_string();
    }
    Ok(config)
}

pub fn output_root(config: &Config) -> PathBuf {
    PathBuf::from(&config.output_dir)
}

pub fn finish(
    summary: CommandSummary,
    issues: Vec<Issue>,
    extra_errors: usize,
    exit_on_errors: bool,
) -> CommandResult {
    let error_count = issues
        .iter()
        .filter(|i| i.severity() == Severity::Error)
        .count()
        + extra_errors;

    CommandResult {
        summary,
        error_count,
        exit_on_errors,
        issues,
    }
}
