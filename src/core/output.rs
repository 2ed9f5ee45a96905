//! Per-plugin output directory layout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::utils::plugin_name;

/// `<output_root>/<plugin>/{temp,translations,logs,debug}`.
#[derive(Debug, Clone)]
pub struct PluginOutputDirs {
    pub plugin: String,
    pub root: PathBuf,
    pub temp: PathBuf,
    pub translations: PathBuf,
    pub logs: PathBuf,
    pub debug: PathBuf,
}

impl PluginOutputDirs {
    pub fn new(output_root: &Path, plugin_path: &Path) -> Self {
        let plugin = plugin_name(plugin_path);
        let root = output_root.join(&plugin);
        Self {
            temp: root.join("temp"),
            translations: root.join("translations"),
            logs: root.join("logs"),
            debug: root.join("debug"),
            root,
            plugin,
        }
    }

    /// Build the layout and create every directory.
    pub fn create(output_root: &Path, plugin_path: &Path) -> Result<Self> {
        let dirs = Self::new(output_root, plugin_path);
        for dir in [&dirs.temp, &dirs.translations, &dirs.logs, &dirs.debug] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(dirs)
    }

    pub fn nodes_file(&self) -> PathBuf {
        self.root.join(format!("{}_nodes.json", self.plugin))
    }

    pub fn detection_report_file(&self) -> PathBuf {
        self.debug.join("node_detection_debug.json")
    }

    pub fn pending_file(&self) -> PathBuf {
        self.temp.join("nodes_to_translate.json")
    }

    /// Corrected artifact of a 1-based batch.
    pub fn batch_file(&self, batch: usize) -> PathBuf {
        self.translations
            .join(format!("batch_{}_translated.json", batch))
    }

    pub fn batch_log_file(&self, batch: usize) -> PathBuf {
        self.logs.join(format!("batch_{}_corrections.log", batch))
    }

    pub fn final_log_file(&self) -> PathBuf {
        self.logs.join("final_corrections.log")
    }

    pub fn final_file(&self) -> PathBuf {
        self.translations.join(format!("{}.json", self.plugin))
    }
}
