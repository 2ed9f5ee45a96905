use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::issues::{Issue, Report};

// ============================================================
// Tool Parameters
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractNodesParams {
    /// Plugin source directory to scan
    pub plugin_path: String,
    /// Directory to load .nodelingorc.json from (default: the plugin directory)
    pub project_root_path: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeNamesParams {
    /// Raw node keys, e.g. "Layer Utility: Llama Vision (Advance)"
    pub names: Vec<String>,
    pub project_root_path: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiffNodesParams {
    /// Older extraction artifact
    pub old_path: String,
    /// Newer extraction artifact
    pub new_path: String,
    pub project_root_path: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileModeParam {
    #[default]
    Batch,
    Final,
    Strict,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileTranslationParams {
    /// Original (untranslated) artifact
    pub original_path: String,
    /// Translated artifact
    pub translated_path: String,
    /// "batch" (default), "final" or "strict"
    #[serde(default)]
    pub mode: ReconcileModeParam,
    /// Apply glossary overrides (default: config `glossary.enabled`)
    pub apply_glossary: Option<bool>,
    pub project_root_path: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetConfigParams {
    pub project_root_path: String,
}

// ============================================================
// Config Types (get_config)
// ============================================================

/// Configuration DTO for MCP
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDto {
    /// True if config was loaded from a file, false if using defaults
    pub from_file: bool,
    pub config: ConfigValues,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigValues {
    pub ignores: Vec<String>,
    pub output_dir: String,
    pub batch_size: usize,
    pub widget_types: Vec<String>,
    pub opaque_types: Vec<String>,
    pub primitive_labels: Vec<String>,
    pub phrases: Map<String, Value>,
    pub translator_command: Vec<String>,
    pub glossary_enabled: bool,
}

impl From<Config> for ConfigValues {
    fn from(c: Config) -> Self {
        Self {
            ignores: c.ignores,
            output_dir: c.output_dir,
            batch_size: c.batch_size,
            widget_types: c.widget_types,
            opaque_types: c.opaque_types,
            primitive_labels: c.primitive_labels,
            phrases: c
                .phrases
                .into_iter()
                .map(|(phrase, replacement)| (phrase, Value::String(replacement)))
                .collect(),
            translator_command: c.translator.command,
            glossary_enabled: c.glossary.enabled,
        }
    }
}

// ============================================================
// Extraction Types (extract_nodes)
// ============================================================

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractNodesResult {
    pub plugin: String,
    pub total_files: usize,
    pub processed_files: usize,
    pub node_count: usize,
    /// Node key → {title, inputs, widgets, outputs}
    pub nodes: Value,
    pub parse_failures: Vec<ParseFailureItem>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParseFailureItem {
    pub file: String,
    pub error: String,
}

// ============================================================
// Normalization Types (normalize_names)
// ============================================================

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeNamesResult {
    pub items: Vec<NormalizedName>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedName {
    pub raw: String,
    pub normalized: String,
    /// Comparison key used for cross-version diffing
    pub base_name: String,
}

// ============================================================
// Diff Types (diff_nodes)
// ============================================================

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiffNodesResult {
    pub old_count: usize,
    pub new_count: usize,
    pub added_count: usize,
    /// Added nodes under normalized keys
    pub added: Map<String, Value>,
}

// ============================================================
// Reconciliation Types (reconcile_translation)
// ============================================================

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileTranslationResult {
    pub mode: ReconcileModeParam,
    pub node_count: usize,
    pub nodes: Value,
    pub corrections: Vec<CorrectionItem>,
    /// Strict mode only: {en_to_cn, cn_to_en}
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_table: Option<Value>,
    /// Strict mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrections_made: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionItem {
    pub severity: String,
    pub rule: String,
    pub node: Option<String>,
    pub message: String,
}

impl Issue {
    pub fn to_mcp_item(&self) -> CorrectionItem {
        CorrectionItem {
            severity: self.severity().to_string(),
            rule: self.rule().to_string(),
            node: self.node().map(str::to_string),
            message: self.message(),
        }
    }
}
