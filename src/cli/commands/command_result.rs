use std::path::PathBuf;

use crate::core::aggregate::DetectionReport;
use crate::core::schema::NodeMap;
use crate::core::translate::CostEstimate;
use crate::issues::Issue;

use super::super::args::ReconcileMode;

#[derive(Debug)]
pub enum CommandSummary {
    Extract(ExtractSummary),
    Translate(TranslateSummary),
    Reconcile(ReconcileSummary),
    Diff(DiffSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct ExtractSummary {
    pub plugins: Vec<PluginExtraction>,
}

#[derive(Debug)]
pub struct PluginExtraction {
    pub plugin: String,
    pub nodes_file: PathBuf,
    pub report_file: PathBuf,
    pub report: DetectionReport,
    /// Kept with provenance for the per-file verbose summary.
    pub nodes: NodeMap,
    pub scan_error: Option<String>,
}

#[derive(Debug)]
pub struct TranslateSummary {
    pub plugins: Vec<PluginTranslation>,
}

#[derive(Debug)]
pub struct PluginTranslation {
    pub plugin: String,
    pub status: TranslationStatus,
}

#[derive(Debug)]
pub enum TranslationStatus {
    Completed {
        final_file: PathBuf,
        node_count: usize,
        total_batches: usize,
        resumed_batches: usize,
        corrections: usize,
        glossary_overrides: usize,
        prompt_tokens: u64,
        completion_tokens: u64,
        total_tokens: u64,
        cost: CostEstimate,
    },
    Cancelled {
        completed_batches: usize,
        total_batches: usize,
    },
    Failed {
        error: String,
    },
    /// Extraction found no nodes; nothing was sent.
    NoNodes,
}

#[derive(Debug)]
pub struct ReconcileSummary {
    pub mode: ReconcileMode,
    pub output_file: PathBuf,
    pub node_count: usize,
    /// Strict mode only.
    pub table_file: Option<PathBuf>,
    /// Strict mode only.
    pub corrections_made: Option<bool>,
}

#[derive(Debug)]
pub struct DiffSummary {
    pub old_count: usize,
    pub new_count: usize,
    /// Normalized names of added nodes.
    pub added: Vec<String>,
    pub output_file: Option<PathBuf>,
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
    pub error: Option<String>,
}

/// Result of running a nodelingo command
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    /// Problems that make the command exit with status 1.
    pub error_count: usize,
    /// If false, always exit 0 regardless of `error_count`.
    pub exit_on_errors: bool,
    /// Parse failures (extract) or correction log entries (reconcile).
    pub issues: Vec<Issue>,
}
