//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Extract node schemas from plugin source directories
//! - `translate`: Translate extracted schemas batch by batch and reconcile them
//! - `reconcile`: Reconcile a translated artifact against its original offline
//! - `diff`: List nodes added between two artifacts
//! - `init`: Initialize the configuration file
//! - `serve`: Start MCP server for AI integration

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(cmd)) => cmd.common.verbose,
            Some(Command::Translate(cmd)) => cmd.common.verbose,
            Some(Command::Reconcile(cmd)) => cmd.common.verbose,
            Some(Command::Diff(cmd)) => cmd.common.verbose,
            Some(Command::Init) | Some(Command::Serve) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Output root directory (overrides config file)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    /// Plugin source directories
    #[arg(required = true)]
    pub plugins: Vec<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct TranslateCommand {
    /// Plugin source directories
    #[arg(required = true)]
    pub plugins: Vec<PathBuf>,

    /// Nodes per batch (overrides config file)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Serve recorded replies (batch_<n>.json / batch_<n>.txt) from this
    /// directory instead of running the configured translator
    #[arg(long, value_name = "DIR")]
    pub replay: Option<PathBuf>,

    /// Reuse corrected batches saved by an interrupted run
    #[arg(long)]
    pub resume: bool,

    /// Keep temp files after a successful run
    #[arg(long)]
    pub keep_temp: bool,

    /// Apply glossary overrides after final validation
    #[arg(long)]
    pub glossary: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReconcileMode {
    /// Per-key repair against the original
    #[default]
    Batch,
    /// Whole-node validation (incomplete nodes are replaced by the original)
    Final,
    /// Restore translated keys using a name table built from both files
    Strict,
}

impl ReconcileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileMode::Batch => "batch",
            ReconcileMode::Final => "final",
            ReconcileMode::Strict => "strict",
        }
    }
}

#[derive(Debug, Args)]
pub struct ReconcileCommand {
    /// Original (untranslated) artifact
    pub original: PathBuf,

    /// Translated artifact to repair
    pub translated: PathBuf,

    /// Reconciliation mode
    #[arg(long, value_enum, default_value_t = ReconcileMode::Batch)]
    pub mode: ReconcileMode,

    /// Where to write the result (default: <translated>_reconciled.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Apply glossary overrides to the result
    #[arg(long)]
    pub glossary: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct DiffCommand {
    /// Older artifact
    pub old: PathBuf,

    /// Newer artifact
    pub new: PathBuf,

    /// Directory for added_nodes.json (default: next to <NEW>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable node schemas from plugin source directories
    Extract(ExtractCommand),
    /// Translate extracted node schemas and reconcile every batch
    Translate(TranslateCommand),
    /// Reconcile a translated artifact against its original
    Reconcile(ReconcileCommand),
    /// List nodes present in NEW but not in OLD
    Diff(DiffCommand),
    /// Initialize a new .nodelingorc.json configuration file
    Init,
    /// Start MCP server for AI coding agents
    Serve,
}
