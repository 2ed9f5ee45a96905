//! Report formatting and printing utilities.
//!
//! Command summaries go to stdout; translation progress and warnings go to
//! stderr. Separate from core logic so nodelingo can be used as a library.

use std::io::{self, Write};

use colored::Colorize;
use indexmap::IndexMap;
use unicode_width::UnicodeWidthStr;

use super::commands::{
    CommandResult, CommandSummary, DiffSummary, ExtractSummary, InitSummary, PluginExtraction,
    ReconcileSummary, TranslateSummary, TranslationStatus,
};
use crate::config::CONFIG_FILE_NAME;
use crate::core::schema::{NodeMap, Section};
use crate::core::translate::RunEvent;
use crate::issues::{Issue, Report, Rule, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print issues in cargo-style format, in the order they were recorded.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    for issue in issues {
        print_issue(issue, writer);
    }

    print_summary(issues, writer);
}

/// Print a warning about files that could not be parsed.
pub fn print_parse_warning(count: usize, verbose: bool) {
    print_parse_warning_to(count, verbose, &mut io::stderr().lock());
}

/// Print a parse warning to a custom writer.
pub fn print_parse_warning_to<W: Write>(count: usize, verbose: bool, writer: &mut W) {
    if count > 0 && !verbose {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be parsed (use {} for details)",
            "warning:".bold().yellow(),
            count,
            "-v".cyan()
        );
    }
}

pub fn print(result: &CommandResult, verbose: bool) {
    print_to(result, verbose, &mut io::stdout().lock());

    let parse_failures = result
        .issues
        .iter()
        .filter(|i| i.rule() == Rule::ParseFailure)
        .count();
    print_parse_warning(parse_failures, verbose);
}

/// Print a command result to a custom writer.
pub fn print_to<W: Write>(result: &CommandResult, verbose: bool, writer: &mut W) {
    if verbose {
        report_to(&result.issues, writer);
    }

    match &result.summary {
        CommandSummary::Extract(summary) => print_extract(summary, verbose, writer),
        CommandSummary::Translate(summary) => print_translate(summary, writer),
        CommandSummary::Reconcile(summary) => {
            print_reconcile(summary, result.issues.len(), verbose, writer)
        }
        CommandSummary::Diff(summary) => print_diff(summary, writer),
        CommandSummary::Init(summary) => print_init(summary, writer),
    }
}

// ============================================================
// Translation progress (stderr)
// ============================================================

pub fn print_run_header(plugin: &str) {
    let _ = writeln!(
        io::stderr().lock(),
        "{} {}",
        "Translating".green().bold(),
        plugin
    );
}

pub fn print_run_event(event: &RunEvent) {
    print_run_event_to(event, &mut io::stderr().lock());
}

pub fn print_run_event_to<W: Write>(event: &RunEvent, writer: &mut W) {
    match event {
        RunEvent::Started {
            node_count,
            total_batches,
        } => {
            let _ = writeln!(
                writer,
                "  {} node(s) in {} batch(es)",
                node_count, total_batches
            );
        }
        RunEvent::BatchStarted {
            index,
            total,
            node_names,
        } => {
            let _ = writeln!(
                writer,
                "  [{}/{}] {}",
                index,
                total,
                node_names.join(", ").dimmed()
            );
        }
        RunEvent::BatchResumed { index, total } => {
            let _ = writeln!(
                writer,
                "  [{}/{}] {}",
                index,
                total,
                "resumed from saved batch".cyan()
            );
        }
        RunEvent::BatchUsage {
            usage,
            running_total,
            ..
        } => {
            let _ = writeln!(
                writer,
                "        tokens: {} prompt, {} completion ({} so far)",
                usage.prompt_tokens, usage.completion_tokens, running_total
            );
        }
        RunEvent::BatchCompleted {
            index,
            total,
            corrections,
        } => {
            let _ = writeln!(
                writer,
                "  [{}/{}] {} ({} correction(s))",
                index,
                total,
                SUCCESS_MARK.green(),
                corrections
            );
        }
        RunEvent::FinalValidation { corrections } => {
            let _ = writeln!(
                writer,
                "  final validation: {} correction(s)",
                corrections
            );
        }
    }
}

pub fn print_cancel_requested() {
    let _ = writeln!(
        io::stderr().lock(),
        "{} cancelling after the current batch...",
        "warning:".bold().yellow()
    );
}

// ============================================================
// Internal Functions
// ============================================================

fn print_issue<W: Write>(issue: &Issue, writer: &mut W) {
    let severity_str = match issue.severity() {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
        Severity::Info => "info".bold().cyan(),
    };

    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity_str,
        issue.message(),
        issue.rule().to_string().dimmed().cyan()
    );

    if let Some(location) = issue_location(issue) {
        let _ = writeln!(writer, "  {} {}", "-->".blue(), location);
    }
}

fn issue_location(issue: &Issue) -> Option<&str> {
    match issue {
        Issue::ParseFailure(failure) => Some(&failure.file_path),
        _ => issue.node(),
    }
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.severity() == Severity::Error)
        .count();
    let total_warnings = issues
        .iter()
        .filter(|i| i.severity() == Severity::Warning)
        .count();
    let total_problems = total_errors + total_warnings;

    if total_problems > 0 {
        let _ = writeln!(
            writer,
            "\n{} {} problems ({} {}, {} {})",
            FAILURE_MARK.red(),
            total_problems,
            total_errors,
            if total_errors == 1 { "error" } else { "errors" }.red(),
            total_warnings,
            if total_warnings == 1 {
                "warning"
            } else {
                "warnings"
            }
            .yellow()
        );
    }
}

fn print_extract<W: Write>(summary: &ExtractSummary, verbose: bool, writer: &mut W) {
    for plugin in &summary.plugins {
        if let Some(error) = &plugin.scan_error {
            let _ = writeln!(writer, "{} {}: {}", FAILURE_MARK.red(), plugin.plugin, error);
            continue;
        }

        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "{}: {} {} from {}/{} files",
                plugin.plugin,
                plugin.nodes.len(),
                if plugin.nodes.len() == 1 {
                    "node"
                } else {
                    "nodes"
                },
                plugin.report.processed_files,
                plugin.report.total_files
            )
            .green()
        );
        let _ = writeln!(
            writer,
            "  {} {}",
            "-->".blue(),
            plugin.nodes_file.display()
        );

        if verbose {
            let _ = writeln!(
                writer,
                "  {} {}",
                "-->".blue(),
                plugin.report_file.display()
            );
            print_detection_summary(plugin, writer);
        }
    }
}

/// Nodes grouped by defining file, with per-section field totals.
fn print_detection_summary<W: Write>(plugin: &PluginExtraction, writer: &mut W) {
    let groups = group_by_source(&plugin.nodes);
    if groups.is_empty() {
        return;
    }

    let width = groups
        .keys()
        .map(|file| UnicodeWidthStr::width(file.as_str()))
        .max()
        .unwrap_or(0);

    for (file, nodes) in &groups {
        let mut counts = [0usize; 3];
        for schema in nodes.iter().filter_map(|name| plugin.nodes.get(*name)) {
            for (i, section) in Section::ALL.iter().enumerate() {
                counts[i] += schema.section(*section).len();
            }
        }
        let padding = width - UnicodeWidthStr::width(file.as_str());
        let _ = writeln!(
            writer,
            "  {}{:padding$}  {} node(s)  inputs {}  widgets {}  outputs {}",
            file,
            "",
            nodes.len(),
            counts[0],
            counts[1],
            counts[2],
            padding = padding
        );
        for name in nodes {
            let title = plugin
                .nodes
                .get(*name)
                .map(|schema| schema.title.as_str())
                .unwrap_or_default();
            let _ = writeln!(writer, "    {} {}", name, format!("({})", title).dimmed());
        }
    }
}

fn group_by_source(nodes: &NodeMap) -> IndexMap<String, Vec<&str>> {
    let mut groups: IndexMap<String, Vec<&str>> = IndexMap::new();
    for (name, schema) in nodes {
        let file = schema
            .source_file
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        groups.entry(file).or_default().push(name.as_str());
    }
    groups
}

fn print_translate<W: Write>(summary: &TranslateSummary, writer: &mut W) {
    for plugin in &summary.plugins {
        match &plugin.status {
            TranslationStatus::Completed {
                final_file,
                node_count,
                total_batches,
                resumed_batches,
                corrections,
                glossary_overrides,
                prompt_tokens,
                completion_tokens,
                total_tokens,
                cost,
            } => {
                let _ = writeln!(
                    writer,
                    "{} {}",
                    SUCCESS_MARK.green(),
                    format!(
                        "{}: translated {} node(s) in {} batch(es)",
                        plugin.plugin, node_count, total_batches
                    )
                    .green()
                );
                let _ = writeln!(writer, "  {} {}", "-->".blue(), final_file.display());
                if *resumed_batches > 0 {
                    let _ = writeln!(writer, "  - resumed: {} batch(es)", resumed_batches);
                }
                let _ = writeln!(writer, "  - corrections: {}", corrections);
                if *glossary_overrides > 0 {
                    let _ = writeln!(writer, "  - glossary overrides: {}", glossary_overrides);
                }
                let _ = writeln!(
                    writer,
                    "  - tokens: {} ({} prompt, {} completion)",
                    total_tokens, prompt_tokens, completion_tokens
                );
                let _ = writeln!(
                    writer,
                    "  - estimated cost: ${:.4} (${:.4} prompt, ${:.4} completion)",
                    cost.total, cost.prompt, cost.completion
                );
            }
            TranslationStatus::Cancelled {
                completed_batches,
                total_batches,
            } => {
                let _ = writeln!(
                    writer,
                    "{} {}: cancelled after {}/{} batch(es)",
                    FAILURE_MARK.yellow(),
                    plugin.plugin,
                    completed_batches,
                    total_batches
                );
                let _ = writeln!(
                    writer,
                    "Run again with {} to continue.",
                    "--resume".cyan()
                );
            }
            TranslationStatus::Failed { error } => {
                let _ = writeln!(
                    writer,
                    "{} {}: {}",
                    FAILURE_MARK.red(),
                    plugin.plugin,
                    error
                );
            }
            TranslationStatus::NoNodes => {
                let _ = writeln!(
                    writer,
                    "{} {}: no nodes found, nothing to translate",
                    "warning:".bold().yellow(),
                    plugin.plugin
                );
            }
        }
    }
}

fn print_reconcile<W: Write>(
    summary: &ReconcileSummary,
    corrections: usize,
    verbose: bool,
    writer: &mut W,
) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Reconciled {} node(s) in {} mode, {} correction(s)",
            summary.node_count,
            summary.mode.as_str(),
            corrections
        )
        .green()
    );
    let _ = writeln!(
        writer,
        "  {} {}",
        "-->".blue(),
        summary.output_file.display()
    );
    if let Some(table_file) = &summary.table_file {
        let _ = writeln!(writer, "  {} {}", "-->".blue(), table_file.display());
    }
    if summary.corrections_made == Some(false) {
        let _ = writeln!(writer, "  - no translated keys needed restoring");
    }
    if corrections > 0 && !verbose {
        let _ = writeln!(writer, "Run with {} to list corrections.", "-v".cyan());
    }
}

fn print_diff<W: Write>(summary: &DiffSummary, writer: &mut W) {
    if summary.added.is_empty() {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "No new nodes ({} old, {} new)",
                summary.old_count, summary.new_count
            )
            .green()
        );
        return;
    }

    let _ = writeln!(
        writer,
        "{} {} new node(s) ({} old, {} new):",
        "Added".yellow().bold(),
        summary.added.len(),
        summary.old_count,
        summary.new_count
    );
    for name in &summary.added {
        let _ = writeln!(writer, "  + {}", name);
    }
    if let Some(output_file) = &summary.output_file {
        let _ = writeln!(writer, "  {} {}", "-->".blue(), output_file.display());
    }
}

fn print_init<W: Write>(summary: &InitSummary, writer: &mut W) {
    if summary.created {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    } else if let Some(error) = &summary.error {
        let _ = writeln!(writer, "{} {}", FAILURE_MARK.red(), error);
    }
}

// ============================================================
// Tests
// ============================================================
