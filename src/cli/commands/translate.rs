use std::path::Path;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::warn;

use super::super::args::TranslateCommand;
use super::super::report;
use super::extract::extract_plugin;
use super::helper::{finish, load_settings, output_root};
use super::{CommandResult, CommandSummary, PluginTranslation, TranslateSummary, TranslationStatus};
use crate::core::TypeTables;
use crate::core::output::PluginOutputDirs;
use crate::core::schema::NodeMap;
use crate::core::translate::{
    CancelFlag, CommandService, ReplayService, RunOptions, RunOutcome, ServiceBackend,
    TranslateError, TranslationRun,
};
use crate::issues::Issue;

pub fn translate(cmd: TranslateCommand) -> Result<CommandResult> {
    let mut config = load_settings(&cmd.common)?;
    if let Some(batch_size) = cmd.batch_size {
        anyhow::ensure!(batch_size > 0, "--batch-size must be greater than 0");
        config.batch_size = batch_size;
    }
    if cmd.glossary {
        config.glossary.enabled = true;
    }

    let service: ServiceBackend = match &cmd.replay {
        Some(dir) => ReplayService::new(dir).into(),
        None => CommandService::new(&config.translator.command)?.into(),
    };
    let options = RunOptions {
        resume: cmd.resume,
        keep_temp: cmd.keep_temp,
        ..RunOptions::from_config(&config)
    };

    let tables = TypeTables::from_config(&config);
    let patterns = config.ignore_patterns();
    let root = output_root(&config);

    let mut plugins = Vec::with_capacity(cmd.plugins.len());
    let mut issues: Vec<Issue> = Vec::new();
    let mut problems = 0;

    for plugin in &cmd.plugins {
        let (extraction, parse_failures) = extract_plugin(&tables, &patterns, &root, plugin)?;
        issues.extend(parse_failures);

        if let Some(error) = extraction.scan_error {
            problems += 1;
            plugins.push(PluginTranslation {
                plugin: extraction.plugin,
                status: TranslationStatus::Failed { error },
            });
            continue;
        }
        if extraction.nodes.is_empty() {
            plugins.push(PluginTranslation {
                plugin: extraction.plugin,
                status: TranslationStatus::NoNodes,
            });
            continue;
        }

        let dirs = PluginOutputDirs::create(&root, Path::new(&extraction.plugin))?;
        report::print_run_header(&dirs.plugin);
        let run = TranslationRun::new(service.clone(), options.clone(), dirs);
        let status = match drive(run, extraction.nodes)? {
            Ok(RunOutcome::Completed(done)) => {
                let corrections = done.batch_log.len() + done.final_log.len();
                issues.extend(done.batch_log.into_entries());
                issues.extend(done.final_log.into_entries());
                TranslationStatus::Completed {
                    final_file: done.final_file,
                    node_count: done.nodes.len(),
                    total_batches: done.total_batches,
                    resumed_batches: done.resumed_batches,
                    corrections,
                    glossary_overrides: done.glossary_overrides,
                    prompt_tokens: done.context.prompt_tokens,
                    completion_tokens: done.context.completion_tokens,
                    total_tokens: done.context.total_tokens,
                    cost: done.cost,
                }
            }
            Ok(RunOutcome::Cancelled {
                completed_batches,
                total_batches,
            }) => TranslationStatus::Cancelled {
                completed_batches,
                total_batches,
            },
            Err(err) => {
                warn!("{}", err);
                TranslationStatus::Failed {
                    error: err.to_string(),
                }
            }
        };

        let cancelled = matches!(status, TranslationStatus::Cancelled { .. });
        if !matches!(status, TranslationStatus::Completed { .. }) {
            problems += 1;
        }
        plugins.push(PluginTranslation {
            plugin: extraction.plugin,
            status,
        });
        if cancelled {
            break;
        }
    }

    Ok(finish(
        CommandSummary::Translate(TranslateSummary { plugins }),
        issues,
        problems,
        true,
    ))
}

/// Run the batch loop on a blocking worker while this task prints progress
/// and turns Ctrl-C into a cooperative cancel.
fn drive(
    run: TranslationRun<ServiceBackend>,
    nodes: NodeMap,
) -> Result<Result<RunOutcome, TranslateError>> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async move {
            let cancel = CancelFlag::new();
            let (tx, mut rx) = mpsc::unbounded_channel();

            let worker_cancel = cancel.clone();
            let mut worker = tokio::task::spawn_blocking(move || {
                run.execute(&nodes, &worker_cancel, &mut |event| {
                    let _ = tx.send(event);
                })
            });

            loop {
                tokio::select! {
                    Some(event) = rx.recv() => report::print_run_event(&event),
                    _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                        cancel.cancel();
                        report::print_cancel_requested();
                    }
                    result = &mut worker => {
                        while let Ok(event) = rx.try_recv() {
                            report::print_run_event(&event);
                        }
                        return result.context("Translation worker stopped unexpectedly");
                    }
                }
            }
        })
}
