//! Sequential batch loop of one translation run.
//!
//! Batches are processed strictly one after another: the token counters and
//! the temp-file list in [`RunContext`] belong to the loop alone. A
//! [`CancelFlag`] is checked before each batch and again once a batch has
//! been saved; an in-flight call is never interrupted.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::error::TranslateError;
use super::prompt::{SYSTEM_PROMPT, user_message};
use super::response::extract_json_object;
use super::service::{TokenUsage, TranslationRequest, TranslationService};
use crate::config::Config;
use crate::core::artifact::{load_node_map, save_json, save_lines};
use crate::core::output::PluginOutputDirs;
use crate::core::reconcile::{CorrectionLog, Glossary, final_validation, reconcile_batch};
use crate::core::schema::{NodeMap, strip_provenance};

/// A contiguous slice of the mapping, submitted as one unit.
#[derive(Debug, Clone)]
pub struct TranslationBatch {
    /// 1-based.
    pub index: usize,
    pub nodes: NodeMap,
}

/// Partition `nodes` in insertion order into batches of at most `batch_size`.
pub fn partition_batches(nodes: &NodeMap, batch_size: usize) -> Vec<TranslationBatch> {
    let batch_size = batch_size.max(1);
    let mut batches: Vec<TranslationBatch> = Vec::new();

    for (key, schema) in nodes {
        match batches.last_mut() {
            Some(batch) if batch.nodes.len() < batch_size => {
                batch.nodes.insert(key.clone(), schema.clone());
            }
            _ => {
                let mut batch = TranslationBatch {
                    index: batches.len() + 1,
                    nodes: NodeMap::new(),
                };
                batch.nodes.insert(key.clone(), schema.clone());
                batches.push(batch);
            }
        }
    }

    batches
}

/// Cooperative stop signal shared between the run and its controller.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Mutable state scoped to one run.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    temp_files: Vec<PathBuf>,
}

impl RunContext {
    pub fn record_usage(&mut self, usage: &TokenUsage) {
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.total_tokens += if usage.total_tokens > 0 {
            usage.total_tokens
        } else {
            usage.prompt_tokens + usage.completion_tokens
        };
    }

    pub fn register_temp(&mut self, path: PathBuf) {
        if !self.temp_files.contains(&path) {
            self.temp_files.push(path);
        }
    }

    pub fn temp_files(&self) -> &[PathBuf] {
        &self.temp_files
    }

    pub fn cost(&self, prompt_per1k: f64, completion_per1k: f64) -> CostEstimate {
        let prompt = self.prompt_tokens as f64 / 1000.0 * prompt_per1k;
        let completion = self.completion_tokens as f64 / 1000.0 * completion_per1k;
        CostEstimate {
            prompt,
            completion,
            total: prompt + completion,
        }
    }

    fn remove_temp_files(&mut self) {
        for path in self.temp_files.drain(..) {
            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed temp file {}", path.display()),
                Err(err) => warn!("Failed to remove temp file {}: {}", path.display(), err),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostEstimate {
    pub prompt: f64,
    pub completion: f64,
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub batch_size: usize,
    /// Reuse corrected batch files left by an earlier, interrupted run.
    pub resume: bool,
    /// Keep temp files after a successful run.
    pub keep_temp: bool,
    pub system_prompt: String,
    pub glossary: Option<Glossary>,
    pub prompt_cost_per1k: f64,
    pub completion_cost_per1k: f64,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.batch_size,
            resume: false,
            keep_temp: false,
            system_prompt: config
                .translator
                .system_prompt
                .clone()
                .unwrap_or_else(|| SYSTEM_PROMPT.to_string()),
            glossary: config
                .glossary
                .enabled
                .then(|| Glossary::from_config(&config.glossary)),
            prompt_cost_per1k: config.translator.prompt_cost_per1k,
            completion_cost_per1k: config.translator.completion_cost_per1k,
        }
    }
}

/// Progress notifications emitted by [`TranslationRun::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Started {
        node_count: usize,
        total_batches: usize,
    },
    BatchStarted {
        index: usize,
        total: usize,
        node_names: Vec<String>,
    },
    BatchResumed {
        index: usize,
        total: usize,
    },
    BatchUsage {
        index: usize,
        usage: TokenUsage,
        running_total: u64,
    },
    BatchCompleted {
        index: usize,
        total: usize,
        corrections: usize,
    },
    FinalValidation {
        corrections: usize,
    },
}

#[derive(Debug, Clone)]
pub struct CompletedRun {
    pub nodes: NodeMap,
    pub final_file: PathBuf,
    pub total_batches: usize,
    pub resumed_batches: usize,
    /// Corrections from every translated batch, in batch order.
    pub batch_log: CorrectionLog,
    /// Final validation and glossary decisions.
    pub final_log: CorrectionLog,
    pub glossary_overrides: usize,
    pub context: RunContext,
    pub cost: CostEstimate,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(CompletedRun),
    Cancelled {
        completed_batches: usize,
        total_batches: usize,
    },
}

pub struct TranslationRun<S> {
    pub(super) service: S,
    options: RunOptions,
    dirs: PluginOutputDirs,
}

impl<S: TranslationService> TranslationRun<S> {
    pub fn new(service: S, options: RunOptions, dirs: PluginOutputDirs) -> Self {
        Self {
            service,
            options,
            dirs,
        }
    }

    /// Translate `nodes` batch by batch and write the final artifact.
    ///
    /// Temp files are removed only after a successful run; after a failure or
    /// a cancel they stay so that saved batches can be resumed.
    pub fn execute(
        &self,
        nodes: &NodeMap,
        cancel: &CancelFlag,
        on_event: &mut dyn FnMut(RunEvent),
    ) -> Result<RunOutcome, TranslateError> {
        let mut context = RunContext::default();
        let pending = strip_provenance(nodes);

        let pending_file = self.dirs.pending_file();
        save_json(&pending_file, &pending)
            .map_err(|e| TranslateError::Prepare(format!("{:#}", e)))?;
        context.register_temp(pending_file);

        let batches = partition_batches(&pending, self.options.batch_size);
        let total = batches.len();
        on_event(RunEvent::Started {
            node_count: pending.len(),
            total_batches: total,
        });

        let mut merged: Map<String, Value> = Map::new();
        let mut batch_log = CorrectionLog::new();
        let mut resumed_batches = 0;

        for batch in &batches {
            if cancel.is_cancelled() {
                info!("Translation cancelled before batch {}", batch.index);
                return Ok(RunOutcome::Cancelled {
                    completed_batches: batch.index - 1,
                    total_batches: total,
                });
            }

            let corrected = match self.resume_batch(batch) {
                Some(saved) => {
                    resumed_batches += 1;
                    on_event(RunEvent::BatchResumed {
                        index: batch.index,
                        total,
                    });
                    saved
                }
                None => {
                    on_event(RunEvent::BatchStarted {
                        index: batch.index,
                        total,
                        node_names: batch.nodes.keys().cloned().collect(),
                    });
                    let (saved, log) = self.translate_batch(batch, &mut context, on_event)?;
                    on_event(RunEvent::BatchCompleted {
                        index: batch.index,
                        total,
                        corrections: log.len(),
                    });
                    batch_log.extend(log);
                    saved
                }
            };
            context.register_temp(self.dirs.batch_file(batch.index));

            let value = serde_json::to_value(&corrected).map_err(|e| TranslateError::Persist {
                batch: batch.index,
                message: e.to_string(),
            })?;
            if let Value::Object(map) = value {
                merged.extend(map);
            }

            if cancel.is_cancelled() && batch.index < total {
                info!("Translation cancelled after batch {}", batch.index);
                return Ok(RunOutcome::Cancelled {
                    completed_batches: batch.index,
                    total_batches: total,
                });
            }
        }

        let mut validated = final_validation(&pending, &merged);
        let glossary_overrides = match &self.options.glossary {
            Some(glossary) => glossary.apply(&mut validated.nodes, &mut validated.log),
            None => 0,
        };
        on_event(RunEvent::FinalValidation {
            corrections: validated.log.len(),
        });

        let final_file = self.dirs.final_file();
        save_json(&final_file, &validated.nodes)
            .map_err(|e| TranslateError::Finalize(format!("{:#}", e)))?;
        save_lines(&self.dirs.final_log_file(), validated.log.lines())
            .map_err(|e| TranslateError::Finalize(format!("{:#}", e)))?;

        if !self.options.keep_temp {
            context.remove_temp_files();
        }

        let cost = context.cost(
            self.options.prompt_cost_per1k,
            self.options.completion_cost_per1k,
        );
        info!(
            "Translated {} node(s) in {} batch(es), {} tokens",
            validated.nodes.len(),
            total,
            context.total_tokens
        );

        Ok(RunOutcome::Completed(CompletedRun {
            nodes: validated.nodes,
            final_file,
            total_batches: total,
            resumed_batches,
            batch_log,
            final_log: validated.log,
            glossary_overrides,
            context,
            cost,
        }))
    }

    fn resume_batch(&self, batch: &TranslationBatch) -> Option<NodeMap> {
        if !self.options.resume {
            return None;
        }
        let path = self.dirs.batch_file(batch.index);
        if !path.is_file() {
            return None;
        }
        match load_node_map(&path) {
            Ok(saved) if saved.keys().eq(batch.nodes.keys()) => {
                debug!("Resuming batch {} from {}", batch.index, path.display());
                Some(saved)
            }
            Ok(_) => {
                warn!(
                    "Saved batch {} does not match the current nodes, translating again",
                    batch.index
                );
                None
            }
            Err(err) => {
                warn!("Ignoring saved batch {}: {:#}", batch.index, err);
                None
            }
        }
    }

    fn translate_batch(
        &self,
        batch: &TranslationBatch,
        context: &mut RunContext,
        on_event: &mut dyn FnMut(RunEvent),
    ) -> Result<(NodeMap, CorrectionLog), TranslateError> {
        let request = TranslationRequest {
            batch: batch.index,
            system: self.options.system_prompt.clone(),
            user: user_message(&batch.nodes).map_err(|e| TranslateError::Prepare(e.to_string()))?,
        };

        let reply = self
            .service
            .translate(&request)
            .map_err(|e| TranslateError::Service {
                batch: batch.index,
                message: format!("{:#}", e),
            })?;

        if let Some(usage) = &reply.usage {
            context.record_usage(usage);
            on_event(RunEvent::BatchUsage {
                index: batch.index,
                usage: *usage,
                running_total: context.total_tokens,
            });
        }

        let candidate = extract_json_object(&reply.text).map_err(|e| TranslateError::Shape {
            batch: batch.index,
            detail: e.to_string(),
        })?;

        let reconciled = reconcile_batch(&batch.nodes, &candidate);
        debug!(
            "Batch {} reconciled with {} correction(s)",
            batch.index,
            reconciled.log.len()
        );

        let persist = |e: anyhow::Error| TranslateError::Persist {
            batch: batch.index,
            message: format!("{:#}", e),
        };
        save_json(&self.dirs.batch_file(batch.index), &reconciled.nodes).map_err(persist)?;
        save_lines(
            &self.dirs.batch_log_file(batch.index),
            reconciled.log.lines(),
        )
        .map_err(persist)?;

        Ok((reconciled.nodes, reconciled.log))
    }
}
