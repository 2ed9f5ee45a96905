//! Translation run driver.
//!
//! The aggregated mapping is partitioned into batches, each batch is sent to
//! the external service, and every reply is reconciled against its original
//! slice before being saved. A final validation pass runs over the merged
//! result.

mod error;
mod prompt;
mod response;
mod run;
mod service;

pub use error::TranslateError;
pub use prompt::{SYSTEM_PROMPT, user_message};
pub use response::{ResponseError, extract_json_object};
pub use run::{
    CancelFlag, CompletedRun, CostEstimate, RunContext, RunEvent, RunOptions, RunOutcome,
    TranslationBatch, TranslationRun, partition_batches,
};
pub use service::{
    CommandService, ReplayService, ServiceBackend, ServiceReply, TokenUsage, TranslationRequest,
    TranslationService,
};
