use thiserror::Error;

/// Failures of a translation run.
///
/// Batch indices are 1-based, matching the artifact names. Batches saved
/// before the failing one stay on disk and can be reused with `--resume`.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("failed to prepare translation run: {0}")]
    Prepare(String),

    #[error("batch {batch}: translation service failed: {message}")]
    Service { batch: usize, message: String },

    #[error("batch {batch}: reply is not a usable JSON object: {detail}")]
    Shape { batch: usize, detail: String },

    #[error("batch {batch}: failed to save corrected batch: {message}")]
    Persist { batch: usize, message: String },

    #[error("failed to save final result: {0}")]
    Finalize(String),
}

impl TranslateError {
    /// Batch the failure belongs to, if any.
    pub fn batch(&self) -> Option<usize> {
        match self {
            TranslateError::Service { batch, .. }
            | TranslateError::Shape { batch, .. }
            | TranslateError::Persist { batch, .. } => Some(*batch),
            TranslateError::Prepare(_) | TranslateError::Finalize(_) => None,
        }
    }
}
