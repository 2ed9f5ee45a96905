//! Reconciliation of untrusted translations with their original schemas.
//!
//! - [`reconcile_batch`]: per-batch, per-key repair.
//! - [`final_validation`]: whole-node safety net over the merged result.
//! - [`cross_check`]: strict mode restoring translated keys.
//! - [`Glossary`]: optional fixed-term overrides.
//!
//! None of these fail: every gap is repaired and recorded in a
//! [`CorrectionLog`].

pub mod cross_check;
pub mod glossary;
mod correction_log;
mod repair;

pub use cross_check::{CrossCheck, TranslationTable, build_translation_table, cross_check};
pub use glossary::Glossary;
pub use correction_log::CorrectionLog;
pub use repair::{REQUIRED_FIELDS, final_validation, reconcile_batch};

use crate::core::schema::NodeMap;

/// A repaired mapping and the decisions that produced it.
#[derive(Debug, Clone, Default)]
pub struct Reconciled {
    pub nodes: NodeMap,
    pub log: CorrectionLog,
}
