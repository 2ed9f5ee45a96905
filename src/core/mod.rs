//! Core engine: extraction, aggregation, normalization, reconciliation and the
//! translation run driver.
//!
//! Pipeline: source tree → [`extract`] (per file) → [`aggregate`] (combined
//! mapping) → [`translate`] (external service, batch by batch) →
//! [`reconcile`] (per batch, then a final pass) → validated mapping.

pub mod aggregate;
pub mod artifact;
pub mod diff;
pub mod extract;
pub mod normalize;
pub mod output;
pub mod parsers;
pub mod reconcile;
pub mod schema;
pub mod translate;

pub use aggregate::{Aggregation, DetectionReport, SchemaAggregator};
pub use extract::{SchemaExtractor, TypeTables};
pub use normalize::NameNormalizer;
pub use schema::{FieldMap, NodeMap, NodeSchema, Section};
