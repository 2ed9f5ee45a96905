//! Nodelingo - node schema extraction and translation reconciliation for
//! ComfyUI plugins
//!
//! Nodelingo statically recovers node schemas (title, inputs, widgets,
//! outputs) from plugin Python sources, drives batch translation through an
//! external service, and reconciles the untrusted translated text back into
//! the schemas without losing or corrupting keys.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (commands, report printer)
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction, aggregation, normalization, reconciliation, translation
//! - `issues`: Issue type definitions (parse failures, correction log entries)
//! - `mcp`: Model Context Protocol server implementation
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod mcp;
pub mod utils;
