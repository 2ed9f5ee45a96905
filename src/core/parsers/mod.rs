//! Source parsers.
//!
//! - `python`: plugin source files (tree-sitter grammar lowered to a small
//!   statement model)

pub mod python;
