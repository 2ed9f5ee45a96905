//! Model Context Protocol (MCP) server implementation.
//!
//! Exposes extraction, name normalization, diffing and reconciliation to AI
//! agents as MCP tools over stdio.
//!
//! ## Module Structure
//!
//! - `server`: Main MCP server implementation
//! - `types`: Tool parameter and result types

mod server;
pub mod types;

pub use server::{NodelingoMcpServer, run_server};
