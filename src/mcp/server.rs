use std::path::Path;

use anyhow::Result;
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde::Serialize;

use crate::{
    config::{Config, load_config},
    core::{
        NameNormalizer, SchemaAggregator, TypeTables,
        artifact::{load_json_object, load_node_map},
        diff::diff_nodes,
        reconcile::{CorrectionLog, Glossary, cross_check, final_validation, reconcile_batch},
        schema::{NodeMap, strip_provenance},
    },
    issues::Issue,
    utils::plugin_name,
};

use super::types::{
    ConfigDto, ConfigValues, DiffNodesParams, DiffNodesResult, ExtractNodesParams,
    ExtractNodesResult, GetConfigParams, NormalizeNamesParams, NormalizeNamesResult,
    NormalizedName, ParseFailureItem, ReconcileModeParam, ReconcileTranslationParams,
    ReconcileTranslationResult,
};

#[derive(Clone)]
pub struct NodelingoMcpServer {
    tool_router: ToolRouter<Self>,
}

impl Default for NodelingoMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl NodelingoMcpServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    /// Extract node schemas from a plugin directory
    #[tool(
        description = "Statically extract node schemas (title, inputs, widgets, outputs) from a ComfyUI plugin's Python sources. Nothing is written to disk."
    )]
    pub async fn extract_nodes(
        &self,
        params: Parameters<ExtractNodesParams>,
    ) -> Result<CallToolResult, McpError> {
        let plugin_path = Path::new(&params.0.plugin_path);
        let config_root = params.0.project_root_path.as_deref().map(Path::new);
        let config = load(config_root.unwrap_or(plugin_path))?;

        let tables = TypeTables::from_config(&config);
        let patterns = config.ignore_patterns();
        let aggregation = SchemaAggregator::new(&tables, &patterns).aggregate(plugin_path);
        if let Some(error) = aggregation.scan_error {
            return Err(McpError::internal_error(
                format!("Scan failed: {}", error),
                None,
            ));
        }

        let parse_failures = aggregation
            .issues
            .iter()
            .filter_map(|issue| match issue {
                Issue::ParseFailure(failure) => Some(ParseFailureItem {
                    file: failure.file_path.clone(),
                    error: failure.error.clone(),
                }),
                _ => None,
            })
            .collect();

        let plugin = plugin_path
            .canonicalize()
            .map(|p| plugin_name(&p))
            .unwrap_or_else(|_| plugin_name(plugin_path));

        let result = ExtractNodesResult {
            plugin,
            total_files: aggregation.report.total_files,
            processed_files: aggregation.report.processed_files,
            node_count: aggregation.nodes.len(),
            nodes: to_value(&strip_provenance(&aggregation.nodes))?,
            parse_failures,
        };

        to_tool_result(&result)
    }

    /// Normalize raw node keys
    #[tool(
        description = "Normalize raw node keys (category prefix, phrase table, version markers) and return the comparison base name used for diffing."
    )]
    pub async fn normalize_names(
        &self,
        params: Parameters<NormalizeNamesParams>,
    ) -> Result<CallToolResult, McpError> {
        let config = load_optional(params.0.project_root_path.as_deref())?;
        let normalizer = NameNormalizer::from_config(&config);

        let items = params
            .0
            .names
            .iter()
            .map(|raw| NormalizedName {
                raw: raw.clone(),
                normalized: normalizer.normalize(raw),
                base_name: normalizer.base_name(raw),
            })
            .collect();

        to_tool_result(&NormalizeNamesResult { items })
    }

    /// List nodes added between two artifacts
    #[tool(
        description = "Compare two extraction artifacts and return the nodes of the new one whose base name is absent from the old one, under normalized keys."
    )]
    pub async fn diff_nodes(
        &self,
        params: Parameters<DiffNodesParams>,
    ) -> Result<CallToolResult, McpError> {
        let config = load_optional(params.0.project_root_path.as_deref())?;
        let old = load_json_object(Path::new(&params.0.old_path)).map_err(read_error)?;
        let new = load_json_object(Path::new(&params.0.new_path)).map_err(read_error)?;

        let diff = diff_nodes(&old, &new, &NameNormalizer::from_config(&config));

        let result = DiffNodesResult {
            old_count: old.len(),
            new_count: new.len(),
            added_count: diff.added_normalized.len(),
            added: diff.added_normalized,
        };

        to_tool_result(&result)
    }

    /// Reconcile a translated artifact against its original
    #[tool(
        description = "Repair a translated node artifact against its original: restore missing nodes, titles and keys (batch), replace incomplete nodes (final), or restore translated keys (strict). Returns the repaired nodes and every correction. Nothing is written to disk."
    )]
    pub async fn reconcile_translation(
        &self,
        params: Parameters<ReconcileTranslationParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let config = load_optional(params.project_root_path.as_deref())?;
        let original = load_node_map(Path::new(&params.original_path)).map_err(read_error)?;
        let translated_path = Path::new(&params.translated_path);

        let mut translation_table = None;
        let mut corrections_made = None;
        let (mut nodes, mut log): (NodeMap, CorrectionLog) = match params.mode {
            ReconcileModeParam::Batch => {
                let candidate = load_json_object(translated_path).map_err(read_error)?;
                let reconciled = reconcile_batch(&original, &candidate);
                (reconciled.nodes, reconciled.log)
            }
            ReconcileModeParam::Final => {
                let candidate = load_json_object(translated_path).map_err(read_error)?;
                let reconciled = final_validation(&original, &candidate);
                (reconciled.nodes, reconciled.log)
            }
            ReconcileModeParam::Strict => {
                let translated = load_node_map(translated_path).map_err(read_error)?;
                let checked = cross_check(&original, &translated);
                translation_table = Some(to_value(&checked.table)?);
                corrections_made = Some(checked.corrections_made);
                (checked.nodes, checked.log)
            }
        };

        if params.apply_glossary.unwrap_or(config.glossary.enabled) {
            Glossary::from_config(&config.glossary).apply(&mut nodes, &mut log);
        }

        let result = ReconcileTranslationResult {
            mode: params.mode,
            node_count: nodes.len(),
            nodes: to_value(&nodes)?,
            corrections: log.entries().iter().map(Issue::to_mcp_item).collect(),
            translation_table,
            corrections_made,
        };

        to_tool_result(&result)
    }

    /// Get the current nodelingo configuration
    #[tool(description = "Get the current nodelingo configuration.")]
    pub async fn get_config(
        &self,
        params: Parameters<GetConfigParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = Path::new(&params.0.project_root_path);

        let result = load_config(path)
            .map_err(|e| McpError::internal_error(format!("Failed to load config: {}", e), None))?;

        let config_dto = ConfigDto {
            from_file: result.from_file,
            config: ConfigValues::from(result.config),
        };

        to_tool_result(&config_dto)
    }
}

#[tool_handler]
impl ServerHandler for NodelingoMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Nodelingo MCP helps AI agents prepare ComfyUI plugin nodes for translation.\n\n\
                 Available tools:\n\
                 1. get_config - Get project configuration\n\
                 2. extract_nodes - Extract node schemas from a plugin directory\n\
                 3. normalize_names - Normalize raw node keys\n\
                 4. diff_nodes - List nodes added between two extraction artifacts\n\
                 5. reconcile_translation - Repair a translated artifact against its original\n\n\
                 Recommended Workflow:\n\
                 1. Use extract_nodes to get the schemas to translate\n\
                 2. Translate titles and field labels, never the keys\n\
                 3. Run reconcile_translation (batch mode) on every translated chunk\n\
                 4. Run reconcile_translation (final mode) on the merged result\n\
                 5. If keys were translated by mistake, use strict mode to restore them"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

fn load(path: &Path) -> Result<Config, McpError> {
    load_config(path)
        .map(|loaded| loaded.config)
        .map_err(|e| McpError::internal_error(format!("Failed to load config: {}", e), None))
}

fn load_optional(path: Option<&str>) -> Result<Config, McpError> {
    load(Path::new(path.unwrap_or(".")))
}

fn read_error(e: anyhow::Error) -> McpError {
    McpError::internal_error(format!("Failed to read artifact: {:#}", e), None)
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, McpError> {
    serde_json::to_value(value)
        .map_err(|e| McpError::internal_error(format!("JSON serialization failed: {}", e), None))
}

fn to_tool_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json_str = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("JSON serialization failed: {}", e), None)
    })?;

    Ok(CallToolResult::success(vec![Content::text(json_str)]))
}

/// Entry point for MCP server
pub fn run_server() -> Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let service = NodelingoMcpServer::new();
            let server = service.serve(rmcp::transport::stdio()).await?;
            server.waiting().await?;
            Ok(())
        })
}
