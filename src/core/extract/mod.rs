//! Schema extraction.
//!
//! Recovers node schemas from one parsed Python module:
//!
//! - Mapping tables: `NODE_CLASS_MAPPINGS` (registered name → class) and
//!   `NODE_DISPLAY_NAME_MAPPINGS` (registered name → display title), collected
//!   in a full first pass over module scope.
//! - Node classes: module-scope classes declaring `INPUT_TYPES` or a
//!   `RETURN_TYPES` sequence.
//! - Fields: inputs and widgets from the dict literals returned by
//!   `INPUT_TYPES`, outputs from `RETURN_TYPES`, renamed positionally by
//!   `RETURN_NAMES`.
//!
//! Nothing here fails: shapes that are not literals are skipped.

pub mod classify;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

use crate::config::Config;
use crate::core::parsers::python::{ClassDef, Expr, PyModule, Stmt, walk_scope};
use crate::core::schema::{FieldMap, NodeMap, NodeSchema};

use classify::{find_method, is_node_class};

pub const INPUT_METHOD: &str = "INPUT_TYPES";
pub const OUTPUT_TYPES_ATTR: &str = "RETURN_TYPES";
pub const OUTPUT_NAMES_ATTR: &str = "RETURN_NAMES";
pub const CLASS_MAPPINGS: &str = "NODE_CLASS_MAPPINGS";
pub const DISPLAY_NAME_MAPPINGS: &str = "NODE_DISPLAY_NAME_MAPPINGS";

/// The closed type-tag sets driving classification and the primitive pass.
#[derive(Debug, Clone)]
pub struct TypeTables {
    widget: HashSet<String>,
    opaque: HashSet<String>,
    primitive: HashSet<String>,
}

impl TypeTables {
    pub fn from_config(config: &Config) -> Self {
        Self {
            widget: config.widget_types.iter().map(|t| t.to_uppercase()).collect(),
            opaque: config.opaque_types.iter().map(|t| t.to_uppercase()).collect(),
            primitive: config.primitive_labels.iter().cloned().collect(),
        }
    }

    /// Widget iff the uppercased tag is a widget type and not an opaque handle.
    pub fn is_widget_type(&self, tag: &str) -> bool {
        let upper = tag.to_uppercase();
        self.widget.contains(&upper) && !self.opaque.contains(&upper)
    }

    /// Primitive labels, matched case-sensitively.
    pub fn primitive_labels(&self) -> &HashSet<String> {
        &self.primitive
    }
}

impl Default for TypeTables {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Registered-name tables found at module scope.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MappingTables {
    /// Class name → registered key.
    pub key_for_class: HashMap<String, String>,
    /// Registered key → display title.
    pub display_names: HashMap<String, String>,
}

impl MappingTables {
    pub fn collect(module: &PyModule) -> Self {
        let mut tables = Self::default();
        walk_scope(&module.body, &mut |stmt| {
            let Stmt::Assign { targets, value } = stmt else {
                return;
            };
            let Expr::Dict(entries) = value else {
                return;
            };
            let is_target = |name: &str| targets.iter().any(|t| t == name);

            if is_target(CLASS_MAPPINGS) {
                for (key, class) in entries {
                    if let (Some(key), Some(class)) = (key.as_str(), class_reference(class)) {
                        debug!("mapping {} -> {}", class, key);
                        tables.key_for_class.insert(class, key.to_string());
                    }
                }
            } else if is_target(DISPLAY_NAME_MAPPINGS) {
                for (key, title) in entries {
                    if let (Some(key), Some(title)) = (key.as_str(), title.as_str()) {
                        tables
                            .display_names
                            .insert(key.to_string(), title.to_string());
                    }
                }
            }
        });
        tables
    }
}

/// Class referenced by a mapping value: `Foo` or `module.Foo`.
fn class_reference(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Name(name) => Some(name.clone()),
        Expr::Other(text) => {
            let last = text.rsplit('.').next()?;
            let is_identifier = !last.is_empty()
                && last.chars().all(|c| c.is_alphanumeric() || c == '_')
                && !last.starts_with(|c: char| c.is_ascii_digit());
            is_identifier.then(|| last.to_string())
        }
        _ => None,
    }
}

pub struct SchemaExtractor<'a> {
    tables: &'a TypeTables,
}

impl<'a> SchemaExtractor<'a> {
    pub fn new(tables: &'a TypeTables) -> Self {
        Self { tables }
    }

    /// Extract every node schema defined by `module`, tagged with `source_file`.
    pub fn extract(&self, module: &PyModule, source_file: Option<&Path>) -> NodeMap {
        let mappings = MappingTables::collect(module);
        let mut nodes = NodeMap::new();

        walk_scope(&module.body, &mut |stmt| {
            let Stmt::Class(class) = stmt else {
                return;
            };
            if !is_node_class(class) {
                debug!("class {} (line {}) is not a node", class.name, class.line);
                return;
            }

            let key = mappings
                .key_for_class
                .get(&class.name)
                .cloned()
                .unwrap_or_else(|| class.name.clone());
            let title = mappings
                .display_names
                .get(&key)
                .cloned()
                .unwrap_or_else(|| key.clone());

            let mut schema = self.build_schema(class, title);
            schema.source_file = source_file.map(Path::to_path_buf);
            debug!(
                "node {} from class {}: {} inputs, {} widgets, {} outputs",
                key,
                class.name,
                schema.inputs.len(),
                schema.widgets.len(),
                schema.outputs.len()
            );
            nodes.insert(key, schema);
        });

        nodes
    }

    fn build_schema(&self, class: &ClassDef, title: String) -> NodeSchema {
        let mut schema = NodeSchema::new(title);
        self.collect_input_fields(class, &mut schema);
        schema.outputs = collect_outputs(class);
        schema.apply_primitive_identity(self.tables.primitive_labels());
        schema
    }

    fn collect_input_fields(&self, class: &ClassDef, schema: &mut NodeSchema) {
        let Some(method) = find_method(class, INPUT_METHOD) else {
            return;
        };

        walk_scope(&method.body, &mut |stmt| {
            let Stmt::Return(Some(Expr::Dict(sections))) = stmt else {
                return;
            };
            for (_, section) in sections {
                let Expr::Dict(entries) = section else {
                    continue;
                };
                for (name, declaration) in entries {
                    let Some(name) = name.as_str() else {
                        continue;
                    };
                    let is_widget = declared_type_tag(declaration)
                        .is_some_and(|tag| self.tables.is_widget_type(tag));
                    let target = if is_widget {
                        &mut schema.widgets
                    } else {
                        &mut schema.inputs
                    };
                    target.insert(name.to_string(), name.to_string());
                }
            }
        });
    }
}

/// First element of a `("TYPE", {...})` declaration, when it is a tag.
fn declared_type_tag(declaration: &Expr) -> Option<&str> {
    declaration.as_sequence()?.first()?.as_tag()
}

/// Outputs in class-body order: `RETURN_TYPES` synthesizes `output_<i>` keys,
/// a later `RETURN_NAMES` renames the outputs accumulated so far.
fn collect_outputs(class: &ClassDef) -> FieldMap {
    let mut outputs = FieldMap::new();
    for stmt in &class.body {
        let Stmt::Assign { targets, value } = stmt else {
            continue;
        };
        let Some(items) = value.as_sequence() else {
            continue;
        };
        if targets.iter().any(|t| t == OUTPUT_TYPES_ATTR) {
            outputs = items
                .iter()
                .enumerate()
                .map(|(index, element)| {
                    let label = element
                        .as_tag()
                        .map(str::to_string)
                        .unwrap_or_else(|| element.label());
                    (format!("output_{}", index), label)
                })
                .collect();
        } else if targets.iter().any(|t| t == OUTPUT_NAMES_ATTR) {
            outputs = rename_outputs(outputs, items);
        }
    }
    outputs
}

/// Positional rename over the outputs gathered so far.
///
/// Outputs past the last name are dropped; a non-string name keeps the
/// current key. An empty names literal renames nothing.
fn rename_outputs(outputs: FieldMap, names: &[Expr]) -> FieldMap {
    if names.is_empty() {
        return outputs;
    }
    names
        .iter()
        .zip(outputs)
        .map(|(name, (current, label))| {
            let key = name.as_str().map(str::to_string).unwrap_or(current);
            (key, label)
        })
        .collect()
}
