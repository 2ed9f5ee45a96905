//! Per-batch repair and the final whole-node validation.
//!
//! The original mapping is ground truth: the result always has exactly its
//! node keys, and within each node exactly its section keys. Candidate data
//! only ever supplies values.

use serde_json::{Map, Value};

use super::{CorrectionLog, Reconciled};
use crate::core::schema::{FieldMap, NodeMap, NodeSchema, Section};
use crate::issues::{
    FieldRef, IncompleteNodeIssue, MissingKeyIssue, MissingTitleIssue, UnusableValueIssue,
    UntranslatedNodeIssue,
};

/// Top-level fields a translated node must carry to pass final validation.
pub const REQUIRED_FIELDS: [&str; 4] = ["title", "inputs", "widgets", "outputs"];

/// Reconcile one batch's candidate against its original slice.
pub fn reconcile_batch(original: &NodeMap, candidate: &Map<String, Value>) -> Reconciled {
    let mut log = CorrectionLog::new();
    let mut nodes = NodeMap::with_capacity(original.len());

    for (key, schema) in original {
        let repaired = match candidate.get(key) {
            Some(Value::Object(node)) => repair_node(key, schema, node, &mut log),
            _ => {
                log.push(UntranslatedNodeIssue { node: key.clone() });
                schema.clone()
            }
        };
        nodes.insert(key.clone(), repaired);
    }

    Reconciled { nodes, log }
}

/// Whole-node safety net over the merged result of all batches.
///
/// A node that is absent or lacks any required field is replaced by its
/// original; every other node still goes through per-key repair.
pub fn final_validation(original: &NodeMap, translated: &Map<String, Value>) -> Reconciled {
    let mut log = CorrectionLog::new();
    let mut nodes = NodeMap::with_capacity(original.len());

    for (key, schema) in original {
        let validated = match translated.get(key) {
            Some(Value::Object(node)) => {
                let missing_fields: Vec<&'static str> = REQUIRED_FIELDS
                    .into_iter()
                    .filter(|field| !node.contains_key(*field))
                    .collect();
                if missing_fields.is_empty() {
                    repair_node(key, schema, node, &mut log)
                } else {
                    log.push(IncompleteNodeIssue {
                        node: key.clone(),
                        missing_fields,
                    });
                    schema.clone()
                }
            }
            _ => {
                log.push(UntranslatedNodeIssue { node: key.clone() });
                schema.clone()
            }
        };
        nodes.insert(key.clone(), validated);
    }

    Reconciled { nodes, log }
}

fn repair_node(
    key: &str,
    original: &NodeSchema,
    candidate: &Map<String, Value>,
    log: &mut CorrectionLog,
) -> NodeSchema {
    let title = match candidate.get("title") {
        Some(Value::String(title)) => title.clone(),
        _ => {
            log.push(MissingTitleIssue {
                node: key.to_string(),
            });
            original.title.clone()
        }
    };

    let mut repaired = NodeSchema::new(title);
    repaired.source_file = original.source_file.clone();

    for section in Section::ALL {
        let candidate_section = candidate.get(section.as_str()).and_then(Value::as_object);
        *repaired.section_mut(section) =
            repair_section(key, section, original.section(section), candidate_section, log);
    }

    repaired
}

fn repair_section(
    node: &str,
    section: Section,
    original: &FieldMap,
    candidate: Option<&Map<String, Value>>,
    log: &mut CorrectionLog,
) -> FieldMap {
    let mut repaired = FieldMap::with_capacity(original.len());

    for field in original.keys() {
        let value = match candidate.and_then(|c| c.get(field)) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Number(number)) => number.to_string(),
            Some(Value::Bool(flag)) => flag.to_string(),
            Some(other) => {
                log.push(UnusableValueIssue {
                    field: FieldRef::new(node, section, field),
                    found: json_type(other),
                });
                field.clone()
            }
            None => {
                log.push(MissingKeyIssue {
                    field: FieldRef::new(node, section, field),
                });
                field.clone()
            }
        };
        repaired.insert(field.clone(), value);
    }

    repaired
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
