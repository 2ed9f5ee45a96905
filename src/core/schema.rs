//! Node schema data model.
//!
//! A [`NodeSchema`] is the unit of translation: a display title plus three
//! independent field mappings. Every persisted artifact (extraction output,
//! corrected batches, final translation) is a [`NodeMap`] serialized with the
//! fields in canonical order: `title`, `inputs`, `widgets`, `outputs`.

use std::{collections::HashSet, path::PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered field name → label mapping.
pub type FieldMap = IndexMap<String, String>;

/// Ordered node key → schema mapping, in discovery order.
pub type NodeMap = IndexMap<String, NodeSchema>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSchema {
    pub title: String,
    #[serde(default)]
    pub inputs: FieldMap,
    #[serde(default)]
    pub widgets: FieldMap,
    #[serde(default)]
    pub outputs: FieldMap,
    /// Absolute path of the defining file. Reporting only, never persisted.
    #[serde(skip)]
    pub source_file: Option<PathBuf>,
}

/// One of the three field mappings of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Inputs,
    Widgets,
    Outputs,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Inputs, Section::Widgets, Section::Outputs];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Inputs => "inputs",
            Section::Widgets => "widgets",
            Section::Outputs => "outputs",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NodeSchema {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn section(&self, section: Section) -> &FieldMap {
        match section {
            Section::Inputs => &self.inputs,
            Section::Widgets => &self.widgets,
            Section::Outputs => &self.outputs,
        }
    }

    pub fn section_mut(&mut self, section: Section) -> &mut FieldMap {
        match section {
            Section::Inputs => &mut self.inputs,
            Section::Widgets => &mut self.widgets,
            Section::Outputs => &mut self.outputs,
        }
    }

    /// Total number of fields across all sections.
    pub fn field_count(&self) -> usize {
        self.inputs.len() + self.widgets.len() + self.outputs.len()
    }

    /// Replaces every value that textually equals a primitive type label with
    /// the entry's own key. Returns the number of values rewritten.
    pub fn apply_primitive_identity(&mut self, primitive_labels: &HashSet<String>) -> usize {
        let mut rewritten = 0;
        for section in Section::ALL {
            for (key, value) in self.section_mut(section).iter_mut() {
                if primitive_labels.contains(value.as_str()) && value != key {
                    *value = key.clone();
                    rewritten += 1;
                }
            }
        }
        rewritten
    }
}

/// Runs the primitive-identity pass over a whole mapping.
pub fn normalize_node_map(nodes: &mut NodeMap, primitive_labels: &HashSet<String>) -> usize {
    nodes
        .values_mut()
        .map(|schema| schema.apply_primitive_identity(primitive_labels))
        .sum()
}

/// Copy of the mapping with provenance dropped, as handed to translation.
pub fn strip_provenance(nodes: &NodeMap) -> NodeMap {
    nodes
        .iter()
        .map(|(key, schema)| {
            let mut schema = schema.clone();
            schema.source_file = None;
            (key.clone(), schema)
        })
        .collect()
}
