//! Set difference between two node mappings over canonical base names.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::normalize::NameNormalizer;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDiff {
    /// Added nodes under their keys in the new mapping.
    pub added: Map<String, Value>,
    /// The same nodes under normalized keys, as persisted.
    pub added_normalized: Map<String, Value>,
}

impl NodeDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }

    /// Normalized names of the added nodes, in new-mapping order.
    pub fn added_names(&self) -> Vec<&str> {
        self.added_normalized.keys().map(String::as_str).collect()
    }
}

/// Nodes of `new` whose base name does not occur among `old`'s base names.
pub fn diff_nodes(
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    normalizer: &NameNormalizer,
) -> NodeDiff {
    let old_base_names: HashSet<String> =
        old.keys().map(|name| normalizer.base_name(name)).collect();

    let mut diff = NodeDiff::default();
    for (name, data) in new {
        if old_base_names.contains(&normalizer.base_name(name)) {
            continue;
        }
        diff.added.insert(name.clone(), data.clone());
        diff.added_normalized
            .insert(normalizer.normalize(name), data.clone());
    }
    diff
}
