//! Glossary overrides applied after repair.
//!
//! Rules, first match wins:
//! 1. preserved technical keys (`width`, `job_id`, ...) keep the key itself;
//! 2. keys whose uppercase form is a preserved type label become that label;
//! 3. keys with a standard term get the term.

use std::collections::{HashMap, HashSet};

use super::CorrectionLog;
use crate::config::GlossaryConfig;
use crate::core::schema::{NodeMap, Section};
use crate::issues::{FieldRef, GlossaryOverrideIssue, GlossaryRule};

#[derive(Debug, Clone, Default)]
pub struct Glossary {
    preserved_keys: HashSet<String>,
    preserved_types: HashSet<String>,
    /// Lowercased key → translation.
    terms: HashMap<String, String>,
}

impl Glossary {
    pub fn from_config(config: &GlossaryConfig) -> Self {
        Self {
            preserved_keys: config.preserved_keys.iter().cloned().collect(),
            preserved_types: config
                .preserved_types
                .iter()
                .map(|t| t.to_uppercase())
                .collect(),
            terms: config
                .terms
                .iter()
                .map(|(term, translation)| (term.to_lowercase(), translation.clone()))
                .collect(),
        }
    }

    /// Value the glossary dictates for `key`, if any.
    pub fn lookup(&self, key: &str) -> Option<(String, GlossaryRule)> {
        if self.preserved_keys.contains(key) {
            return Some((key.to_string(), GlossaryRule::PreservedKey));
        }
        let upper = key.to_uppercase();
        if self.preserved_types.contains(&upper) {
            return Some((upper, GlossaryRule::PreservedType));
        }
        self.terms
            .get(&key.to_lowercase())
            .map(|term| (term.clone(), GlossaryRule::Term))
    }

    /// Override field values in place; every change is logged.
    pub fn apply(&self, nodes: &mut NodeMap, log: &mut CorrectionLog) -> usize {
        let mut changed = 0;
        for (node, schema) in nodes.iter_mut() {
            for section in Section::ALL {
                for (key, value) in schema.section_mut(section).iter_mut() {
                    let Some((replacement, rule)) = self.lookup(key) else {
                        continue;
                    };
                    if *value == replacement {
                        continue;
                    }
                    log.push(GlossaryOverrideIssue {
                        field: FieldRef::new(node, section, key),
                        from: value.clone(),
                        to: replacement.clone(),
                        rule,
                    });
                    *value = replacement;
                    changed += 1;
                }
            }
        }
        changed
    }
}
