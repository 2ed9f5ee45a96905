//! Strict cross-check of a translated artifact against its original.
//!
//! Some translation replies translate field *keys* as well as values. This
//! pass builds an English ↔ Chinese name table from both artifacts and uses
//! it to restore every Han-script key to the original English key.

use indexmap::IndexMap;
use serde::Serialize;

use super::CorrectionLog;
use crate::core::schema::{FieldMap, NodeMap, NodeSchema, Section};
use crate::issues::{AmbiguousKeyIssue, FieldRef, RekeyedEntryIssue, UnmappedKeyIssue};
use crate::utils::contains_han;

/// Bidirectional name table, persisted as `translation_mapping.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslationTable {
    pub en_to_cn: IndexMap<String, String>,
    pub cn_to_en: IndexMap<String, String>,
    /// Every English key seen for a Han value, in discovery order.
    /// `cn_to_en` keeps only the last one.
    #[serde(skip)]
    candidates: IndexMap<String, Vec<String>>,
}

impl TranslationTable {
    fn link(&mut self, english: &str, chinese: &str) {
        self.en_to_cn
            .insert(english.to_string(), chinese.to_string());
        self.cn_to_en
            .insert(chinese.to_string(), english.to_string());
        let keys = self.candidates.entry(chinese.to_string()).or_default();
        if !keys.iter().any(|k| k == english) {
            keys.push(english.to_string());
        }
    }

    /// English keys linked to `chinese`.
    pub fn english_for(&self, chinese: &str) -> &[String] {
        self.candidates
            .get(chinese)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CrossCheck {
    pub nodes: NodeMap,
    pub table: TranslationTable,
    pub log: CorrectionLog,
    /// True if at least one key was restored.
    pub corrections_made: bool,
}

/// Pairs gathered from both artifacts:
///
/// 1. an original identity entry (`key == value`) whose translated value is Han;
/// 2. a translated entry with an English key and a Han value;
/// 3. a translated entry with a Han key and an English value.
pub fn build_translation_table(original: &NodeMap, translated: &NodeMap) -> TranslationTable {
    let mut table = TranslationTable::default();

    for (node, schema) in original {
        let Some(translated_schema) = translated.get(node) else {
            continue;
        };
        for section in Section::ALL {
            let translated_section = translated_schema.section(section);
            for (key, value) in schema.section(section) {
                if key != value {
                    continue;
                }
                if let Some(chinese) = translated_section.get(key)
                    && contains_han(chinese)
                {
                    table.link(key, chinese);
                }
            }
        }
    }

    for schema in translated.values() {
        for section in Section::ALL {
            for (key, value) in schema.section(section) {
                match (contains_han(key), contains_han(value)) {
                    (false, true) => table.link(key, value),
                    (true, false) => table.link(value, key),
                    _ => {}
                }
            }
        }
    }

    table
}

/// Restore Han-script keys in `translated` to their original English keys.
///
/// Lookup order: a unique original key of the same section linked to the Han
/// key, then a unique case-insensitive match. Anything else is kept
/// unchanged with a warning. Nodes absent from the original are kept.
pub fn cross_check(original: &NodeMap, translated: &NodeMap) -> CrossCheck {
    let table = build_translation_table(original, translated);
    let mut log = CorrectionLog::new();
    let mut corrections_made = false;
    let mut nodes = NodeMap::with_capacity(translated.len());

    for (node, schema) in translated {
        let original_schema = original.get(node);
        let mut corrected = NodeSchema::new(schema.title.clone());
        corrected.source_file = schema.source_file.clone();

        for section in Section::ALL {
            let original_keys: Vec<&String> = original_schema
                .map(|s| s.section(section).keys().collect())
                .unwrap_or_default();
            let mut fields = FieldMap::with_capacity(schema.section(section).len());

            for (key, value) in schema.section(section) {
                if !contains_han(key) {
                    fields.insert(key.clone(), value.clone());
                    continue;
                }

                match resolve_key(key, &original_keys, &table) {
                    Resolution::Found { key: english, case_insensitive } => {
                        log.push(RekeyedEntryIssue {
                            node: node.clone(),
                            section,
                            from: key.clone(),
                            to: english.clone(),
                            case_insensitive,
                        });
                        corrections_made = true;
                        fields.insert(english, value.clone());
                    }
                    Resolution::Ambiguous(candidates) => {
                        log.push(AmbiguousKeyIssue {
                            field: FieldRef::new(node, section, key),
                            candidates,
                        });
                        fields.insert(key.clone(), value.clone());
                    }
                    Resolution::Unmapped => {
                        log.push(UnmappedKeyIssue {
                            field: FieldRef::new(node, section, key),
                        });
                        fields.insert(key.clone(), value.clone());
                    }
                }
            }

            *corrected.section_mut(section) = fields;
        }

        nodes.insert(node.clone(), corrected);
    }

    CrossCheck {
        nodes,
        table,
        log,
        corrections_made,
    }
}

enum Resolution {
    Found { key: String, case_insensitive: bool },
    Ambiguous(Vec<String>),
    Unmapped,
}

fn resolve_key(key: &str, original_keys: &[&String], table: &TranslationTable) -> Resolution {
    let english = table.english_for(key);
    if english.is_empty() {
        return Resolution::Unmapped;
    }

    // Han values are shared across sections, so only this section's keys count.
    let exact: Vec<String> = original_keys
        .iter()
        .filter(|k| english.iter().any(|e| e == k.as_str()))
        .map(|k| k.to_string())
        .collect();
    if let Some(resolution) = pick(exact, false) {
        return resolution;
    }

    let folded: Vec<String> = english.iter().map(|e| e.to_lowercase()).collect();
    let case_matches: Vec<String> = original_keys
        .iter()
        .filter(|k| folded.contains(&k.to_lowercase()))
        .map(|k| k.to_string())
        .collect();
    pick(case_matches, true).unwrap_or(Resolution::Unmapped)
}

fn pick(mut matches: Vec<String>, case_insensitive: bool) -> Option<Resolution> {
    match matches.len() {
        0 => None,
        1 => matches.pop().map(|key| Resolution::Found {
            key,
            case_insensitive,
        }),
        _ => Some(Resolution::Ambiguous(matches)),
    }
}
