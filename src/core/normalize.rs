//! Node name canonicalization.
//!
//! Registered names drift between releases in spacing and punctuation
//! (`"LayerMask: Mask Edge Ultra Detail V2"` vs `"LayerMask: MaskEdgeUltraDetailV2"`).
//! [`NameNormalizer::normalize`] produces the stable, human-readable form used
//! as a persisted key; [`NameNormalizer::base_name`] produces the comparison
//! form used only for cross-version diffing.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::config::Config;

static VERSION_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^V\d+$").unwrap());

#[derive(Debug, Clone)]
pub struct NameNormalizer {
    /// Phrase words and replacement, longest phrase first.
    phrases: Vec<(Vec<String>, String)>,
}

impl NameNormalizer {
    pub fn new(phrases: &IndexMap<String, String>) -> Self {
        let mut phrases: Vec<(Vec<String>, String)> = phrases
            .iter()
            .map(|(phrase, replacement)| {
                let words = phrase.split_whitespace().map(str::to_string).collect();
                (words, replacement.clone())
            })
            .filter(|(words, _): &(Vec<String>, String)| !words.is_empty())
            .collect();
        // Stable: equal-length phrases keep their declared order.
        phrases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { phrases }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.phrases)
    }

    /// `"Prefix: Some Words V2"` → `"Prefix: SomeWordsV2"`.
    ///
    /// Without a colon the processed suffix is returned alone.
    pub fn normalize(&self, raw: &str) -> String {
        match raw.split_once(':') {
            Some((prefix, suffix)) => {
                format!("{}: {}", prefix.trim(), self.normalize_suffix(suffix.trim()))
            }
            None => self.normalize_suffix(raw.trim()),
        }
    }

    fn normalize_suffix(&self, suffix: &str) -> String {
        let words: Vec<&str> = suffix.split_whitespace().collect();
        let mut tokens: Vec<&str> = Vec::with_capacity(words.len());
        let mut i = 0;

        while i < words.len() {
            if is_version_marker(words[i]) {
                tokens.push(words[i]);
                i += 1;
                continue;
            }

            match self.phrase_at(&words[i..]) {
                Some((len, replacement)) => {
                    tokens.push(replacement);
                    i += len;
                }
                None => {
                    tokens.push(words[i]);
                    i += 1;
                }
            }
        }

        tokens.concat()
    }

    /// Longest phrase matching at the start of `words`.
    fn phrase_at(&self, words: &[&str]) -> Option<(usize, &str)> {
        self.phrases.iter().find_map(|(phrase, replacement)| {
            let matches = phrase.len() <= words.len()
                && phrase.iter().zip(words).all(|(p, w)| p == w);
            matches.then_some((phrase.len(), replacement.as_str()))
        })
    }

    /// Canonical base name: normalized, `:`/`-`/`_` turned into spaces, words
    /// joined by single spaces. Case is preserved.
    pub fn base_name(&self, raw: &str) -> String {
        let normalized = self.normalize(raw);
        normalized
            .replace([':', '-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub fn is_version_marker(word: &str) -> bool {
    VERSION_MARKER_RE.is_match(word)
}
