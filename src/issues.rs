//! Issue types for extraction and reconciliation results.
//!
//! Every decision made while repairing a translated mapping is recorded as an
//! [`Issue`], and so is every source file that could not be parsed. Each issue
//! carries everything a reporter needs: severity, rule, and the node/section/key
//! it concerns. Correction logs are the `Display` form, one issue per line.

use enum_dispatch::enum_dispatch;

use crate::core::schema::Section;

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    ParseFailure,
    UntranslatedNode,
    MissingTitle,
    MissingKey,
    UnusableValue,
    IncompleteNode,
    RekeyedEntry,
    UnmappedKey,
    AmbiguousKey,
    GlossaryOverride,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::ParseFailure => write!(f, "parse-failure"),
            Rule::UntranslatedNode => write!(f, "untranslated-node"),
            Rule::MissingTitle => write!(f, "missing-title"),
            Rule::MissingKey => write!(f, "missing-key"),
            Rule::UnusableValue => write!(f, "unusable-value"),
            Rule::IncompleteNode => write!(f, "incomplete-node"),
            Rule::RekeyedEntry => write!(f, "rekeyed-entry"),
            Rule::UnmappedKey => write!(f, "unmapped-key"),
            Rule::AmbiguousKey => write!(f, "ambiguous-key"),
            Rule::GlossaryOverride => write!(f, "glossary-override"),
        }
    }
}

/// Where a field lives: node key, section and field key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub node: String,
    pub section: Section,
    pub key: String,
}

impl FieldRef {
    pub fn new(node: &str, section: Section, key: &str) -> Self {
        Self {
            node: node.to_string(),
            section,
            key: key.to_string(),
        }
    }
}

impl std::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.node, self.section, self.key)
    }
}

// ============================================================
// Issue Types - Extraction
// ============================================================

/// Source file that is not valid Python. The file is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailureIssue {
    pub file_path: String,
    pub error: String,
}

// ============================================================
// Issue Types - Reconciliation
// ============================================================

/// Candidate lacks the node (or it is not an object); the original is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntranslatedNodeIssue {
    pub node: String,
}

/// Candidate node has no usable title; the original title is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTitleIssue {
    pub node: String,
}

/// Candidate section lacks a key; the key itself is used as its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKeyIssue {
    pub field: FieldRef,
}

/// Candidate value is neither a string nor a scalar; identity fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusableValueIssue {
    pub field: FieldRef,
    /// JSON type of the rejected value.
    pub found: &'static str,
}

/// Final pass: node lacked required fields and was replaced by the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteNodeIssue {
    pub node: String,
    pub missing_fields: Vec<&'static str>,
}

/// Strict mode: a translated key was mapped back to its original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RekeyedEntryIssue {
    pub node: String,
    pub section: Section,
    pub from: String,
    pub to: String,
    /// Matched only after case folding.
    pub case_insensitive: bool,
}

/// Strict mode: a translated key has no original; the entry is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmappedKeyIssue {
    pub field: FieldRef,
}

/// Strict mode: case-insensitive lookup found several originals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousKeyIssue {
    pub field: FieldRef,
    pub candidates: Vec<String>,
}

/// Why a glossary rule replaced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlossaryRule {
    PreservedKey,
    PreservedType,
    Term,
}

impl std::fmt::Display for GlossaryRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GlossaryRule::PreservedKey => write!(f, "preserved key"),
            GlossaryRule::PreservedType => write!(f, "preserved type"),
            GlossaryRule::Term => write!(f, "standard term"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryOverrideIssue {
    pub field: FieldRef,
    pub from: String,
    pub to: String,
    pub rule: GlossaryRule,
}

// ============================================================
// Issue Enum
// ============================================================

#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    ParseFailure(ParseFailureIssue),
    UntranslatedNode(UntranslatedNodeIssue),
    MissingTitle(MissingTitleIssue),
    MissingKey(MissingKeyIssue),
    UnusableValue(UnusableValueIssue),
    IncompleteNode(IncompleteNodeIssue),
    RekeyedEntry(RekeyedEntryIssue),
    UnmappedKey(UnmappedKeyIssue),
    AmbiguousKey(AmbiguousKeyIssue),
    GlossaryOverride(GlossaryOverrideIssue),
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.severity(),
            self.rule(),
            self.message()
        )
    }
}

// ============================================================
// Report Trait
// ============================================================

/// Uniform view of an issue for reporters (CLI, logs, MCP).
#[enum_dispatch]
pub trait Report {
    fn severity(&self) -> Severity;

    fn rule(&self) -> Rule;

    /// Human-readable description.
    fn message(&self) -> String;

    /// Node the issue is about, if any.
    fn node(&self) -> Option<&str> {
        None
    }
}

// ============================================================
// Report Implementations
// ============================================================

impl Report for ParseFailureIssue {
    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn rule(&self) -> Rule {
        Rule::ParseFailure
    }

    fn message(&self) -> String {
        format!("{}: {}", self.file_path, self.error)
    }
}

impl Report for UntranslatedNodeIssue {
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn rule(&self) -> Rule {
        Rule::UntranslatedNode
    }

    fn message(&self) -> String {
        format!("node '{}' missing from translation, kept original", self.node)
    }

    fn node(&self) -> Option<&str> {
        Some(&self.node)
    }
}

impl Report for MissingTitleIssue {
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn rule(&self) -> Rule {
        Rule::MissingTitle
    }

    fn message(&self) -> String {
        format!("node '{}' has no translated title, kept original", self.node)
    }

    fn node(&self) -> Option<&str> {
        Some(&self.node)
    }
}

impl Report for MissingKeyIssue {
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn rule(&self) -> Rule {
        Rule::MissingKey
    }

    fn message(&self) -> String {
        format!(
            "'{}' missing from translation, using key as value",
            self.field
        )
    }

    fn node(&self) -> Option<&str> {
        Some(&self.field.node)
    }
}

impl Report for UnusableValueIssue {
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn rule(&self) -> Rule {
        Rule::UnusableValue
    }

    fn message(&self) -> String {
        format!(
            "'{}' translated to {} instead of text, using key as value",
            self.field, self.found
        )
    }

    fn node(&self) -> Option<&str> {
        Some(&self.field.node)
    }
}

impl Report for IncompleteNodeIssue {
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn rule(&self) -> Rule {
        Rule::IncompleteNode
    }

    fn message(&self) -> String {
        format!(
            "node '{}' lacks {}, restored original",
            self.node,
            self.missing_fields.join(", ")
        )
    }

    fn node(&self) -> Option<&str> {
        Some(&self.node)
    }
}

impl Report for RekeyedEntryIssue {
    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn rule(&self) -> Rule {
        Rule::RekeyedEntry
    }

    fn message(&self) -> String {
        let how = if self.case_insensitive {
            " (case-insensitive)"
        } else {
            ""
        };
        format!(
            "{}.{}: '{}' restored to '{}'{}",
            self.node, self.section, self.from, self.to, how
        )
    }

    fn node(&self) -> Option<&str> {
        Some(&self.node)
    }
}

impl Report for UnmappedKeyIssue {
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn rule(&self) -> Rule {
        Rule::UnmappedKey
    }

    fn message(&self) -> String {
        format!("'{}' has no original key, left unchanged", self.field)
    }

    fn node(&self) -> Option<&str> {
        Some(&self.field.node)
    }
}

impl Report for AmbiguousKeyIssue {
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn rule(&self) -> Rule {
        Rule::AmbiguousKey
    }

    fn message(&self) -> String {
        format!(
            "'{}' matches several originals ({}), left unchanged",
            self.field,
            self.candidates.join(", ")
        )
    }

    fn node(&self) -> Option<&str> {
        Some(&self.field.node)
    }
}

impl Report for GlossaryOverrideIssue {
    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn rule(&self) -> Rule {
        Rule::GlossaryOverride
    }

    fn message(&self) -> String {
        format!(
            "'{}' {} -> {} ({})",
            self.field, self.from, self.to, self.rule
        )
    }

    fn node(&self) -> Option<&str> {
        Some(&self.field.node)
    }
}
