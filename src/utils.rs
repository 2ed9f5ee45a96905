//! Common utility functions shared across the codebase.

use std::sync::LazyLock;

use regex::Regex;

static HAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{Han}").unwrap());

/// Checks if the text contains at least one Han (Chinese script) character.
///
/// Used by the strict reconciliation mode to tell translated labels apart
/// from English keys.
///
/// # Examples
///
/// ```
/// use nodelingo::utils::contains_han;
///
/// assert!(contains_han("图像"));
/// assert!(contains_han("mask遮罩"));
/// assert!(!contains_han("image"));
/// assert!(!contains_han("イメージ"));
/// assert!(!contains_han(""));
/// ```
pub fn contains_han(text: &str) -> bool {
    HAN_RE.is_match(text)
}

/// Last path component of a plugin directory, used to name its artifacts.
///
/// Falls back to `"plugin"` for paths without a usable name (e.g. `/`).
pub fn plugin_name(path: &std::path::Path) -> String {
    path.components()
        .next_back()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .filter(|name| !name.is_empty() && name != "." && name != "/")
        .unwrap_or_else(|| "plugin".to_string())
}
