//! Persisted artifact I/O.
//!
//! Artifacts are UTF-8 JSON with 2-space indentation and a trailing newline.
//! Non-ASCII labels are written as-is, never escaped.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::{Map, Value};

use super::schema::NodeMap;

/// Serialize `value` to `path`, creating parent directories as needed.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;

    fs::write(path, format!("{}\n", content))
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(())
}

/// Load a JSON file whose root must be an object.
pub fn load_json_object(path: &Path) -> Result<Map<String, Value>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("Root of JSON file must be an object: {}", path.display()),
    }
}

/// Load a well-formed node mapping (extraction output or a corrected artifact).
pub fn load_node_map(path: &Path) -> Result<NodeMap> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse node mapping: {}", path.display()))
}

/// Write text lines, one per line, creating parent directories as needed.
pub fn save_lines<I, S>(path: &Path, lines: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut content = String::new();
    for line in lines {
        content.push_str(line.as_ref());
        content.push('\n');
    }

    fs::write(path, content).with_context(|| format!("Failed to write file: {}", path.display()))
}
