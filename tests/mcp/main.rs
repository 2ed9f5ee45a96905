use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::TempDir;


/// Test fixture for MCP integration tests
///
/// Manages a temporary project holding plugin sources and JSON artifacts.
pub struct McpTestFixture {
    _temp_dir: TempDir,
    project_root: PathBuf,
}

impl McpTestFixture {
    /// Create an empty test project
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_root = temp_dir.path().canonicalize()?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_root,
        })
    }

    /// Create a test project with one plugin directory
    ///
    /// # Example
    /// ```ignore
    /// let fixture = McpTestFixture::with_plugin("demo", vec![("nodes.py", SOURCE)])?;
    /// ```
    pub fn with_plugin(plugin: &str, files: Vec<(&str, &str)>) -> Result<Self> {
        let fixture = Self::new()?;
        for (name, content) in files {
            fixture.write_file(&format!("{}/{}", plugin, name), content)?;
        }
        Ok(fixture)
    }

    pub fn write_file(&self, relative_path: &str, content: &str) -> Result<()> {
        let path = self.project_root.join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        Ok(())
    }

    /// Write a JSON artifact and return its absolute path (for MCP parameters)
    pub fn write_json(&self, relative_path: &str, content: &Value) -> Result<String> {
        let json_str = serde_json::to_string_pretty(content)?;
        self.write_file(relative_path, &format!("{}\n", json_str))?;
        Ok(self.path(relative_path))
    }

    /// Write a .nodelingorc.json config file
    pub fn write_config(&self, content: &Value) -> Result<()> {
        let path = self.project_root.join(".nodelingorc.json");
        let json_str = serde_json::to_string_pretty(content)?;
        fs::write(&path, format!("{}\n", json_str))?;
        Ok(())
    }

    /// Absolute path of a project file as a string
    pub fn path(&self, relative_path: &str) -> String {
        self.project_root
            .join(relative_path)
            .to_string_lossy()
            .to_string()
    }

    /// Get the project root path as a string (for MCP parameters)
    pub fn root(&self) -> String {
        self.project_root.to_string_lossy().to_string()
    }

    /// Get the project root path as a Path reference
    pub fn root_path(&self) -> &Path {
        &self.project_root
    }
}

// ============================================================================
// Fixture Sources
// ============================================================================

pub const BLUR_NODE_PY: &str = r#"
class ImageBlur:
    @classmethod
    def INPUT_TYPES(cls):
        return {
            "required": {
                "image": ("IMAGE",),
                "radius": ("INT", {"default": 3}),
            },
        }

    RETURN_TYPES = ("IMAGE",)


NODE_CLASS_MAPPINGS = {"Demo: Image Blur": ImageBlur}
NODE_DISPLAY_NAME_MAPPINGS = {"Demo: Image Blur": "Image Blur"}
"#;

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Extract JSON value from a successful CallToolResult
///
/// Panics if the result indicates an error or cannot be parsed
pub fn extract_tool_result_json(result: &rmcp::model::CallToolResult) -> Value {
    if let Some(true) = result.is_error {
        panic!("Tool call returned an error: {:?}", result);
    }

    assert!(
        !result.content.is_empty(),
        "Tool result should have content"
    );

    let content_item = &result.content[0];
    let text_content = content_item
        .as_text()
        .expect("Tool result content should be text");

    serde_json::from_str(&text_content.text).expect("Tool result should be valid JSON")
}
