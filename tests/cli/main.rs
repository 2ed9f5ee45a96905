use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use anyhow::{Context, Result};
use insta_cmd::get_cargo_bin;
use serde_json::Value;
use tempfile::TempDir;

mod diff;
mod extract;
mod init;
mod reconcile;
mod translate;

const BIN_NAME: &str = "nodelingo";

/// Two registered nodes; only the first has a display name.
pub const DEMO_NODES_PY: &str = r#"
class ImageBlur:
    @classmethod
    def INPUT_TYPES(cls):
        return {
            "required": {
                "image": ("IMAGE",),
                "radius": ("INT", {"default": 3, "min": 1}),
            },
        }

    RETURN_TYPES = ("IMAGE",)
    FUNCTION = "blur"
    CATEGORY = "demo"


class MaskInvert:
    @classmethod
    def INPUT_TYPES(cls):
        return {"required": {"mask": ("MASK",)}}

    RETURN_TYPES = ("MASK",)
    RETURN_NAMES = ("mask",)
    FUNCTION = "invert"


NODE_CLASS_MAPPINGS = {
    "Demo: Image Blur": ImageBlur,
    "Demo: Mask Invert": MaskInvert,
}
NODE_DISPLAY_NAME_MAPPINGS = {
    "Demo: Image Blur": "Image Blur",
}
"#;

pub struct CliTest {
    _temp_dir: TempDir,
    project_dir: PathBuf,
}

impl CliTest {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().canonicalize()?;
        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    pub fn with_file(path: &str, content: &str) -> Result<Self> {
        let test = Self::new()?;
        test.write_file(path, content)?;
        Ok(test)
    }

    /// A project holding the `demo` plugin.
    pub fn with_demo_plugin() -> Result<Self> {
        let test = Self::with_file("demo/nodes.py", DEMO_NODES_PY)?;
        test.write_file("demo/__init__.py", "from .nodes import *\n")?;
        Ok(test)
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.project_dir.join(path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory:{}", parent.display()))?;
        }

        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;

        Ok(())
    }

    pub fn write_json(&self, path: &str, value: &Value) -> Result<()> {
        self.write_file(path, &serde_json::to_string_pretty(value)?)
    }

    pub fn root(&self) -> &Path {
        &self.project_dir
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(get_cargo_bin(BIN_NAME));
        cmd.current_dir(&self.project_dir);
        cmd.env_clear();
        cmd.env("NO_COLOR", "1"); // Disable colors for consistent test output
        cmd
    }

    pub fn extract_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("extract");
        cmd
    }

    pub fn translate_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("translate");
        cmd
    }

    pub fn reconcile_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("reconcile");
        cmd
    }

    pub fn diff_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("diff");
        cmd
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        let file_path = self.project_dir.join(path);
        fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }

    pub fn read_json(&self, path: &str) -> Result<Value> {
        let content = self.read_file(path)?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON: {}", path))
    }
}

/// Captured stdout/stderr of a finished command.
pub struct RunOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

pub fn run(cmd: &mut Command) -> Result<RunOutput> {
    let Output {
        status,
        stdout,
        stderr,
    } = cmd.output().context("Failed to run nodelingo")?;
    Ok(RunOutput {
        code: status.code(),
        stdout: String::from_utf8(stdout)?,
        stderr: String::from_utf8(stderr)?,
    })
}
