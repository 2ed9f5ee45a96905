use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".nodelingorc.json";

/// File names that never define nodes (package init modules).
pub const EXCLUDED_FILE_NAMES: &[&str] = &["__init__.py"];

/// File name prefixes of test modules, skipped while scanning.
pub const TEST_FILE_PREFIXES: &[&str] = &["test_"];

/// Extension of scanned source files.
pub const SOURCE_EXTENSION: &str = "py";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_widget_types")]
    pub widget_types: Vec<String>,
    #[serde(default = "default_opaque_types")]
    pub opaque_types: Vec<String>,
    #[serde(default = "default_primitive_labels")]
    pub primitive_labels: Vec<String>,
    #[serde(default = "default_phrases")]
    pub phrases: IndexMap<String, String>,
    #[serde(default)]
    pub translator: TranslatorConfig,
    #[serde(default)]
    pub glossary: GlossaryConfig,
}

/// How the external translation collaborator is reached.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatorConfig {
    /// Program and arguments. The program receives `{"system", "user"}` JSON on
    /// stdin and must print the model reply on stdout.
    #[serde(default)]
    pub command: Vec<String>,
    /// Replaces the built-in system instruction when set.
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default = "default_prompt_cost")]
    pub prompt_cost_per1k: f64,
    #[serde(default = "default_completion_cost")]
    pub completion_cost_per1k: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_preserved_types")]
    pub preserved_types: Vec<String>,
    #[serde(default = "default_preserved_keys")]
    pub preserved_keys: Vec<String>,
    #[serde(default = "default_terms")]
    pub terms: IndexMap<String, String>,
}

fn default_output_dir() -> String {
    "./output".to_string()
}

fn default_batch_size() -> usize {
    6
}

fn default_widget_types() -> Vec<String> {
    [
        "INT", "FLOAT", "STRING", "BOOLEAN", "COMBO", "DROPDOWN", "TEXT", "TEXTAREA", "SLIDER",
        "CHECKBOX", "COLOR", "RADIO", "SELECT", "NUMBER",
    ]
    .map(String::from)
    .to_vec()
}

fn default_opaque_types() -> Vec<String> {
    [
        "IMAGE",
        "LATENT",
        "MODEL",
        "VAE",
        "CLIP",
        "CONDITIONING",
        "MASK",
        "STYLE_MODEL",
        "CONTROL_NET",
        "BBOX",
        "SEGS",
    ]
    .map(String::from)
    .to_vec()
}

fn default_primitive_labels() -> Vec<String> {
    ["INT", "FLOAT", "BOOL", "STRING", "NUMBER", "BOOLEAN"]
        .map(String::from)
        .to_vec()
}

fn default_phrases() -> IndexMap<String, String> {
    [
        ("Llama Vision", "LlamaVision"),
        ("BiRefNet Ultra", "BiRefNetUltra"),
        ("Ben Ultra", "BenUltra"),
        ("Florence2 Ultra", "Florence2Ultra"),
        ("SAM2 Ultra", "SAM2Ultra"),
        ("SAM2 Video Ultra", "SAM2VideoUltra"),
        ("EVF-SAM Ultra", "EVFSAMUltra"),
        ("Transparent Background Ultra", "TransparentBackgroundUltra"),
        ("Human Parts Ultra", "HumanPartsUltra"),
        ("Mask Edge Ultra Detail", "MaskEdgeUltraDetail"),
    ]
    .into_iter()
    .map(|(phrase, replacement)| (phrase.to_string(), replacement.to_string()))
    .collect()
}

fn default_prompt_cost() -> f64 {
    0.0008
}

fn default_completion_cost() -> f64 {
    0.0020
}

fn default_preserved_types() -> Vec<String> {
    [
        "IMAGE", "MASK", "MODEL", "CROP_DATA", "ZIP", "PDF", "CSV", "INT", "FLOAT", "BOOLEAN",
        "STRING", "BBOX_LIST",
    ]
    .map(String::from)
    .to_vec()
}

fn default_preserved_keys() -> Vec<String> {
    [
        "width",
        "height",
        "width_old",
        "height_old",
        "job_id",
        "user_id",
        "base64_string",
        "image_quality",
        "image_format",
    ]
    .map(String::from)
    .to_vec()
}

fn default_terms() -> IndexMap<String, String> {
    [
        ("image", "图像"),
        ("mask", "遮罩"),
        ("model", "模型"),
        ("processor", "处理器"),
        ("device", "设备"),
        ("bbox", "边界框"),
        ("samples", "样本"),
        ("operation", "操作"),
        ("guide", "引导图"),
        ("threshold", "阈值"),
        ("radius", "半径"),
        ("contrast", "对比度"),
        ("brightness", "亮度"),
        ("saturation", "饱和度"),
        ("hue", "色调"),
        ("gamma", "伽马值"),
        ("index", "索引"),
        ("position", "位置"),
        ("size", "大小"),
        ("scale", "缩放"),
        ("count", "计数"),
        ("result", "结果"),
    ]
    .into_iter()
    .map(|(term, translation)| (term.to_string(), translation.to_string()))
    .collect()
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            system_prompt: None,
            prompt_cost_per1k: default_prompt_cost(),
            completion_cost_per1k: default_completion_cost(),
        }
    }
}

impl Default for GlossaryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            preserved_types: default_preserved_types(),
            preserved_keys: default_preserved_keys(),
            terms: default_terms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignores: Vec::new(),
            output_dir: default_output_dir(),
            batch_size: default_batch_size(),
            widget_types: default_widget_types(),
            opaque_types: default_opaque_types(),
            primitive_labels: default_primitive_labels(),
            phrases: default_phrases(),
            translator: TranslatorConfig::default(),
            glossary: GlossaryConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error for invalid glob patterns in `ignores`, a zero
    /// `batchSize`, or a phrase table entry with an empty side.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        if self.batch_size == 0 {
            bail!("'batchSize' must be greater than 0");
        }

        for (phrase, replacement) in &self.phrases {
            if phrase.trim().is_empty() || replacement.trim().is_empty() {
                bail!(
                    "Invalid entry in 'phrases': \"{}\" -> \"{}\"",
                    phrase,
                    replacement
                );
            }
        }

        Ok(())
    }

    /// Compiled `ignores` patterns. Call after [`Config::validate`].
    pub fn ignore_patterns(&self) -> Vec<Pattern> {
        self.ignores
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect()
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
