use anyhow::{Context, Result};
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, run};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    for field in ["outputDir", "batchSize", "widgetTypes", "phrases", "translator", "glossary"] {
        assert!(
            parsed.get(field).is_some(),
            "Config should have '{}' field",
            field
        );
    }
    assert_eq!(parsed["batchSize"], 6);
    assert_eq!(parsed["outputDir"], "./output");

    assert!(
        content.contains("\n  \""),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = run(test.command().arg("init"))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(output.stdout.contains("✓ Created .nodelingorc.json"));
    assert!(test.root().join(".nodelingorc.json").exists());

    let content = test.read_file(".nodelingorc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".nodelingorc.json", "{}")?;

    let output = run(test.command().arg("init"))?;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains(".nodelingorc.json already exists"));
    assert_eq!(test.read_file(".nodelingorc.json")?, "{}");

    Ok(())
}

#[test]
fn test_no_command_prints_help() -> Result<()> {
    let test = CliTest::new()?;

    let output = run(&mut test.command())?;

    assert_eq!(output.code, Some(0));
    assert!(output.stdout.contains("Usage:"));

    Ok(())
}
