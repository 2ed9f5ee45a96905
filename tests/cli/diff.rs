use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, run};

#[test]
fn test_diff_same_base_name_reports_nothing() -> Result<()> {
    let test = CliTest::new()?;
    test.write_json("old/nodes.json", &json!({"Cat: Node A": {"title": "A"}}))?;
    test.write_json("new/nodes.json", &json!({"Cat: NodeA": {"title": "A"}}))?;

    let output = run(test
        .diff_command()
        .args(["old/nodes.json", "new/nodes.json"]))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(output.stdout.contains("No new nodes (1 old, 1 new)"));
    assert!(!test.root().join("new/added_nodes.json").exists());

    Ok(())
}

#[test]
fn test_diff_writes_added_nodes() -> Result<()> {
    let test = CliTest::new()?;
    test.write_json("old/nodes.json", &json!({"Cat: Node A": {"title": "A"}}))?;
    test.write_json(
        "new/nodes.json",
        &json!({
            "Cat: NodeA": {"title": "A"},
            "Cat: Node B": {"title": "B"}
        }),
    )?;

    let output = run(test
        .diff_command()
        .args(["old/nodes.json", "new/nodes.json"]))?;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("Added 1 new node(s) (1 old, 2 new):"));
    assert!(output.stdout.contains("+ Cat: NodeB"));

    let added = test.read_json("new/added_nodes.json")?;
    assert_eq!(added, json!({"Cat: NodeB": {"title": "B"}}));

    Ok(())
}

#[test]
fn test_diff_output_dir() -> Result<()> {
    let test = CliTest::new()?;
    test.write_json("old.json", &json!({}))?;
    test.write_json("new.json", &json!({"Layer Mask: Mask Edge Ultra Detail V2": {}}))?;

    let output = run(test
        .diff_command()
        .args(["old.json", "new.json", "--output", "diffs"]))?;

    assert_eq!(output.code, Some(1));
    let added = test.read_json("diffs/added_nodes.json")?;
    assert_eq!(
        added.as_object().map(|o| o.keys().cloned().collect::<Vec<_>>()),
        Some(vec!["Layer Mask: MaskEdgeUltraDetailV2".to_string()])
    );

    Ok(())
}

#[test]
fn test_diff_missing_file() -> Result<()> {
    let test = CliTest::new()?;
    test.write_json("old.json", &json!({}))?;

    let output = run(test.diff_command().args(["old.json", "nope.json"]))?;

    assert_eq!(output.code, Some(2));
    assert!(output.stderr.contains("Failed to read file"));

    Ok(())
}
