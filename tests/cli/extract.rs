use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, run};

#[test]
fn test_extract_writes_artifact_and_report() -> Result<()> {
    let test = CliTest::with_demo_plugin()?;

    let output = run(test.extract_command().arg("demo"))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(output.stdout.contains("✓ demo: 2 nodes from 1/1 files"));
    assert!(output.stdout.contains("output/demo/demo_nodes.json"));

    let nodes = test.read_json("output/demo/demo_nodes.json")?;
    assert_eq!(
        nodes,
        json!({
            "Demo: Image Blur": {
                "title": "Image Blur",
                "inputs": {"image": "image"},
                "widgets": {"radius": "radius"},
                "outputs": {"output_0": "IMAGE"}
            },
            "Demo: Mask Invert": {
                "title": "Demo: Mask Invert",
                "inputs": {"mask": "mask"},
                "widgets": {},
                "outputs": {"mask": "MASK"}
            }
        })
    );

    let report = test.read_json("output/demo/debug/node_detection_debug.json")?;
    assert_eq!(report["total_files"], 1);
    assert_eq!(report["processed_files"], 1);
    assert_eq!(report["found_nodes"], 2);
    assert_eq!(report["file_details"][0]["nodes_found"], 2);

    for dir in ["temp", "translations", "logs", "debug"] {
        assert!(test.root().join("output/demo").join(dir).is_dir());
    }

    Ok(())
}

#[test]
fn test_extract_artifact_keeps_non_ascii() -> Result<()> {
    let test = CliTest::with_file(
        "cn/nodes.py",
        r#"
class Blur:
    RETURN_TYPES = ("IMAGE",)

NODE_DISPLAY_NAME_MAPPINGS = {"Blur": "模糊"}
"#,
    )?;

    let output = run(test.extract_command().arg("cn"))?;
    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);

    let raw = test.read_file("output/cn/cn_nodes.json")?;
    assert!(raw.contains("\"title\": \"模糊\""));
    assert!(raw.ends_with('\n'));

    Ok(())
}

#[test]
fn test_extract_parse_failure_exits_with_failure() -> Result<()> {
    let test = CliTest::with_demo_plugin()?;
    test.write_file("demo/broken.py", "def broken(:\n    pass\n")?;

    let output = run(test.extract_command().arg("demo"))?;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("✓ demo: 2 nodes from 1/2 files"));
    assert!(output.stderr.contains("1 file(s) could not be parsed"));

    // The good file is still extracted.
    let nodes = test.read_json("output/demo/demo_nodes.json")?;
    assert_eq!(nodes.as_object().map(|o| o.len()), Some(2));

    let report = test.read_json("output/demo/debug/node_detection_debug.json")?;
    let failed = report["file_details"]
        .as_array()
        .into_iter()
        .flatten()
        .filter(|detail| detail.get("error").is_some())
        .count();
    assert_eq!(failed, 1);

    Ok(())
}

#[test]
fn test_extract_verbose_lists_parse_failures() -> Result<()> {
    let test = CliTest::with_demo_plugin()?;
    test.write_file("demo/broken.py", "def broken(:\n    pass\n")?;

    let output = run(test.extract_command().args(["demo", "-v"]))?;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("parse-failure"));
    assert!(output.stdout.contains("broken.py"));
    assert!(output.stdout.contains("nodes.py"));
    assert!(output.stdout.contains("2 node(s)  inputs 2  widgets 1  outputs 2"));
    assert!(!output.stderr.contains("could not be parsed"));

    Ok(())
}

#[test]
fn test_extract_skips_init_and_test_files() -> Result<()> {
    let test = CliTest::with_demo_plugin()?;
    test.write_file(
        "demo/test_nodes.py",
        "class Fake:\n    RETURN_TYPES = (\"IMAGE\",)\n",
    )?;

    let output = run(test.extract_command().arg("demo"))?;

    assert_eq!(output.code, Some(0));
    let nodes = test.read_json("output/demo/demo_nodes.json")?;
    assert!(nodes.get("Fake").is_none());

    Ok(())
}

#[test]
fn test_extract_output_dir_override() -> Result<()> {
    let test = CliTest::with_demo_plugin()?;

    let output = run(test.extract_command().args(["demo", "--output-dir", "artifacts"]))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(test.root().join("artifacts/demo/demo_nodes.json").is_file());
    assert!(!test.root().join("output").exists());

    Ok(())
}

#[test]
fn test_extract_output_dir_from_config() -> Result<()> {
    let test = CliTest::with_demo_plugin()?;
    test.write_file(".nodelingorc.json", r#"{"outputDir": "from-config"}"#)?;

    let output = run(test.extract_command().arg("demo"))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(test.root().join("from-config/demo/demo_nodes.json").is_file());

    Ok(())
}

#[test]
fn test_extract_multiple_plugins() -> Result<()> {
    let test = CliTest::with_demo_plugin()?;
    test.write_file(
        "other/nodes.py",
        "class Sharpen:\n    RETURN_TYPES = (\"IMAGE\",)\n",
    )?;

    let output = run(test.extract_command().args(["demo", "other"]))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(output.stdout.contains("✓ demo: 2 nodes"));
    assert!(output.stdout.contains("✓ other: 1 node from 1/1 files"));
    let other = test.read_json("output/other/other_nodes.json")?;
    assert_eq!(other["Sharpen"]["outputs"]["output_0"], "IMAGE");

    Ok(())
}

#[test]
fn test_extract_missing_directory() -> Result<()> {
    let test = CliTest::new()?;

    let output = run(test.extract_command().arg("missing"))?;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("✘ missing:"));
    assert!(!test.root().join("output/missing").exists());

    Ok(())
}
