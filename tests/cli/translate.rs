use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::{CliTest, run};

fn translated_blur() -> Value {
    json!({
        "Demo: Image Blur": {
            "title": "图像模糊",
            "inputs": {"image": "图像"},
            "widgets": {"radius": "半径"},
            "outputs": {"output_0": "图像"}
        }
    })
}

fn translated_invert() -> Value {
    json!({
        "Demo: Mask Invert": {
            "title": "遮罩反转",
            "inputs": {"mask": "遮罩"},
            "widgets": {},
            "outputs": {"mask": "遮罩"}
        }
    })
}

fn merged(a: Value, b: Value) -> Value {
    let mut merged = a.as_object().cloned().unwrap_or_default();
    merged.extend(b.as_object().cloned().unwrap_or_default());
    Value::Object(merged)
}

#[test]
fn test_translate_single_batch() -> Result<()> {
    let test = CliTest::with_demo_plugin()?;
    test.write_json(
        "replies/batch_1.json",
        &merged(translated_blur(), translated_invert()),
    )?;

    let output = run(test.translate_command().args(["demo", "--replay", "replies"]))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(output.stdout.contains("✓ demo: translated 2 node(s) in 1 batch(es)"));
    assert!(output.stdout.contains("- corrections: 0"));
    assert!(output.stderr.contains("Translating demo"));
    assert!(output.stderr.contains("[1/1]"));

    let translated = test.read_json("output/demo/translations/demo.json")?;
    assert_eq!(translated, merged(translated_blur(), translated_invert()));

    // Extraction artifact is written too; temp files are gone.
    assert!(test.root().join("output/demo/demo_nodes.json").is_file());
    assert!(!test.root().join("output/demo/temp/nodes_to_translate.json").exists());
    assert!(
        !test
            .root()
            .join("output/demo/translations/batch_1_translated.json")
            .exists()
    );
    assert!(test.root().join("output/demo/logs/final_corrections.log").is_file());

    Ok(())
}

#[test]
fn test_translate_repairs_incomplete_replies() -> Result<()> {
    let test = CliTest::with_demo_plugin()?;
    // Batch 1 wraps the reply in prose, batch 2 drops most of the node.
    test.write_file(
        "replies/batch_1.txt",
        &format!(
            "Here is the translation:\n```json\n{}\n```",
            serde_json::to_string_pretty(&translated_blur())?
        ),
    )?;
    test.write_json(
        "replies/batch_2.json",
        &json!({
            "content": "{\"Demo: Mask Invert\": {\"title\": \"遮罩反转\"}}",
            "usage": {"prompt_tokens": 100, "completion_tokens": 40, "total_tokens": 140}
        }),
    )?;

    let output = run(test.translate_command().args([
        "demo",
        "--replay",
        "replies",
        "--batch-size",
        "1",
        "--keep-temp",
    ]))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(output.stdout.contains("in 2 batch(es)"));
    assert!(output.stdout.contains("- tokens: 140 (100 prompt, 40 completion)"));

    let translated = test.read_json("output/demo/translations/demo.json")?;
    assert_eq!(translated["Demo: Image Blur"]["title"], "图像模糊");
    assert_eq!(translated["Demo: Mask Invert"]["title"], "遮罩反转");
    assert_eq!(translated["Demo: Mask Invert"]["inputs"], json!({"mask": "mask"}));

    let log = test.read_file("output/demo/logs/batch_2_corrections.log")?;
    assert!(log.contains("missing-key"));
    assert!(log.contains("Demo: Mask Invert.inputs.mask"));

    // --keep-temp leaves the pending file and saved batches in place.
    assert!(test.root().join("output/demo/temp/nodes_to_translate.json").is_file());
    assert!(
        test.root()
            .join("output/demo/translations/batch_2_translated.json")
            .is_file()
    );

    Ok(())
}

#[test]
fn test_translate_failure_then_resume() -> Result<()> {
    let test = CliTest::with_demo_plugin()?;
    test.write_json("replies/batch_1.json", &translated_blur())?;

    let output = run(test.translate_command().args([
        "demo",
        "--replay",
        "replies",
        "--batch-size",
        "1",
    ]))?;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("✘ demo:"));
    assert!(output.stdout.contains("No recorded reply for batch 2"));
    assert!(
        test.root()
            .join("output/demo/translations/batch_1_translated.json")
            .is_file()
    );
    assert!(!test.root().join("output/demo/translations/demo.json").exists());

    // Batch 1 must come from the saved file, not from the replay directory.
    std::fs::remove_file(test.root().join("replies/batch_1.json"))?;
    test.write_json("replies/batch_2.json", &translated_invert())?;

    let output = run(test.translate_command().args([
        "demo",
        "--replay",
        "replies",
        "--batch-size",
        "1",
        "--resume",
    ]))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(output.stderr.contains("resumed from saved batch"));
    assert!(output.stdout.contains("- resumed: 1 batch(es)"));

    let translated = test.read_json("output/demo/translations/demo.json")?;
    assert_eq!(translated, merged(translated_blur(), translated_invert()));

    Ok(())
}

#[test]
fn test_translate_unparseable_reply_fails() -> Result<()> {
    let test = CliTest::with_demo_plugin()?;
    test.write_file("replies/batch_1.txt", "Sorry, I can't help with that.")?;

    let output = run(test.translate_command().args(["demo", "--replay", "replies"]))?;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("✘ demo:"));
    assert!(!test.root().join("output/demo/translations/demo.json").exists());

    Ok(())
}

#[test]
fn test_translate_glossary_flag() -> Result<()> {
    let test = CliTest::with_demo_plugin()?;
    let mut reply = merged(translated_blur(), translated_invert());
    reply["Demo: Image Blur"]["widgets"]["radius"] = json!("范围");
    test.write_json("replies/batch_1.json", &reply)?;

    let output = run(test.translate_command().args([
        "demo",
        "--replay",
        "replies",
        "--glossary",
    ]))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    let translated = test.read_json("output/demo/translations/demo.json")?;
    assert_eq!(translated["Demo: Image Blur"]["widgets"]["radius"], "半径");
    // `image` is a preserved type label.
    assert_eq!(translated["Demo: Image Blur"]["inputs"]["image"], "IMAGE");

    let log = test.read_file("output/demo/logs/final_corrections.log")?;
    assert!(log.contains("glossary-override"));

    Ok(())
}

#[test]
fn test_translate_plugin_without_nodes() -> Result<()> {
    let test = CliTest::with_file("empty/helpers.py", "def helper():\n    return 1\n")?;

    let output = run(test.translate_command().args(["empty", "--replay", "replies"]))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(output.stdout.contains("empty: no nodes found"));

    Ok(())
}

#[test]
fn test_translate_requires_translator() -> Result<()> {
    let test = CliTest::with_demo_plugin()?;

    let output = run(test.translate_command().arg("demo"))?;

    assert_eq!(output.code, Some(2));
    assert!(output.stderr.contains("No translator configured"));

    Ok(())
}

#[test]
fn test_translate_rejects_zero_batch_size() -> Result<()> {
    let test = CliTest::with_demo_plugin()?;

    let output = run(test.translate_command().args([
        "demo",
        "--replay",
        "replies",
        "--batch-size",
        "0",
    ]))?;

    assert_eq!(output.code, Some(2));
    assert!(output.stderr.contains("--batch-size must be greater than 0"));

    Ok(())
}
