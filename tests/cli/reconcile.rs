use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::{CliTest, run};

fn original() -> Value {
    json!({
        "Blend": {
            "title": "Blend",
            "inputs": {"image": "image"},
            "widgets": {"strength": "strength"},
            "outputs": {"output_0": "IMAGE"}
        },
        "Invert": {
            "title": "Invert",
            "inputs": {"image": "image"},
            "widgets": {},
            "outputs": {"output_0": "IMAGE"}
        }
    })
}

#[test]
fn test_reconcile_batch_mode() -> Result<()> {
    let test = CliTest::new()?;
    test.write_json("original.json", &original())?;
    test.write_json(
        "translated.json",
        &json!({
            "Blend": {
                "title": "混合",
                "inputs": {"image": "图像"},
                "outputs": {"output_0": "图像"}
            }
        }),
    )?;

    let output = run(test
        .reconcile_command()
        .args(["original.json", "translated.json"]))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(
        output
            .stdout
            .contains("Reconciled 2 node(s) in batch mode, 2 correction(s)")
    );
    assert!(output.stdout.contains("translated_reconciled.json"));

    let result = test.read_json("translated_reconciled.json")?;
    assert_eq!(
        result,
        json!({
            "Blend": {
                "title": "混合",
                "inputs": {"image": "图像"},
                "widgets": {"strength": "strength"},
                "outputs": {"output_0": "图像"}
            },
            "Invert": {
                "title": "Invert",
                "inputs": {"image": "image"},
                "widgets": {},
                "outputs": {"output_0": "IMAGE"}
            }
        })
    );

    Ok(())
}

#[test]
fn test_reconcile_verbose_lists_corrections() -> Result<()> {
    let test = CliTest::new()?;
    test.write_json("original.json", &original())?;
    test.write_json("translated.json", &json!({}))?;

    let output = run(test.reconcile_command().args([
        "original.json",
        "translated.json",
        "-v",
    ]))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(output.stdout.contains("untranslated-node"));
    assert!(output.stdout.contains("--> Blend"));
    assert!(output.stdout.contains("2 problems (0 errors, 2 warnings)"));

    Ok(())
}

#[test]
fn test_reconcile_final_mode_replaces_incomplete_nodes() -> Result<()> {
    let test = CliTest::new()?;
    test.write_json("original.json", &original())?;
    test.write_json(
        "translated.json",
        &json!({
            "Blend": {"title": "混合"},
            "Invert": {
                "title": "反转",
                "inputs": {"image": "图像"},
                "widgets": {},
                "outputs": {"output_0": "图像"}
            }
        }),
    )?;

    let output = run(test.reconcile_command().args([
        "original.json",
        "translated.json",
        "--mode",
        "final",
        "-o",
        "final.json",
    ]))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    let result = test.read_json("final.json")?;
    assert_eq!(result["Blend"], original()["Blend"]);
    assert_eq!(result["Invert"]["title"], "反转");

    Ok(())
}

#[test]
fn test_reconcile_strict_mode_restores_keys() -> Result<()> {
    let test = CliTest::new()?;
    test.write_json("original.json", &original())?;
    test.write_json(
        "translated.json",
        &json!({
            "Blend": {
                "title": "混合",
                "inputs": {"图像": "图像"},
                "widgets": {"strength": "强度"},
                "outputs": {"output_0": "图像"}
            },
            "Invert": {
                "title": "反转",
                "inputs": {"image": "图像"},
                "widgets": {},
                "outputs": {"output_0": "图像"}
            }
        }),
    )?;

    let output = run(test.reconcile_command().args([
        "original.json",
        "translated.json",
        "--mode",
        "strict",
        "-o",
        "out/strict.json",
    ]))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(output.stdout.contains("translation_mapping.json"));

    let result = test.read_json("out/strict.json")?;
    assert_eq!(result["Blend"]["inputs"], json!({"image": "图像"}));
    assert_eq!(result["Blend"]["widgets"], json!({"strength": "强度"}));

    let table = test.read_json("out/translation_mapping.json")?;
    assert_eq!(table["en_to_cn"]["image"], "图像");
    assert_eq!(table["cn_to_en"]["强度"], "strength");

    Ok(())
}

#[test]
fn test_reconcile_invalid_translated_file() -> Result<()> {
    let test = CliTest::new()?;
    test.write_json("original.json", &original())?;
    test.write_file("translated.json", "[1, 2, 3]")?;

    let output = run(test
        .reconcile_command()
        .args(["original.json", "translated.json"]))?;

    assert_eq!(output.code, Some(2));
    assert!(output.stderr.contains("must be an object"));

    Ok(())
}
