use nodelingo::mcp::{
    NodelingoMcpServer,
    types::{ReconcileModeParam, ReconcileTranslationParams},
};
use rmcp::handler::server::wrapper::Parameters;
use serde_json::{Value, json};

use crate::{McpTestFixture, extract_tool_result_json};

fn original() -> Value {
    json!({
        "Blend": {
            "title": "Blend",
            "inputs": {"image": "image"},
            "widgets": {"strength": "strength"},
            "outputs": {"output_0": "IMAGE"}
        }
    })
}

#[tokio::test]
async fn test_reconcile_translation_batch() {
    let fixture = McpTestFixture::new().unwrap();
    let original_path = fixture.write_json("original.json", &original()).unwrap();
    let translated_path = fixture
        .write_json(
            "translated.json",
            &json!({
                "Blend": {
                    "title": "混合",
                    "inputs": {"image": "图像", "extra": "多余"},
                    "outputs": {"output_0": "图像"}
                }
            }),
        )
        .unwrap();
    let server = NodelingoMcpServer::new();

    let params = Parameters(ReconcileTranslationParams {
        original_path,
        translated_path,
        mode: ReconcileModeParam::Batch,
        apply_glossary: None,
        project_root_path: Some(fixture.root()),
    });

    let result = server.reconcile_translation(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["mode"], "batch");
    assert_eq!(json_result["nodeCount"], 1);
    assert_eq!(
        json_result["nodes"]["Blend"],
        json!({
            "title": "混合",
            "inputs": {"image": "图像"},
            "widgets": {"strength": "strength"},
            "outputs": {"output_0": "图像"}
        })
    );
    let corrections = json_result["corrections"].as_array().unwrap();
    assert_eq!(corrections.len(), 1);
    assert_eq!(corrections[0]["rule"], "missing-key");
    assert_eq!(corrections[0]["severity"], "warning");
    assert_eq!(corrections[0]["node"], "Blend");
    assert!(json_result.get("translationTable").is_none());

    // Read-only: no output file is written.
    assert!(!fixture.root_path().join("translated_reconciled.json").exists());
}

#[tokio::test]
async fn test_reconcile_translation_strict() {
    let fixture = McpTestFixture::new().unwrap();
    let original_path = fixture.write_json("original.json", &original()).unwrap();
    let translated_path = fixture
        .write_json(
            "translated.json",
            &json!({
                "Blend": {
                    "title": "混合",
                    "inputs": {"图像": "image"},
                    "widgets": {"strength": "强度"},
                    "outputs": {"output_0": "图像"}
                }
            }),
        )
        .unwrap();
    let server = NodelingoMcpServer::new();

    let params = Parameters(ReconcileTranslationParams {
        original_path,
        translated_path,
        mode: ReconcileModeParam::Strict,
        apply_glossary: None,
        project_root_path: Some(fixture.root()),
    });

    let result = server.reconcile_translation(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["mode"], "strict");
    assert_eq!(json_result["correctionsMade"], true);
    assert_eq!(
        json_result["nodes"]["Blend"]["inputs"],
        json!({"image": "image"})
    );
    assert_eq!(json_result["translationTable"]["en_to_cn"]["image"], "图像");
    assert_eq!(json_result["translationTable"]["cn_to_en"]["强度"], "strength");
    assert_eq!(json_result["corrections"][0]["rule"], "rekeyed-entry");
}

#[tokio::test]
async fn test_reconcile_translation_with_glossary() {
    let fixture = McpTestFixture::new().unwrap();
    let original_path = fixture.write_json("original.json", &original()).unwrap();
    let translated_path = fixture
        .write_json(
            "translated.json",
            &json!({
                "Blend": {
                    "title": "混合",
                    "inputs": {"image": "图片"},
                    "widgets": {"strength": "力度"},
                    "outputs": {"output_0": "图像"}
                }
            }),
        )
        .unwrap();
    let server = NodelingoMcpServer::new();

    let params = Parameters(ReconcileTranslationParams {
        original_path,
        translated_path,
        mode: ReconcileModeParam::Final,
        apply_glossary: Some(true),
        project_root_path: Some(fixture.root()),
    });

    let result = server.reconcile_translation(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["nodes"]["Blend"]["inputs"]["image"], "IMAGE");
    let rules: Vec<&str> = json_result["corrections"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["rule"].as_str())
        .collect();
    assert!(rules.contains(&"glossary-override"));
}
