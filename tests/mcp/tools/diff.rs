use nodelingo::mcp::{NodelingoMcpServer, types::DiffNodesParams};
use rmcp::handler::server::wrapper::Parameters;
use serde_json::json;

use crate::{McpTestFixture, extract_tool_result_json};

#[tokio::test]
async fn test_diff_nodes() {
    let fixture = McpTestFixture::new().unwrap();
    let old_path = fixture
        .write_json("old.json", &json!({"Cat: Node A": {"title": "A"}}))
        .unwrap();
    let new_path = fixture
        .write_json(
            "new.json",
            &json!({
                "Cat: NodeA": {"title": "A"},
                "Cat: Llama Vision": {"title": "LV"}
            }),
        )
        .unwrap();
    let server = NodelingoMcpServer::new();

    let params = Parameters(DiffNodesParams {
        old_path,
        new_path,
        project_root_path: Some(fixture.root()),
    });

    let result = server.diff_nodes(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["oldCount"], 1);
    assert_eq!(json_result["newCount"], 2);
    assert_eq!(json_result["addedCount"], 1);
    assert_eq!(
        json_result["added"],
        json!({"Cat: LlamaVision": {"title": "LV"}})
    );
}

#[tokio::test]
async fn test_diff_nodes_unreadable_artifact() {
    let fixture = McpTestFixture::new().unwrap();
    let old_path = fixture.write_json("old.json", &json!({})).unwrap();
    let server = NodelingoMcpServer::new();

    let params = Parameters(DiffNodesParams {
        old_path,
        new_path: fixture.path("missing.json"),
        project_root_path: Some(fixture.root()),
    });

    let err = server.diff_nodes(params).await.unwrap_err();
    assert!(err.message.contains("Failed to read artifact"));
}
