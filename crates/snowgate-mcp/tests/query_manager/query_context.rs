//! `set_query_context` and `get_query_context` tests.

use super::common::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_set_then_get() {
    let server = server(&RecordingWarehouse::new(), &["select"], &[], None);

    let set = call_tool(
        &server,
        "set_query_context",
        json!({"model": "claude-3", "agent_name": "TestAgent"}),
    )
    .await
    .json();

    assert_eq!(
        set,
        json!({
            "status": "success",
            "message": "Query context updated successfully",
            "context": {"model": "claude-3", "agent_name": "TestAgent"},
        })
    );

    let get = call_tool(&server, "get_query_context", json!({})).await.json();
    assert_eq!(
        get,
        json!({
            "context": {"model": "claude-3", "agent_name": "TestAgent"},
            "query_comments_enabled": false,
        })
    );
}

#[tokio::test]
async fn test_updates_merge_with_existing_context() {
    let server = server(&RecordingWarehouse::new(), &["select"], &[], None);

    call_tool(&server, "set_query_context", json!({"model": "claude-3", "session_id": "s1"})).await;
    let set = call_tool(
        &server,
        "set_query_context",
        json!({"model": "gpt-4", "intent": {"category": "analysis"}}),
    )
    .await
    .json();

    assert_eq!(
        set["context"],
        json!({"model": "gpt-4", "session_id": "s1", "intent": {"category": "analysis"}})
    );
}

#[tokio::test]
async fn test_custom_context_and_nulls() {
    let server = server(&RecordingWarehouse::new(), &["select"], &[], None);

    let set = call_tool(
        &server,
        "set_query_context",
        json!({
            "user_email": null,
            "query_parameters": {"datasets": ["sales"]},
            "custom_context": {"department": "finance", "priority": 2},
        }),
    )
    .await
    .json();

    assert_eq!(
        set["context"],
        json!({
            "query_parameters": {"datasets": ["sales"]},
            "department": "finance",
            "priority": 2,
        })
    );
}

#[tokio::test]
async fn test_wrong_argument_type_is_invalid_params() {
    let server = server(&RecordingWarehouse::new(), &["select"], &[], None);

    let response = call(&server, "set_query_context", json!({"intent": "not an object"})).await;

    assert_eq!(response.error.unwrap().code, -32602);
    assert!(server.context_store().is_empty());
}

#[tokio::test]
async fn test_get_reports_comments_enabled() {
    let server = server(
        &RecordingWarehouse::new(),
        &["select"],
        &[],
        Some(json!({"tool": "{tool_name}"})),
    );

    let get = call_tool(&server, "get_query_context", json!({})).await.json();
    assert_eq!(get, json!({"context": {}, "query_comments_enabled": true}));
}

#[tokio::test]
async fn test_context_is_per_server() {
    let first = server(&RecordingWarehouse::new(), &["select"], &[], None);
    let second = server(&RecordingWarehouse::new(), &["select"], &[], None);

    call_tool(&first, "set_query_context", json!({"model": "m"})).await;

    assert!(second.context_store().is_empty());
    assert_eq!(first.context_store().len(), 1);
}
