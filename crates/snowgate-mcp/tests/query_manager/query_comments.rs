//! Query comment tests.
//!
//! Statements reaching the warehouse carry `/* <json> */` followed by a newline and the
//! original text when comments are enabled.

use super::common::*;
use serde_json::json;
use snowgate_core::config::default_template;
use snowgate_sql::{SqlDialect, StatementClassifier};

#[tokio::test]
async fn test_disabled_sends_statement_verbatim() {
    let warehouse = RecordingWarehouse::new();
    let server = server(&warehouse, &["select"], &[], None);

    run_query(&server, "SELECT * FROM t").await.json();

    assert_eq!(warehouse.statements(), vec!["SELECT * FROM t"]);
}

#[tokio::test]
async fn test_default_template_with_context_model() {
    let warehouse = RecordingWarehouse::new();
    let server = server(&warehouse, &["select"], &[], Some(default_template()));

    call_tool(&server, "set_query_context", json!({"model": "claude-sonnet-4"})).await;
    run_query(&server, "SELECT * FROM t").await.json();

    let (comment, statement) = split_comment(&warehouse.statements()[0]);
    assert_eq!(statement, "SELECT * FROM t");
    assert_eq!(comment["tool"], "run_snowflake_query");
    assert_eq!(comment["statement_type"], "Select");
    assert_eq!(comment["model"], "claude-sonnet-4");
    assert_eq!(comment["source"], "snowgate");
    assert_eq!(comment["request_id"].as_str().unwrap().len(), 36);
}

#[tokio::test]
async fn test_model_defaults_to_unknown() {
    let warehouse = RecordingWarehouse::new();
    let server = server(&warehouse, &["select"], &[], Some(json!({"model": "{model}"})));

    run_query(&server, "SELECT 1").await.json();

    let (comment, _) = split_comment(&warehouse.statements()[0]);
    assert_eq!(comment, json!({"model": "unknown"}));
}

#[tokio::test]
async fn test_custom_context_keys_reach_comment() {
    let warehouse = RecordingWarehouse::new();
    let server = server(
        &warehouse,
        &["insert"],
        &[],
        Some(json!({
            "metadata": {"tool": "{tool_name}", "type": "{statement_type}"},
            "team": "{department}",
            "missing": "{not_set}",
        })),
    );

    call_tool(
        &server,
        "set_query_context",
        json!({"custom_context": {"department": "finance"}}),
    )
    .await;
    run_query(&server, "INSERT INTO t VALUES (1)").await.json();

    let (comment, _) = split_comment(&warehouse.statements()[0]);
    assert_eq!(
        comment,
        json!({
            "metadata": {"tool": "run_snowflake_query", "type": "Insert"},
            "team": "finance",
            "missing": "{not_set}",
        })
    );
}

#[tokio::test]
async fn test_context_cannot_close_comment() {
    let warehouse = RecordingWarehouse::new();
    let server = server(&warehouse, &["select"], &[], Some(json!({"agent": "{agent_name}"})));

    call_tool(
        &server,
        "set_query_context",
        json!({"agent_name": "x */ DROP TABLE t; /*"}),
    )
    .await;
    run_query(&server, "SELECT 1").await.json();

    let sent = &warehouse.statements()[0];
    assert_eq!(sent.matches("*/").count(), 1);
    assert!(sent.ends_with(" */\nSELECT 1"));
}

#[tokio::test]
async fn test_context_cannot_open_nested_comment() {
    let warehouse = RecordingWarehouse::new();
    let server = server(&warehouse, &["select"], &[], Some(json!({"agent": "{agent_name}"})));

    call_tool(&server, "set_query_context", json!({"agent_name": "team /* analytics"})).await;
    run_query(&server, "SELECT 1").await.json();
    run_query(&server, "SELECT 2").await.json();

    // Postgres nests block comments, so a stray opener would swallow the statement.
    let postgres = StatementClassifier::with_dialect(SqlDialect::Postgres);
    for (sent, statement) in warehouse.statements().iter().zip(["SELECT 1", "SELECT 2"]) {
        assert_eq!(sent.matches("/*").count(), 1);
        assert_eq!(sent.matches("*/").count(), 1);
        assert!(sent.ends_with(&format!(" */\n{statement}")));
        assert_eq!(postgres.classify(sent), "Select");
    }
    let (comment, _) = split_comment(&warehouse.statements()[0]);
    assert_eq!(comment["agent"], "team / * analytics");
}

#[tokio::test]
async fn test_rejected_statement_builds_no_comment() {
    let warehouse = RecordingWarehouse::new();
    let server = server(&warehouse, &["select"], &["drop"], Some(default_template()));

    assert!(run_query(&server, "DROP TABLE t").await.is_error);
    assert!(warehouse.statements().is_empty());
}
