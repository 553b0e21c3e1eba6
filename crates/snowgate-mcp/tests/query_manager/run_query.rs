//! `run_snowflake_query` tests.
//!
//! Tests permission precedence end to end and the shape of results and failures.

use super::common::*;
use serde_json::json;

// =============================================================================
// PERMISSIONS
// =============================================================================

#[tokio::test]
async fn test_allowed_select_returns_rows() {
    let warehouse = RecordingWarehouse::new().with_rows(json!([{"A": 1}]));
    let server = server(&warehouse, &["select"], &[], None);

    let outcome = run_query(&server, "SELECT 1 AS a").await;

    assert_eq!(outcome.json(), json!([{"A": 1}]));
    assert_eq!(warehouse.statements(), vec!["SELECT 1 AS a"]);
}

#[tokio::test]
async fn test_disallowed_statement_never_reaches_warehouse() {
    let warehouse = RecordingWarehouse::new();
    let server = server(&warehouse, &["select"], &["drop"], None);

    let outcome = run_query(&server, "DROP TABLE t").await;

    assert!(outcome.is_error);
    assert!(outcome.text.contains("Drop"), "message: {}", outcome.text);
    assert!(warehouse.statements().is_empty());
    assert!(warehouse.sessions().is_empty());
}

#[tokio::test]
async fn test_all_overrides_disallow() {
    let warehouse = RecordingWarehouse::new();
    let server = server(&warehouse, &["all"], &["select", "drop"], None);

    assert!(!run_query(&server, "DROP TABLE my_table").await.is_error);
    assert!(!run_query(&server, "not sql @#$").await.is_error);
    assert_eq!(warehouse.statements().len(), 2);
}

#[tokio::test]
async fn test_empty_permissions_reject_everything() {
    let warehouse = RecordingWarehouse::new();
    let server = server(&warehouse, &[], &[], None);

    let outcome = run_query(&server, "SELECT * FROM my_table").await;

    assert!(outcome.is_error);
    assert!(outcome.text.contains("Select"));
    assert!(warehouse.statements().is_empty());
}

#[tokio::test]
async fn test_unknown_allowed_runs_unparsable_text() {
    let warehouse = RecordingWarehouse::new();
    let server = server(&warehouse, &["unknown"], &[], None);

    let outcome = run_query(&server, "SOME INVALID SQL @#$%").await;

    assert!(!outcome.is_error);
    assert_eq!(warehouse.statements(), vec!["SOME INVALID SQL @#$%"]);
}

#[tokio::test]
async fn test_multiple_statements_are_unknown() {
    let warehouse = RecordingWarehouse::new();
    let server = server(&warehouse, &["select"], &["unknown"], None);

    let outcome = run_query(&server, "SELECT 1; DROP TABLE t").await;

    assert!(outcome.is_error);
    assert!(outcome.text.contains("Unknown"));
    assert!(warehouse.statements().is_empty());
}

// =============================================================================
// EXECUTION
// =============================================================================

#[tokio::test]
async fn test_execution_failure_is_reported_in_result() {
    let warehouse = RecordingWarehouse::new().failing("Connection lost");
    let server = server(&warehouse, &["select"], &[], None);

    let outcome = run_query(&server, "SELECT 1").await;

    assert!(outcome.is_error);
    assert!(outcome.text.starts_with("Error executing query: "));
    assert!(outcome.text.contains("Connection lost"));
    assert_eq!(warehouse.closed(), 1);
}

#[tokio::test]
async fn test_session_is_tagged_and_closed() {
    let warehouse = RecordingWarehouse::new();
    let server = server(&warehouse, &["select"], &[], None);

    run_query(&server, "SELECT 1").await.json();

    let sessions = warehouse.sessions();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].row_mapping);
    let tag: serde_json::Value = serde_json::from_str(sessions[0].query_tag().unwrap()).unwrap();
    assert_eq!(tag["origin"], "snowgate");
    assert_eq!(warehouse.closed(), 1);
}

#[tokio::test]
async fn test_missing_statement_is_invalid_params() {
    let warehouse = RecordingWarehouse::new();
    let server = server(&warehouse, &["all"], &[], None);

    let response = call(&server, "run_snowflake_query", json!({})).await;

    assert_eq!(response.error.unwrap().code, -32602);
    assert!(warehouse.statements().is_empty());
}

#[tokio::test]
async fn test_concurrent_queries_use_separate_sessions() {
    let warehouse = RecordingWarehouse::new().with_rows(json!([{"N": 1}]));
    let server = server(&warehouse, &["select"], &[], None);

    let (a, b) = tokio::join!(
        run_query(&server, "SELECT 1"),
        run_query(&server, "SELECT 2")
    );

    assert_eq!(a.json(), json!([{"N": 1}]));
    assert_eq!(b.json(), json!([{"N": 1}]));
    assert_eq!(warehouse.sessions().len(), 2);
    assert_eq!(warehouse.closed(), 2);
}
