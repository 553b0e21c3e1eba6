//! Shared test infrastructure for the query manager tests.
//!
//! This module provides:
//! - An in-memory warehouse that records every session and statement
//! - Server fixtures with a given policy and comment template
//! - Helpers for calling tools over JSON-RPC and decoding their results

use async_trait::async_trait;
use serde_json::{Value, json};
use snowgate_core::McpConfig;
use snowgate_mcp::McpServer;
use snowgate_mcp::protocol::{CallToolResponse, JsonRpcRequest, JsonRpcResponse};
use snowgate_mcp::warehouse::{Row, SessionOptions, Warehouse, WarehouseSession};
use snowgate_policy::StatementPolicy;
use std::sync::{Arc, Mutex};

// =============================================================================
// RECORDING WAREHOUSE
// =============================================================================

/// Everything the warehouse saw.
#[derive(Debug, Default)]
pub struct Recording {
    pub statements: Vec<String>,
    pub sessions: Vec<SessionOptions>,
    pub closed: usize,
}

/// Warehouse returning canned rows, optionally failing on execute.
#[derive(Clone, Default)]
pub struct RecordingWarehouse {
    pub recording: Arc<Mutex<Recording>>,
    rows: Vec<Row>,
    failure: Option<String>,
}

impl RecordingWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, rows: Value) -> Self {
        self.rows = rows
            .as_array()
            .expect("rows must be an array")
            .iter()
            .map(|row| row.as_object().expect("row must be an object").clone())
            .collect();
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn statements(&self) -> Vec<String> {
        self.recording.lock().unwrap().statements.clone()
    }

    pub fn sessions(&self) -> Vec<SessionOptions> {
        self.recording.lock().unwrap().sessions.clone()
    }

    pub fn closed(&self) -> usize {
        self.recording.lock().unwrap().closed
    }
}

struct RecordingSession {
    recording: Arc<Mutex<Recording>>,
    rows: Vec<Row>,
    failure: Option<String>,
}

#[async_trait]
impl Warehouse for RecordingWarehouse {
    async fn open_session(
        &self,
        options: &SessionOptions,
    ) -> anyhow::Result<Box<dyn WarehouseSession>> {
        self.recording.lock().unwrap().sessions.push(options.clone());
        Ok(Box::new(RecordingSession {
            recording: Arc::clone(&self.recording),
            rows: self.rows.clone(),
            failure: self.failure.clone(),
        }))
    }
}

#[async_trait]
impl WarehouseSession for RecordingSession {
    async fn execute(&mut self, sql: &str) -> anyhow::Result<()> {
        self.recording.lock().unwrap().statements.push(sql.to_string());
        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(()),
        }
    }

    async fn fetch_all(&mut self) -> anyhow::Result<Vec<Row>> {
        Ok(std::mem::take(&mut self.rows))
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.recording.lock().unwrap().closed += 1;
        Ok(())
    }
}

// =============================================================================
// SERVER FIXTURES
// =============================================================================

/// Server over `warehouse` with the given allow/disallow lists and comment template.
pub fn server(
    warehouse: &RecordingWarehouse,
    allow: &[&str],
    disallow: &[&str],
    template: Option<Value>,
) -> McpServer {
    McpServer::new(McpConfig::default(), Arc::new(warehouse.clone()))
        .with_policy(StatementPolicy::new(allow, disallow))
        .with_query_comments(template)
        .with_default_model("unknown")
}

// =============================================================================
// JSON-RPC HELPERS
// =============================================================================

/// Result of a `tools/call` request.
pub struct ToolOutcome {
    pub is_error: bool,
    pub text: String,
}

impl ToolOutcome {
    /// The payload of a successful call.
    pub fn json(&self) -> Value {
        assert!(!self.is_error, "tool call failed: {}", self.text);
        serde_json::from_str(&self.text).expect("tool payload is JSON")
    }
}

pub async fn call(server: &McpServer, tool: &str, arguments: Value) -> JsonRpcResponse {
    let request = JsonRpcRequest::new(
        1,
        "tools/call",
        Some(json!({"name": tool, "arguments": arguments})),
    );
    server.handle_request(request).await
}

pub async fn call_tool(server: &McpServer, tool: &str, arguments: Value) -> ToolOutcome {
    let response = call(server, tool, arguments).await;
    assert!(response.error.is_none(), "protocol error: {:?}", response.error);

    let result: CallToolResponse =
        serde_json::from_value(response.result.expect("result present")).unwrap();
    ToolOutcome {
        is_error: result.is_error,
        text: result.text().unwrap_or_default().to_string(),
    }
}

pub async fn run_query(server: &McpServer, statement: &str) -> ToolOutcome {
    call_tool(server, "run_snowflake_query", json!({"statement": statement})).await
}

/// Split `/* {json} */\n<statement>` into the parsed comment and the statement.
pub fn split_comment(sent: &str) -> (Value, String) {
    let rest = sent.strip_prefix("/* ").expect("comment prefix");
    let (comment, statement) = rest.split_once(" */\n").expect("comment terminator");
    (serde_json::from_str(comment).unwrap(), statement.to_string())
}
