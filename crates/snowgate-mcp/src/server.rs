//! MCP server implementation.
//!
//! This module provides the main MCP server: JSON-RPC dispatch, the three query manager
//! tools, and the stdio and HTTP transports.

use crate::comment::CommentBuilder;
use crate::context::QueryContextStore;
use crate::error::McpError;
use crate::executor::QueryExecutor;
use crate::http_transport::{HttpServer, RequestEnvelope};
use crate::protocol::*;
use crate::tools::{
    GET_QUERY_CONTEXT_TOOL, RUN_QUERY_TOOL, RunQueryArgs, SET_QUERY_CONTEXT_TOOL,
    SetQueryContextArgs, ToolRegistry,
};
use crate::warehouse::Warehouse;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use snowgate_core::config::mcp::{McpConfig, Transport};
use snowgate_policy::StatementPolicy;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// The MCP server.
///
/// Cloning is cheap; clones share the policy, executor and query context.
#[derive(Clone)]
pub struct McpServer {
    config: McpConfig,
    tools: ToolRegistry,
    policy: Arc<StatementPolicy>,
    context: Arc<QueryContextStore>,
    warehouse: Arc<dyn Warehouse>,
    comment_template: Option<Value>,
    default_model: Option<String>,
    executor: Arc<QueryExecutor>,
}

impl McpServer {
    /// Create a server backed by `warehouse`.
    ///
    /// Until a policy is set every statement is rejected, and query comments are off.
    pub fn new(config: McpConfig, warehouse: Arc<dyn Warehouse>) -> Self {
        let context = Arc::new(QueryContextStore::new());
        let executor = QueryExecutor::new(
            Arc::clone(&warehouse),
            CommentBuilder::disabled(Arc::clone(&context)),
        );
        Self {
            config,
            tools: ToolRegistry::query_manager(),
            policy: Arc::new(StatementPolicy::default()),
            context,
            warehouse,
            comment_template: None,
            default_model: None,
            executor: Arc::new(executor),
        }
    }

    /// Set the statement policy.
    pub fn with_policy(mut self, policy: StatementPolicy) -> Self {
        self.policy = Arc::new(policy);
        self.rebuild_executor();
        self
    }

    /// Enable query comments with `template`, or disable them with `None`.
    pub fn with_query_comments(mut self, template: Option<Value>) -> Self {
        self.comment_template = template;
        self.rebuild_executor();
        self
    }

    /// Override the fallback model used by query comments.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self.rebuild_executor();
        self
    }

    fn rebuild_executor(&mut self) {
        let mut comments =
            CommentBuilder::new(self.comment_template.clone(), Arc::clone(&self.context));
        if let Some(model) = &self.default_model {
            comments = comments.with_default_model(Some(model.clone()));
        }
        let executor = QueryExecutor::new(Arc::clone(&self.warehouse), comments)
            .with_classifier(*self.policy.classifier());
        self.executor = Arc::new(executor);
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn policy(&self) -> &StatementPolicy {
        &self.policy
    }

    pub fn context_store(&self) -> &Arc<QueryContextStore> {
        &self.context
    }

    pub fn query_comments_enabled(&self) -> bool {
        self.executor.comments().is_enabled()
    }

    /// Start the MCP server.
    pub async fn run(&self) -> Result<(), McpError> {
        match self.config.transport {
            Transport::Stdio => self.run_stdio().await,
            Transport::Http => self.run_http().await,
        }
    }

    /// Run the server with stdio transport: one JSON-RPC message per line.
    pub async fn run_stdio(&self) -> Result<(), McpError> {
        tracing::info!("Starting MCP server with stdio transport");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(request) => self.handle_message(request).await,
                Err(e) => {
                    tracing::warn!(error = %e, "Malformed JSON-RPC message");
                    Some(JsonRpcResponse::error(
                        None,
                        PARSE_ERROR,
                        format!("Parse error: {}", e),
                    ))
                }
            };

            if let Some(response) = response {
                let mut response_json = serde_json::to_string(&response)?;
                response_json.push('\n');
                stdout.write_all(response_json.as_bytes()).await?;
                stdout.flush().await?;
            }
        }

        tracing::info!("stdin closed, stopping MCP server");
        Ok(())
    }

    /// Run the server with HTTP transport. Each request is handled on its own task.
    pub async fn run_http(&self) -> Result<(), McpError> {
        tracing::info!(
            address = %self.config.bind_address(),
            "Starting MCP server with HTTP transport"
        );

        let (request_tx, mut request_rx) = mpsc::channel::<RequestEnvelope>(100);

        let server = self.clone();
        tokio::spawn(async move {
            while let Some((request, response_tx)) = request_rx.recv().await {
                let server = server.clone();
                tokio::spawn(async move {
                    let response = server.handle_message(request).await;
                    let _ = response_tx.send(response);
                });
            }
        });

        HttpServer::new(self.config.bind_address(), request_tx)
            .run()
            .await
    }

    /// Handle any incoming message. Notifications produce no response.
    pub async fn handle_message(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        }
        Some(self.handle_request(request).await)
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "shutdown" => self.handle_shutdown(id),
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let server_info = ServerInfo {
            name: "snowgate".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": server_info,
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let response = ListToolsResponse {
            tools: self.tools.list().into_iter().cloned().collect(),
        };
        match serde_json::to_value(response) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        }
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params = match params.map(serde_json::from_value::<CallToolParams>) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e));
            }
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        if !self.tools.contains(&params.name) {
            return JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("Tool not found: {}", params.name),
            );
        }

        tracing::debug!(tool = %params.name, "Calling tool");

        match self.call_tool(&params.name, params.arguments).await {
            Ok(value) => match CallToolResponse::json(&value).and_then(serde_json::to_value) {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
            },
            Err(McpError::InvalidArguments { tool, reason }) => JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("Invalid arguments for {}: {}", tool, reason),
            ),
            Err(e) => {
                let result = CallToolResponse::error(e.to_string());
                match serde_json::to_value(result) {
                    Ok(result) => JsonRpcResponse::success(id, result),
                    Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
                }
            }
        }
    }

    /// Run a tool and return its payload.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, McpError> {
        match name {
            RUN_QUERY_TOOL => {
                let args: RunQueryArgs = parse_arguments(name, arguments)?;
                self.run_snowflake_query(&args.statement).await
            }
            SET_QUERY_CONTEXT_TOOL => {
                let args: SetQueryContextArgs = parse_arguments(name, arguments)?;
                Ok(self.set_query_context(args))
            }
            GET_QUERY_CONTEXT_TOOL => Ok(self.get_query_context()),
            other => Err(McpError::ToolNotFound {
                name: other.to_string(),
            }),
        }
    }

    async fn run_snowflake_query(&self, statement: &str) -> Result<Value, McpError> {
        let statement_type = self.policy.enforce(statement)?;
        tracing::info!(tool = RUN_QUERY_TOOL, statement_type = %statement_type, "Running statement");

        let rows = self.executor.run_query(statement, RUN_QUERY_TOOL).await?;
        Ok(Value::Array(rows.into_iter().map(Value::Object).collect()))
    }

    fn set_query_context(&self, args: SetQueryContextArgs) -> Value {
        let context = self.context.set(args.into_context());
        tracing::info!(keys = context.len(), "Query context updated");
        json!({
            "status": "success",
            "message": "Query context updated successfully",
            "context": context,
        })
    }

    fn get_query_context(&self) -> Value {
        json!({
            "context": self.context.get(),
            "query_comments_enabled": self.query_comments_enabled(),
        })
    }

    fn handle_shutdown(&self, id: Option<Value>) -> JsonRpcResponse {
        tracing::info!("MCP server shutdown requested");
        JsonRpcResponse::success(id, json!(null))
    }
}

/// Decode tool arguments. Absent arguments decode as an empty object.
fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, McpError> {
    let arguments = match arguments {
        Value::Null => json!({}),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| McpError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}
