//! Error types for the MCP crate.

use serde::Serialize;
use snowgate_policy::PolicyViolation;
use thiserror::Error;

/// Component name reported by query execution failures.
pub const QUERY_MANAGER: &str = "query_manager";

/// Errors that can occur in the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Tool not found.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// Invalid arguments for tool.
    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// Statement type rejected by the configured permissions.
    #[error(transparent)]
    StatementNotAllowed(#[from] PolicyViolation),

    /// Statement execution failed.
    #[error(transparent)]
    QueryExecution(#[from] QueryExecutionError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// The single error kind surfaced when running a statement fails.
///
/// The underlying cause only appears as text in `message`.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{message}")]
pub struct QueryExecutionError {
    /// Component that failed.
    pub tool: String,
    /// Human-readable message including the cause.
    pub message: String,
    /// Fixed status classification.
    pub status_code: u16,
}

impl QueryExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            tool: QUERY_MANAGER.to_string(),
            message: message.into(),
            status_code: 500,
        }
    }
}
