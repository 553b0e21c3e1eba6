//! Configuration types for the Snowgate MCP server.
//!
//! Configuration is loaded from a single YAML file (`snowgate.yaml` by default):
//!
//! - **warehouse**: how to reach the backing warehouse
//! - **mcp**: transport settings for the MCP server
//! - **sql_statement_permissions**: statement types the agent may or may not run
//! - **query_comment**: observability comments prepended to outgoing SQL

pub mod mcp;
pub mod permissions;
pub mod query_comment;
pub mod warehouse;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use mcp::{McpConfig, Transport};
pub use permissions::StatementPermissions;
pub use query_comment::{QueryCommentConfig, default_template};
pub use warehouse::WarehouseConfig;

/// Complete Snowgate configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnowgateConfig {
    /// Warehouse connection.
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// MCP server settings.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Statement types allowed or disallowed for `run_snowflake_query`.
    #[serde(default)]
    pub sql_statement_permissions: StatementPermissions,

    /// Query comment settings.
    #[serde(default)]
    pub query_comment: QueryCommentConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SnowgateConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.query_comment.validate()
    }
}
