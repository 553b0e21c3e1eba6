//! Shared types for the Snowgate MCP server.

// Configuration types shared across all Snowgate crates
pub mod config;

pub use config::{
    ConfigError, McpConfig, QueryCommentConfig, SnowgateConfig, StatementPermissions, Transport,
    WarehouseConfig,
};
