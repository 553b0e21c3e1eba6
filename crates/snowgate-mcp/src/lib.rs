//! # snowgate-mcp
//!
//! MCP (Model Context Protocol) server exposing governed SQL execution to AI agents.
//!
//! The server offers three tools:
//!
//! - **run_snowflake_query**: classify a statement, check it against the configured
//!   statement permissions, and run it with an observability comment prepended
//! - **set_query_context**: merge caller metadata (model, agent, user, intent) into the
//!   shared query context
//! - **get_query_context**: read the context back
//!
//! ## Architecture
//!
//! ```text
//! AI Agent
//!       │
//!       │ MCP protocol (stdio or HTTP)
//!       ▼
//! ┌──────────────────────┐
//! │  Snowgate MCP Server │
//! │  1. Classify         │  ← snowgate-sql
//! │  2. Check policy     │  ← snowgate-policy
//! │  3. Render comment   │  ← query context
//! │  4. Execute          │  ← Warehouse adapter
//! │  5. Return rows      │
//! └──────────┬───────────┘
//!            │
//!            ▼
//!        Warehouse
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use snowgate_mcp::McpServer;
//! use snowgate_policy::StatementPolicy;
//!
//! let server = McpServer::new(config.mcp.clone(), warehouse)
//!     .with_policy(StatementPolicy::from_permissions(&config.sql_statement_permissions))
//!     .with_query_comments(config.query_comment.effective_template());
//! server.run().await?;
//! ```

pub mod comment;
pub mod context;
pub mod error;
pub mod executor;
pub mod http_transport;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod warehouse;

pub use comment::CommentBuilder;
pub use context::{QueryContext, QueryContextStore};
pub use error::{McpError, QueryExecutionError};
pub use executor::QueryExecutor;
pub use server::McpServer;
pub use tools::ToolRegistry;
pub use warehouse::{Row, SessionOptions, Warehouse, WarehouseSession};
