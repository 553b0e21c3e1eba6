//! `snowgate serve` command implementation.

use anyhow::{Context, Result};
use clap::Args;
use snowgate_adapter_pg::PgWarehouse;
use snowgate_core::Transport;
use snowgate_mcp::McpServer;
use snowgate_policy::StatementPolicy;
use snowgate_sql::{SqlDialect, StatementClassifier};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Arguments for `snowgate serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Configuration file path.
    #[arg(short, long, default_value = super::DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Transport type (stdio or http). Overrides config file.
    #[arg(long)]
    pub transport: Option<Transport>,

    /// HTTP port (only for http transport). Overrides config file.
    #[arg(long)]
    pub port: Option<u16>,

    /// SQL dialect used to classify statements.
    #[arg(long, default_value = "snowflake")]
    pub dialect: SqlDialect,
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let mut config = super::load_config(&args.config)?;

    // CLI overrides config file
    if let Some(transport) = args.transport {
        config.mcp.transport = transport;
    }
    if let Some(port) = args.port {
        config.mcp.port = port;
    }

    let policy = StatementPolicy::from_permissions(&config.sql_statement_permissions)
        .with_classifier(StatementClassifier::with_dialect(args.dialect));

    if config.sql_statement_permissions.is_empty() {
        warn!("No sql_statement_permissions configured; every statement will be rejected");
    }

    let warehouse = Arc::new(PgWarehouse::from_config(&config.warehouse));

    let server = McpServer::new(config.mcp.clone(), warehouse)
        .with_policy(policy)
        .with_query_comments(config.query_comment.effective_template());

    info!(
        transport = %config.mcp.transport,
        port = config.mcp.port,
        allow = ?server.policy().allow_list().collect::<Vec<_>>(),
        disallow = ?server.policy().disallow_list().collect::<Vec<_>>(),
        query_comments = server.query_comments_enabled(),
        "Starting Snowgate MCP server"
    );

    server.run().await.context("MCP server failed")?;

    Ok(())
}
