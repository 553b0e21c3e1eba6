//! Postgres-wire warehouse adapter.
//!
//! Every session is a fresh `PgConnection`; nothing is pooled. Session parameters are
//! applied with `set_config` before the statement runs, and statements go through the
//! simple-query protocol so any text the policy admits can be sent unchanged.

use anyhow::Context;
use async_trait::async_trait;
use snowgate_core::WarehouseConfig;
use snowgate_mcp::warehouse::{Row, SessionOptions, Warehouse, WarehouseSession};
use sqlx::{Connection, Executor, PgConnection};
use std::time::Duration;

pub mod convert;

pub use convert::{row_to_json, session_settings};

#[derive(Debug, Clone, Copy)]
pub struct PgWarehouseOptions {
    pub connect_timeout: Duration,
}

impl Default for PgWarehouseOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Warehouse reached over the Postgres wire protocol.
pub struct PgWarehouse {
    database_url: String,
    options: PgWarehouseOptions,
}

impl PgWarehouse {
    pub fn new(database_url: impl Into<String>, options: PgWarehouseOptions) -> Self {
        Self {
            database_url: database_url.into(),
            options,
        }
    }

    pub fn from_config(config: &WarehouseConfig) -> Self {
        Self::new(
            config.connection_string(),
            PgWarehouseOptions {
                connect_timeout: Duration::from_secs(config.connect_timeout_seconds),
            },
        )
    }

    async fn connect(&self) -> anyhow::Result<PgConnection> {
        tokio::time::timeout(
            self.options.connect_timeout,
            PgConnection::connect(&self.database_url),
        )
        .await
        .with_context(|| {
            format!(
                "timed out connecting to warehouse after {}s",
                self.options.connect_timeout.as_secs()
            )
        })?
        .context("failed to connect to warehouse")
    }
}

#[async_trait]
impl Warehouse for PgWarehouse {
    async fn open_session(
        &self,
        options: &SessionOptions,
    ) -> anyhow::Result<Box<dyn WarehouseSession>> {
        let mut conn = self.connect().await?;

        for (name, value) in session_settings(&options.session_parameters) {
            let query = sqlx::query("SELECT set_config($1, $2, false)")
                .bind(name.as_str())
                .bind(value.as_str());
            conn.execute(query)
                .await
                .with_context(|| format!("failed to set session parameter {}", name))?;
        }

        tracing::debug!(
            parameters = options.session_parameters.len(),
            "Warehouse session opened"
        );

        Ok(Box::new(PgSession {
            conn: Some(conn),
            rows: Vec::new(),
            row_mapping: options.row_mapping,
        }))
    }
}

/// One open connection.
pub struct PgSession {
    conn: Option<PgConnection>,
    rows: Vec<Row>,
    row_mapping: bool,
}

#[async_trait]
impl WarehouseSession for PgSession {
    async fn execute(&mut self, sql: &str) -> anyhow::Result<()> {
        let row_mapping = self.row_mapping;
        let conn = self.conn.as_mut().context("warehouse session is closed")?;
        // A bare `&str` has no arguments, so it runs over the simple-query protocol.
        let rows = (&mut *conn).fetch_all(sql).await?;
        self.rows = rows.iter().map(|row| row_to_json(row, row_mapping)).collect();
        Ok(())
    }

    async fn fetch_all(&mut self) -> anyhow::Result<Vec<Row>> {
        Ok(std::mem::take(&mut self.rows))
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().await?;
        }
        Ok(())
    }
}
