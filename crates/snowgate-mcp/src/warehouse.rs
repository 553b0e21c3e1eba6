//! Warehouse collaborator traits.
//!
//! The executor talks to the warehouse through these traits only, so the server can run
//! against any backend (the Postgres adapter, or an in-memory fake in tests).

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// One result row: column name to value.
pub type Row = Map<String, Value>;

/// Session parameter tagging every statement with its origin.
pub const QUERY_TAG: &str = "QUERY_TAG";

/// Options for opening a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Return rows as name/value maps.
    pub row_mapping: bool,
    /// Session-level parameters applied before any statement runs.
    pub session_parameters: BTreeMap<String, String>,
}

impl SessionOptions {
    /// Row mapping on, with the default `QUERY_TAG`.
    pub fn tagged() -> Self {
        Self {
            row_mapping: true,
            session_parameters: BTreeMap::from([(QUERY_TAG.to_string(), default_query_tag())]),
        }
    }

    pub fn query_tag(&self) -> Option<&str> {
        self.session_parameters.get(QUERY_TAG).map(String::as_str)
    }
}

/// Value of the default `QUERY_TAG` session parameter.
pub fn default_query_tag() -> String {
    json!({
        "origin": "snowgate",
        "name": "mcp_server",
        "version": env!("CARGO_PKG_VERSION"),
    })
    .to_string()
}

/// Opens sessions against the backing warehouse.
#[async_trait]
pub trait Warehouse: Send + Sync {
    async fn open_session(
        &self,
        options: &SessionOptions,
    ) -> anyhow::Result<Box<dyn WarehouseSession>>;
}

/// A single open session. Sessions are never shared between calls.
#[async_trait]
pub trait WarehouseSession: Send {
    /// Run a statement. Its rows become available to [`fetch_all`](Self::fetch_all).
    async fn execute(&mut self, sql: &str) -> anyhow::Result<()>;

    /// Drain the rows of the last executed statement.
    async fn fetch_all(&mut self) -> anyhow::Result<Vec<Row>>;

    /// Release the session. Called exactly once, on success and failure alike.
    async fn close(&mut self) -> anyhow::Result<()>;
}
