//! Statement execution.
//!
//! This module runs an already-authorized statement against the warehouse:
//! - classifying it for the query comment
//! - prepending the rendered comment
//! - opening a tagged session, executing, and fetching every row
//! - closing the session on every exit path

use crate::comment::CommentBuilder;
use crate::error::QueryExecutionError;
use crate::warehouse::{Row, SessionOptions, Warehouse, WarehouseSession};
use anyhow::Context;
use snowgate_sql::StatementClassifier;
use std::sync::Arc;

/// Runs statements through the warehouse collaborator.
pub struct QueryExecutor {
    /// Backing warehouse.
    warehouse: Arc<dyn Warehouse>,
    /// Query comment renderer.
    comments: CommentBuilder,
    /// Classifier used for the `{statement_type}` placeholder.
    classifier: StatementClassifier,
    /// Options for every session this executor opens.
    session_options: SessionOptions,
}

impl QueryExecutor {
    /// Create a new executor with the default session options.
    pub fn new(warehouse: Arc<dyn Warehouse>, comments: CommentBuilder) -> Self {
        Self {
            warehouse,
            comments,
            classifier: StatementClassifier::new(),
            session_options: SessionOptions::tagged(),
        }
    }

    pub fn with_classifier(mut self, classifier: StatementClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_session_options(mut self, options: SessionOptions) -> Self {
        self.session_options = options;
        self
    }

    pub fn comments(&self) -> &CommentBuilder {
        &self.comments
    }

    /// Text actually sent to the warehouse for `statement`.
    pub fn prepare(&self, statement: &str, tool_name: &str) -> anyhow::Result<String> {
        let statement_type = self.classifier.classify(statement);
        let comment = self
            .comments
            .build(tool_name, &statement_type)
            .context("failed to render query comment")?;

        Ok(match comment {
            Some(comment) => format!("/* {comment} */\n{statement}"),
            None => statement.to_string(),
        })
    }

    /// Execute a statement and return all of its rows.
    pub async fn run_query(
        &self,
        statement: &str,
        tool_name: &str,
    ) -> Result<Vec<Row>, QueryExecutionError> {
        match self.try_run_query(statement, tool_name).await {
            Ok(rows) => {
                tracing::info!(tool = tool_name, rows = rows.len(), "Query executed");
                Ok(rows)
            }
            Err(e) => {
                tracing::error!(tool = tool_name, error = %format!("{e:#}"), "Query failed");
                Err(QueryExecutionError::new(format!(
                    "Error executing query: {e:#}"
                )))
            }
        }
    }

    async fn try_run_query(&self, statement: &str, tool_name: &str) -> anyhow::Result<Vec<Row>> {
        let sql = self.prepare(statement, tool_name)?;

        let mut session = self
            .warehouse
            .open_session(&self.session_options)
            .await
            .context("failed to open warehouse session")?;

        let result = execute_and_fetch(session.as_mut(), &sql).await;

        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "Failed to close warehouse session");
        }

        result
    }
}

async fn execute_and_fetch(
    session: &mut dyn WarehouseSession,
    sql: &str,
) -> anyhow::Result<Vec<Row>> {
    session.execute(sql).await?;
    session.fetch_all().await
}
