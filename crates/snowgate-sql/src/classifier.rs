//! SQL statement classification.

use crate::error::SqlError;
use serde::{Deserialize, Serialize};
use sqlparser::ast::{SetExpr, SetOperator, Statement};
use sqlparser::dialect::{Dialect, GenericDialect, PostgreSqlDialect, SnowflakeDialect};
use sqlparser::parser::Parser;
use std::fmt;

/// Coarse statement type label (`Select`, `Insert`, `Copy`, ...).
///
/// This is deliberately not an enum: the set of labels follows the parser grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementType(String);

impl StatementType {
    /// Label for text that could not be classified.
    pub const UNKNOWN: &'static str = "Unknown";

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn unknown() -> Self {
        Self::new(Self::UNKNOWN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    /// Lowercase form used for policy list lookups.
    pub fn policy_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for StatementType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// SQL dialect used for parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    Snowflake,
    Postgres,
    Generic,
}

impl SqlDialect {
    fn parser_dialect(self) -> Box<dyn Dialect> {
        match self {
            SqlDialect::Snowflake => Box::new(SnowflakeDialect {}),
            SqlDialect::Postgres => Box::new(PostgreSqlDialect {}),
            SqlDialect::Generic => Box::new(GenericDialect {}),
        }
    }
}

impl std::str::FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "snowflake" => Ok(SqlDialect::Snowflake),
            "postgres" | "postgresql" => Ok(SqlDialect::Postgres),
            "generic" => Ok(SqlDialect::Generic),
            other => Err(format!("Unknown SQL dialect: {}", other)),
        }
    }
}

/// Classifies SQL text by the kind of its root syntax node.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementClassifier {
    dialect: SqlDialect,
}

impl StatementClassifier {
    /// Create a classifier for the Snowflake dialect.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Parse text holding exactly one statement.
    pub fn parse(&self, sql: &str) -> Result<Statement, SqlError> {
        let dialect = self.dialect.parser_dialect();
        let mut statements = Parser::parse_sql(dialect.as_ref(), sql)
            .map_err(|e| SqlError::ParseError(e.to_string()))?;

        if statements.len() != 1 {
            return Err(SqlError::StatementCount(statements.len()));
        }
        Ok(statements.remove(0))
    }

    /// Label a statement. Never fails: anything unparsable is `Unknown`.
    pub fn classify(&self, sql: &str) -> StatementType {
        match self.parse(sql) {
            Ok(statement) => statement_type(&statement),
            Err(e) => {
                tracing::debug!(error = %e, dialect = ?self.dialect, "Statement not classified");
                StatementType::unknown()
            }
        }
    }
}

/// Label a parsed statement.
pub fn statement_type(statement: &Statement) -> StatementType {
    let label = match statement {
        Statement::Query(query) => return query_body_type(&query.body),
        Statement::Insert(_) => "Insert",
        Statement::Update(_) => "Update",
        Statement::Delete(_) => "Delete",
        Statement::Merge { .. } => "Merge",
        Statement::Copy { .. } | Statement::CopyIntoSnowflake { .. } => "Copy",
        Statement::CreateTable(_)
        | Statement::CreateView(_)
        | Statement::CreateIndex(_)
        | Statement::CreateRole(_)
        | Statement::CreateUser(_)
        | Statement::CreateFunction(_)
        | Statement::CreateSchema { .. }
        | Statement::CreateDatabase { .. }
        | Statement::CreateStage { .. }
        | Statement::CreateSequence { .. } => "Create",
        Statement::Drop { .. } | Statement::DropFunction(_) | Statement::DropProcedure { .. } => {
            "Drop"
        }
        Statement::AlterTable(_)
        | Statement::AlterSchema(_)
        | Statement::AlterUser(_)
        | Statement::AlterView { .. }
        | Statement::AlterRole { .. }
        | Statement::AlterSession { .. } => "Alter",
        Statement::ShowTables { .. }
        | Statement::ShowViews { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowSchemas { .. }
        | Statement::ShowDatabases { .. }
        | Statement::ShowFunctions { .. }
        | Statement::ShowObjects(_) => "Show",
        Statement::ExplainTable { .. } => "Describe",
        Statement::Explain { .. } => "Explain",
        Statement::StartTransaction { .. } => "Transaction",
        Statement::Commit { .. } => "Commit",
        Statement::Rollback { .. } => "Rollback",
        Statement::Grant { .. } => "Grant",
        Statement::Revoke { .. } => "Revoke",
        Statement::Truncate(_) => "Truncate",
        Statement::Use(_) => "Use",
        Statement::Set(_) => "Set",
        other => return fallback_type(other),
    };
    StatementType::new(label)
}

fn query_body_type(body: &SetExpr) -> StatementType {
    let label = match body {
        SetExpr::Select(_) => "Select",
        SetExpr::Query(inner) => return query_body_type(&inner.body),
        SetExpr::SetOperation { op, .. } => match op {
            SetOperator::Union => "Union",
            // Snowflake's MINUS is a synonym for EXCEPT.
            SetOperator::Except | SetOperator::Minus => "Except",
            SetOperator::Intersect => "Intersect",
        },
        SetExpr::Values(_) => "Values",
        SetExpr::Insert(_) => "Insert",
        SetExpr::Update(_) => "Update",
        SetExpr::Delete(_) => "Delete",
        SetExpr::Merge(_) => "Merge",
        SetExpr::Table(_) => "Table",
    };
    StatementType::new(label)
}

/// Label for the less common statements, taken from the variant name in the `Debug`
/// rendering and folded into the same families as above.
fn fallback_type(statement: &Statement) -> StatementType {
    let rendered = format!("{:?}", statement);
    let kind: String = rendered
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    let label = match kind.as_str() {
        k if k.starts_with("Create") => "Create",
        k if k.starts_with("Drop") => "Drop",
        k if k.starts_with("Alter") => "Alter",
        k if k.starts_with("Show") => "Show",
        "" => StatementType::UNKNOWN,
        other => other,
    };
    StatementType::new(label)
}
