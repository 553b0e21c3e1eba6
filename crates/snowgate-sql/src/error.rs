//! Error types for the SQL crate.

use thiserror::Error;

/// Errors that can occur while parsing SQL.
#[derive(Debug, Error)]
pub enum SqlError {
    /// SQL parsing failed.
    #[error("failed to parse SQL: {0}")]
    ParseError(String),

    /// Text held no statement or more than one.
    #[error("expected exactly one statement, found {0}")]
    StatementCount(usize),
}
