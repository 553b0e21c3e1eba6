//! Policy rejection error.

use snowgate_sql::StatementType;
use thiserror::Error;

/// A statement was rejected by the configured statement permissions.
#[derive(Debug, Clone, Error)]
#[error(
    "Statement type of {statement_type} is not permitted. Ask an administrator to add \
     '{}' to the allowed sql_statement_permissions",
    .statement_type.policy_key()
)]
pub struct PolicyViolation {
    pub statement_type: StatementType,
}

impl PolicyViolation {
    pub fn new(statement_type: StatementType) -> Self {
        Self { statement_type }
    }
}
