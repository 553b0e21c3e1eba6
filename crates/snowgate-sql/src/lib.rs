//! # snowgate-sql
//!
//! Coarse SQL statement classification for Snowgate.
//!
//! Statements are parsed with `sqlparser` using the warehouse dialect and labelled by
//! the kind of their root node:
//!
//! | SQL | Label |
//! |-----|-------|
//! | `SELECT * FROM t` | `Select` |
//! | `SELECT 1 UNION SELECT 2` | `Union` |
//! | `COPY INTO t FROM @stage` | `Copy` |
//! | `CREATE TABLE t (id INT)` | `Create` |
//! | `MERGE INTO t USING s ...` | `Merge` |
//! | anything unparsable | `Unknown` |
//!
//! Labels are open-ended strings: a statement kind added to the parser grammar shows up
//! as a new label without any change here.

pub mod classifier;
pub mod error;

pub use classifier::{SqlDialect, StatementClassifier, StatementType};
pub use error::SqlError;
