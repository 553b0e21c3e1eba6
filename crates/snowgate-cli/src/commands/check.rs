//! `snowgate check` command implementation.
//!
//! Classifies a statement and evaluates it against the configured permissions without
//! touching the warehouse.

use anyhow::Result;
use clap::Args;
use snowgate_policy::{PolicyDecision, StatementPolicy};
use snowgate_sql::{SqlDialect, StatementClassifier};
use std::path::PathBuf;

/// Arguments for `snowgate check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// SQL statement to check.
    pub sql: String,

    /// Configuration file path.
    #[arg(short, long, default_value = super::DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// SQL dialect used to classify the statement.
    #[arg(long, default_value = "snowflake")]
    pub dialect: SqlDialect,

    /// Print the decision as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: CheckArgs) -> Result<()> {
    let config = super::load_config(&args.config)?;

    let policy = StatementPolicy::from_permissions(&config.sql_statement_permissions)
        .with_classifier(StatementClassifier::with_dialect(args.dialect));
    let decision = policy.decide(&args.sql);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        print!("{}", render_decision(&decision));
    }

    Ok(())
}

fn render_decision(decision: &PolicyDecision) -> String {
    let verdict = if decision.allowed { "ALLOWED" } else { "DENIED" };
    format!(
        "Statement type: {}\nVerdict:        {}\nRule:           {}\n",
        decision.statement_type, verdict, decision.rule
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_allowed() {
        let policy = StatementPolicy::new(["select"], ["drop"]);
        let text = render_decision(&policy.decide("SELECT 1"));
        assert!(text.contains("Statement type: Select"));
        assert!(text.contains("ALLOWED"));
        assert!(text.contains("statement type is allowed"));
    }

    #[test]
    fn test_render_denied() {
        let policy = StatementPolicy::new(["select"], ["drop"]);
        let text = render_decision(&policy.decide("DROP TABLE t"));
        assert!(text.contains("Statement type: Drop"));
        assert!(text.contains("DENIED"));
        assert!(text.contains("statement type is disallowed"));
    }
}
