//! Snowgate statement policy.
//!
//! Decides whether a SQL statement may run, based on its statement type and the
//! configured allow/disallow lists. Rules are evaluated in a fixed order and the first
//! match wins:
//!
//! 1. `all` in the allow list permits everything
//! 2. a type in the disallow list is rejected
//! 3. a type in the allow list is permitted
//! 4. `unknown` in the allow list permits any remaining type
//! 5. with no lists configured nothing is permitted
//! 6. any type not mentioned is rejected

pub mod error;
pub mod validator;

pub use error::PolicyViolation;
pub use validator::{PolicyDecision, PolicyRule, StatementPolicy};
