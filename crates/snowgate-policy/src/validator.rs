//! Statement type validation against allow/disallow lists.

use crate::error::PolicyViolation;
use serde::Serialize;
use snowgate_core::StatementPermissions;
use snowgate_sql::{StatementClassifier, StatementType};
use std::collections::BTreeSet;
use std::fmt;

/// Wildcard allow-list entry permitting every statement type.
pub const ALLOW_ALL: &str = "all";

/// Allow-list entry permitting types no other entry mentions.
pub const UNKNOWN: &str = "unknown";

/// The rule that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyRule {
    /// `all` is in the allow list.
    AllowAll,
    /// The type is in the disallow list.
    Disallowed,
    /// The type is in the allow list.
    Allowed,
    /// `unknown` is in the allow list.
    UnknownAllowed,
    /// Neither list has entries.
    NoPolicyConfigured,
    /// The type is in neither list.
    NotListed,
}

impl PolicyRule {
    pub fn permits(self) -> bool {
        matches!(
            self,
            PolicyRule::AllowAll | PolicyRule::Allowed | PolicyRule::UnknownAllowed
        )
    }
}

impl fmt::Display for PolicyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PolicyRule::AllowAll => "allow list contains 'all'",
            PolicyRule::Disallowed => "statement type is disallowed",
            PolicyRule::Allowed => "statement type is allowed",
            PolicyRule::UnknownAllowed => "allow list contains 'unknown'",
            PolicyRule::NoPolicyConfigured => "no statement permissions configured",
            PolicyRule::NotListed => "statement type is not listed",
        };
        f.write_str(text)
    }
}

/// Outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDecision {
    pub statement_type: StatementType,
    pub allowed: bool,
    pub rule: PolicyRule,
}

/// Validates statements against configured statement permissions.
#[derive(Debug, Clone, Default)]
pub struct StatementPolicy {
    allow: BTreeSet<String>,
    disallow: BTreeSet<String>,
    classifier: StatementClassifier,
}

impl StatementPolicy {
    /// Create a policy from allow and disallow lists. Entries are lowercased.
    pub fn new<A, D>(allow: A, disallow: D) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Self {
            allow: allow.into_iter().map(|s| s.as_ref().to_lowercase()).collect(),
            disallow: disallow.into_iter().map(|s| s.as_ref().to_lowercase()).collect(),
            classifier: StatementClassifier::new(),
        }
    }

    /// Create a policy from loaded configuration.
    pub fn from_permissions(permissions: &StatementPermissions) -> Self {
        Self::new(&permissions.allow, &permissions.disallow)
    }

    /// Use a specific classifier (e.g. another dialect).
    pub fn with_classifier(mut self, classifier: StatementClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn classifier(&self) -> &StatementClassifier {
        &self.classifier
    }

    pub fn allow_list(&self) -> impl Iterator<Item = &str> {
        self.allow.iter().map(String::as_str)
    }

    pub fn disallow_list(&self) -> impl Iterator<Item = &str> {
        self.disallow.iter().map(String::as_str)
    }

    /// Apply the precedence rules to an already classified statement type.
    pub fn evaluate(&self, statement_type: &StatementType) -> PolicyDecision {
        let key = statement_type.policy_key();

        let rule = if self.allow.contains(ALLOW_ALL) {
            PolicyRule::AllowAll
        } else if self.disallow.contains(&key) {
            PolicyRule::Disallowed
        } else if self.allow.contains(&key) {
            PolicyRule::Allowed
        } else if self.allow.contains(UNKNOWN) {
            PolicyRule::UnknownAllowed
        } else if self.allow.is_empty() && self.disallow.is_empty() {
            PolicyRule::NoPolicyConfigured
        } else {
            PolicyRule::NotListed
        };

        PolicyDecision {
            statement_type: statement_type.clone(),
            allowed: rule.permits(),
            rule,
        }
    }

    /// Classify a statement and decide whether it may run.
    pub fn decide(&self, sql: &str) -> PolicyDecision {
        let statement_type = self.classifier.classify(sql);
        let decision = self.evaluate(&statement_type);

        tracing::debug!(
            statement_type = %decision.statement_type,
            allowed = decision.allowed,
            rule = %decision.rule,
            "Statement policy evaluated"
        );

        decision
    }

    /// Classify a statement and return its type with the verdict.
    pub fn validate(&self, sql: &str) -> (StatementType, bool) {
        let decision = self.decide(sql);
        (decision.statement_type, decision.allowed)
    }

    /// Like [`validate`](Self::validate), but a rejection is an error.
    pub fn enforce(&self, sql: &str) -> Result<StatementType, PolicyViolation> {
        let decision = self.decide(sql);
        if decision.allowed {
            return Ok(decision.statement_type);
        }

        tracing::warn!(
            statement_type = %decision.statement_type,
            rule = %decision.rule,
            "Statement rejected by policy"
        );
        Err(PolicyViolation::new(decision.statement_type))
    }
}
