//! SQL statement permissions.
//!
//! In YAML the permissions are a list of single-entry maps, one per statement type:
//!
//! ```yaml
//! sql_statement_permissions:
//!   - Select: true
//!   - Drop: false
//!   - Unknown: false
//! ```
//!
//! `true` entries form the allow list and `false` entries the disallow list. Names are
//! lowercased on load so policy checks can compare case-insensitively.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Allow and disallow lists of lowercase statement type names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "Vec<BTreeMap<String, bool>>",
    into = "Vec<BTreeMap<String, bool>>"
)]
pub struct StatementPermissions {
    pub allow: Vec<String>,
    pub disallow: Vec<String>,
}

impl StatementPermissions {
    /// Build permissions from explicit lists, lowercasing every entry.
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
        }
    }

    /// True when neither list has entries.
    pub fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.disallow.is_empty()
    }
}

impl From<Vec<BTreeMap<String, bool>>> for StatementPermissions {
    fn from(entries: Vec<BTreeMap<String, bool>>) -> Self {
        let mut permissions = Self::default();
        for (name, allowed) in entries.into_iter().flatten() {
            let name = name.to_lowercase();
            if allowed {
                permissions.allow.push(name);
            } else {
                permissions.disallow.push(name);
            }
        }
        permissions
    }
}

impl From<StatementPermissions> for Vec<BTreeMap<String, bool>> {
    fn from(permissions: StatementPermissions) -> Self {
        let allowed = permissions.allow.into_iter().map(|name| (name, true));
        let disallowed = permissions.disallow.into_iter().map(|name| (name, false));
        allowed
            .chain(disallowed)
            .map(|(name, value)| BTreeMap::from([(name, value)]))
            .collect()
    }
}
