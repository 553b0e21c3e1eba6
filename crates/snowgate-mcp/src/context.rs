//! Shared query context.
//!
//! Callers attach metadata (model, agent, user, intent, ...) through `set_query_context`.
//! The comment builder reads a snapshot of it whenever a statement is sent.

use serde_json::{Map, Value};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Key/value metadata describing the current caller.
pub type QueryContext = Map<String, Value>;

/// Process-wide context owned by the server.
#[derive(Debug, Default)]
pub struct QueryContextStore {
    inner: RwLock<QueryContext>,
}

impl QueryContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `partial` into the context and return the full result.
    ///
    /// Keys present in `partial` overwrite existing values; other keys are kept.
    pub fn set(&self, partial: QueryContext) -> QueryContext {
        let mut context = self.write();
        for (key, value) in partial {
            context.insert(key, value);
        }
        context.clone()
    }

    /// Snapshot of the current context.
    pub fn get(&self) -> QueryContext {
        self.read().clone()
    }

    /// Value of a single key.
    pub fn value(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Every operation leaves the map consistent, so a poisoned lock is safe to reuse.
    fn read(&self) -> RwLockReadGuard<'_, QueryContext> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, QueryContext> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
