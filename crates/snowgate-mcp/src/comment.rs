//! Query comment rendering.
//!
//! A comment template is an arbitrary JSON document. Every string leaf may contain
//! `{name}` placeholders, which are replaced from a namespace assembled per call:
//!
//! | Name             | Source                                                |
//! |------------------|-------------------------------------------------------|
//! | `request_id`     | fresh UUID v4                                         |
//! | `timestamp`      | current UTC time, RFC 3339                            |
//! | `tool_name`      | the calling tool                                      |
//! | `statement_type` | classifier label of the statement                     |
//! | `model`          | context `model`, else `SNOWGATE_MODEL`, else `unknown` |
//! | `server_name`    | `snowgate`                                            |
//! | any other key    | the query context                                     |
//!
//! Unknown placeholders are left in place.

use crate::context::QueryContextStore;
use regex::{Captures, Regex};
use serde_json::Value;
use snowgate_sql::StatementType;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Value of the `{server_name}` placeholder.
pub const SERVER_NAME: &str = "snowgate";

/// Environment variable holding the fallback model name.
pub const MODEL_ENV: &str = "SNOWGATE_MODEL";

/// Model name used when neither the context nor the environment provides one.
pub const UNKNOWN_MODEL: &str = "unknown";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// Builds the JSON comment prepended to outgoing statements.
#[derive(Debug, Clone)]
pub struct CommentBuilder {
    template: Option<Value>,
    default_model: Option<String>,
    context: Arc<QueryContextStore>,
}

impl CommentBuilder {
    /// Create a builder. `None` disables comments.
    ///
    /// The fallback model is read from `SNOWGATE_MODEL` here, once.
    pub fn new(template: Option<Value>, context: Arc<QueryContextStore>) -> Self {
        Self {
            template,
            default_model: default_model_from(std::env::var(MODEL_ENV).ok()),
            context,
        }
    }

    pub fn disabled(context: Arc<QueryContextStore>) -> Self {
        Self {
            template: None,
            default_model: None,
            context,
        }
    }

    /// Override the fallback model name.
    pub fn with_default_model(mut self, model: Option<String>) -> Self {
        self.default_model = model;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.template.is_some()
    }

    pub fn context(&self) -> &Arc<QueryContextStore> {
        &self.context
    }

    /// Render the comment for one statement, or `None` while disabled.
    pub fn build(
        &self,
        tool_name: &str,
        statement_type: &StatementType,
    ) -> Result<Option<String>, serde_json::Error> {
        let Some(template) = &self.template else {
            return Ok(None);
        };

        let namespace = self.namespace(tool_name, statement_type);
        let rendered = render(template, &namespace);
        let text = serde_json::to_string(&rendered)?;
        Ok(Some(escape_comment(&text)))
    }

    fn namespace(&self, tool_name: &str, statement_type: &StatementType) -> HashMap<String, String> {
        let context = self.context.get();

        let model = match context.get("model") {
            None | Some(Value::Null) => None,
            Some(value) => Some(as_text(value)),
        }
        .filter(|m| !m.is_empty())
        .or_else(|| self.default_model.clone())
        .unwrap_or_else(|| UNKNOWN_MODEL.to_string());

        let mut namespace: HashMap<String, String> = context
            .iter()
            .map(|(key, value)| (key.clone(), as_text(value)))
            .collect();

        namespace.insert("model".into(), model);
        namespace.insert("request_id".into(), uuid::Uuid::new_v4().to_string());
        namespace.insert("timestamp".into(), chrono::Utc::now().to_rfc3339());
        namespace.insert("tool_name".into(), tool_name.to_string());
        namespace.insert("statement_type".into(), statement_type.to_string());
        namespace.insert("server_name".into(), SERVER_NAME.to_string());
        namespace
    }
}

/// Fallback model from the raw `SNOWGATE_MODEL` value. Empty counts as unset.
fn default_model_from(value: Option<String>) -> Option<String> {
    value.filter(|model| !model.is_empty())
}

/// Break up comment delimiters so the text cannot close the surrounding block comment
/// or open a nested one.
fn escape_comment(text: &str) -> String {
    text.replace("*/", "* /").replace("/*", "/ *")
}

/// Substitute placeholders in every string leaf of `template`.
pub fn render(template: &Value, namespace: &HashMap<String, String>) -> Value {
    match template {
        Value::String(text) => Value::String(substitute(text, namespace)),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), render(value, namespace)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| render(item, namespace)).collect())
        }
        other => other.clone(),
    }
}

fn substitute(text: &str, namespace: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| match namespace.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Strings verbatim, anything else as compact JSON.
fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
