//! Query comment configuration.
//!
//! When enabled, every statement sent by `run_snowflake_query` is prefixed with a JSON
//! comment rendered from a template. Template string values may reference placeholders
//! such as `{tool_name}` or `{model}`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::ConfigError;

/// Configuration for query comments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryCommentConfig {
    /// Whether comments are prepended to outgoing SQL.
    #[serde(default)]
    pub enabled: bool,

    /// Template override. The default template is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Value>,
}

impl QueryCommentConfig {
    /// The template in effect: `None` while disabled.
    pub fn effective_template(&self) -> Option<Value> {
        if !self.enabled {
            return None;
        }
        Some(self.template.clone().unwrap_or_else(default_template))
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match &self.template {
            Some(template) if !template.is_object() => Err(ConfigError::Config(
                "query_comment.template must be a mapping".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Template used when comments are enabled without an override.
pub fn default_template() -> Value {
    json!({
        "tool": "{tool_name}",
        "statement_type": "{statement_type}",
        "request_id": "{request_id}",
        "timestamp": "{timestamp}",
        "model": "{model}",
        "source": "{server_name}",
    })
}
