//! Tool registry and the query manager tools.
//!
//! The registry stores MCP tool definitions; [`query_manager_tools`] builds the three
//! tools this server exposes, and the argument types below decode their inputs.

use crate::context::QueryContext;
use crate::protocol::{ToolAnnotations, ToolDefinition};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Runs a single SQL statement.
pub const RUN_QUERY_TOOL: &str = "run_snowflake_query";
/// Merges caller metadata into the query context.
pub const SET_QUERY_CONTEXT_TOOL: &str = "set_query_context";
/// Returns the query context.
pub const GET_QUERY_CONTEXT_TOOL: &str = "get_query_context";

const RUN_QUERY_DESCRIPTION: &str = "\
Run a single SQL statement against the warehouse and return every result row as a \
list of objects keyed by column name.

Only statement types enabled by the administrator may run. A rejected statement returns \
an error naming its type; do not retry it with a different statement of the same type. \
Send one statement per call.";

const SET_QUERY_CONTEXT_DESCRIPTION: &str = "\
Set runtime context for query comments and observability.

Call this tool at the start of a session to register context information that will be \
included in all subsequent SQL query comments, so queries can be traced back to an agent, \
model or session in the warehouse query history.

Common context keys:
- model: the AI model name
- agent_name: name of the agent or application
- user_email: email of the user running the agent
- user_name: name of the user running the agent
- intent: object describing query intent (category, confidence, domains, question)
- query_parameters: object describing query details (datasets, dimensions, time_range)
- session_id: a unique session identifier for grouping related queries

Context persists for the lifetime of the server. Call again to update it.";

const GET_QUERY_CONTEXT_DESCRIPTION: &str =
    "Get the current query context that will be included in query comments.";

/// Registry of available MCP tools.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDefinition>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the query manager tools.
    pub fn query_manager() -> Self {
        let mut registry = Self::new();
        for tool in query_manager_tools() {
            registry.register(tool);
        }
        registry
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: ToolDefinition) {
        self.tools.insert(tool.name.clone(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All tools, ordered by name.
    pub fn list(&self) -> Vec<&ToolDefinition> {
        self.tools.values().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }
}

/// Definitions of `run_snowflake_query`, `set_query_context` and `get_query_context`.
pub fn query_manager_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: RUN_QUERY_TOOL.to_string(),
            description: Some(RUN_QUERY_DESCRIPTION.to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "statement": {"type": "string", "description": "SQL query to execute"}
                },
                "required": ["statement"]
            }),
            annotations: Some(ToolAnnotations {
                read_only_hint: Some(false),
                destructive_hint: Some(true),
                idempotent_hint: Some(false),
            }),
        },
        ToolDefinition {
            name: SET_QUERY_CONTEXT_TOOL.to_string(),
            description: Some(SET_QUERY_CONTEXT_DESCRIPTION.to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "model": {
                        "type": "string",
                        "description": "AI model name (e.g., 'claude-sonnet-4-5-20250929')"
                    },
                    "agent_name": {
                        "type": "string",
                        "description": "Name of the agent or application"
                    },
                    "user_email": {
                        "type": "string",
                        "description": "Email of the user running the agent"
                    },
                    "user_name": {
                        "type": "string",
                        "description": "Name of the user running the agent"
                    },
                    "intent": {
                        "type": "object",
                        "description": "Query intent: {category, confidence, domains, question}"
                    },
                    "query_parameters": {
                        "type": "object",
                        "description": "Query parameters: {datasets, dimensions, time_range}"
                    },
                    "session_id": {
                        "type": "string",
                        "description": "Unique session identifier for grouping queries"
                    },
                    "custom_context": {
                        "type": "object",
                        "description": "Additional custom key-value pairs for context"
                    }
                }
            }),
            annotations: Some(ToolAnnotations {
                read_only_hint: Some(false),
                destructive_hint: Some(false),
                idempotent_hint: Some(true),
            }),
        },
        ToolDefinition {
            name: GET_QUERY_CONTEXT_TOOL.to_string(),
            description: Some(GET_QUERY_CONTEXT_DESCRIPTION.to_string()),
            input_schema: json!({"type": "object", "properties": {}}),
            annotations: Some(ToolAnnotations {
                read_only_hint: Some(true),
                ..Default::default()
            }),
        },
    ]
}

/// Arguments of `run_snowflake_query`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunQueryArgs {
    pub statement: String,
}

/// Arguments of `set_query_context`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetQueryContextArgs {
    pub model: Option<String>,
    pub agent_name: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub intent: Option<Map<String, Value>>,
    pub query_parameters: Option<Map<String, Value>>,
    pub session_id: Option<String>,
    pub custom_context: Option<Map<String, Value>>,
}

impl SetQueryContextArgs {
    /// The partial context to merge. Absent fields are skipped; custom entries go last.
    pub fn into_context(self) -> QueryContext {
        let mut context = QueryContext::new();

        let strings = [
            ("model", self.model),
            ("agent_name", self.agent_name),
            ("user_email", self.user_email),
            ("user_name", self.user_name),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                context.insert(key.to_string(), Value::String(value));
            }
        }
        if let Some(intent) = self.intent {
            context.insert("intent".to_string(), Value::Object(intent));
        }
        if let Some(parameters) = self.query_parameters {
            context.insert("query_parameters".to_string(), Value::Object(parameters));
        }
        if let Some(session_id) = self.session_id {
            context.insert("session_id".to_string(), Value::String(session_id));
        }
        if let Some(custom) = self.custom_context {
            context.extend(custom);
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_manager_registry() {
        let registry = ToolRegistry::query_manager();
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.names(),
            vec![GET_QUERY_CONTEXT_TOOL, RUN_QUERY_TOOL, SET_QUERY_CONTEXT_TOOL]
        );
        let run = registry.get(RUN_QUERY_TOOL).unwrap();
        assert_eq!(run.input_schema["required"], json!(["statement"]));
        assert!(!registry.contains("drop_everything"));
    }

    #[test]
    fn test_set_context_args_skip_nulls() {
        let args: SetQueryContextArgs = serde_json::from_value(json!({
            "model": "claude-3",
            "agent_name": null,
            "intent": {"category": "analysis"},
        }))
        .unwrap();

        let context = args.into_context();
        assert_eq!(
            Value::Object(context),
            json!({"model": "claude-3", "intent": {"category": "analysis"}})
        );
    }

    #[test]
    fn test_custom_context_merged_last() {
        let args: SetQueryContextArgs = serde_json::from_value(json!({
            "model": "claude-3",
            "custom_context": {"model": "override", "department": "finance"},
        }))
        .unwrap();

        let context = args.into_context();
        assert_eq!(context["model"], "override");
        assert_eq!(context["department"], "finance");
    }

    #[test]
    fn test_wrong_argument_type_rejected() {
        let result = serde_json::from_value::<SetQueryContextArgs>(json!({"intent": "not an object"}));
        assert!(result.is_err());
        assert!(serde_json::from_value::<RunQueryArgs>(json!({})).is_err());
    }
}
