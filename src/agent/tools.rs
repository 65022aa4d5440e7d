//! Tool schemas, tool results, and the toolkit abstraction the agent dispatches into.

use crate::error::{ParleyError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Declarative description of a callable tool, offered to the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON Schema of the argument object.
    pub parameters: Value,
}

impl ToolSchema {
    pub fn new(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

/// Result of a tool invocation as reported back to the model.
///
/// Serializes to a JSON object that always carries `"success"`; failures
/// carry `"error"` instead of a data payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(Map<String, Value>),
    Failure {
        error: String,
        context: Map<String, Value>,
    },
}

impl ToolOutcome {
    /// Successful outcome. Non-object payloads are placed under `"data"`.
    pub fn success(payload: Value) -> Self {
        match payload {
            Value::Object(map) => ToolOutcome::Success(map),
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                ToolOutcome::Success(map)
            }
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ToolOutcome::Failure {
            error: error.into(),
            context: Map::new(),
        }
    }

    pub fn unknown_function(name: &str) -> Self {
        Self::failure(format!("Unknown function: {}", name))
    }

    /// Convert a fallible tool body into an outcome.
    pub fn from_result(result: Result<Value>) -> Self {
        match result {
            Ok(payload) => Self::success(payload),
            Err(e) => Self::failure(tool_error_message(e)),
        }
    }

    /// Attach an identifying field (e.g. the URL or query) to the outcome.
    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        match &mut self {
            ToolOutcome::Success(map) => {
                map.entry(key.to_string()).or_insert_with(|| value.into());
            }
            ToolOutcome::Failure { context, .. } => {
                context.insert(key.to_string(), value.into());
            }
        }
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ToolOutcome::Success(_) => None,
            ToolOutcome::Failure { error, .. } => Some(error),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        match self {
            ToolOutcome::Success(payload) => {
                map.insert("success".to_string(), Value::Bool(true));
                for (k, v) in payload {
                    if k != "success" {
                        map.insert(k.clone(), v.clone());
                    }
                }
            }
            ToolOutcome::Failure { error, context } => {
                map.insert("success".to_string(), Value::Bool(false));
                for (k, v) in context {
                    map.insert(k.clone(), v.clone());
                }
                map.insert("error".to_string(), Value::String(error.clone()));
            }
        }
        Value::Object(map)
    }

    /// Serialized form placed in the tool message content.
    pub fn to_json_string(&self) -> String {
        self.to_value().to_string()
    }
}

// Tool errors reach the model verbatim, so drop the library's category prefix.
fn tool_error_message(error: ParleyError) -> String {
    match error {
        ParleyError::Tool(msg) | ParleyError::InvalidInput(msg) => msg,
        ParleyError::Database(e) => e.to_string(),
        ParleyError::Http(e) => e.to_string(),
        other => other.to_string(),
    }
}

/// Outcome of looking a tool name up in a toolkit.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    Known(T),
    Unknown(String),
}

/// A closed set of tools with typed arguments.
#[async_trait]
pub trait ToolKit: Send + Sync {
    /// The toolkit's tool enumeration, one variant per tool.
    type Tool: Send + std::fmt::Debug;

    /// Schemas offered to the endpoint. Must name exactly the tools `resolve` accepts.
    fn schemas(&self) -> Vec<ToolSchema>;

    /// Map a requested name and raw JSON arguments onto a typed tool.
    fn resolve(&self, name: &str, arguments: &str) -> Result<Resolved<Self::Tool>>;

    /// Run a tool. Never fails: errors become failure outcomes.
    async fn invoke(&self, tool: Self::Tool) -> ToolOutcome;
}

/// Decode a JSON argument string into a typed argument struct.
///
/// An empty string is treated as an empty object.
pub fn decode_arguments<T: DeserializeOwned>(arguments: &str) -> Result<T> {
    let raw = if arguments.trim().is_empty() { "{}" } else { arguments };
    serde_json::from_str(raw)
        .map_err(|e| ParleyError::InvalidInput(format!("Invalid tool arguments: {}", e)))
}
