//! Operation request/result envelopes exchanged with a session agent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One named call with its raw, not yet validated parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationRequest {
    pub name: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl OperationRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }

    /// Builder-style helper for tests and the CLI.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Build a request from a JSON `arguments` value. Non-object values are
    /// treated as "no parameters".
    pub fn from_arguments(name: impl Into<String>, arguments: Option<Value>) -> Self {
        let params = match arguments {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self {
            name: name.into(),
            params,
        }
    }
}

/// Outcome of an operation. Callers tell the two apart only through
/// [`OperationResult::is_error`].
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    /// Operation-specific object; always carries `request_count`.
    Success { data: Value },
    Failure { message: String },
}

impl OperationResult {
    pub fn success(data: Value) -> Self {
        OperationResult::Success { data }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        OperationResult::Failure {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, OperationResult::Failure { .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            OperationResult::Success { data } => Some(data),
            OperationResult::Failure { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            OperationResult::Success { .. } => None,
            OperationResult::Failure { message } => Some(message),
        }
    }

    /// Wire form: the data object on success, `{message, isError: true}` on failure.
    pub fn to_json(&self) -> Value {
        match self {
            OperationResult::Success { data } => data.clone(),
            OperationResult::Failure { message } => serde_json::json!({
                "message": message,
                "isError": true,
            }),
        }
    }
}

impl Serialize for OperationResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
