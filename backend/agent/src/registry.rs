//! Operation registry: the four read-only operations and their parameter
//! schemas.
//!
//! Parameter handling lives here, not in the handlers. `OperationSpec::validate`
//! coerces raw JSON to the declared types, applies defaults and enforces
//! bounds; handlers only ever see values that passed.

use std::collections::HashMap;

use forumlink_core::ForumError;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    LatestTopics,
    SearchPosts,
    GetTopic,
    RecentPosts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Integer,
    Boolean,
    String,
}

impl ParamKind {
    fn json_type(&self) -> &'static str {
        match self {
            ParamKind::Integer => "integer",
            ParamKind::Boolean => "boolean",
            ParamKind::String => "string",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    Int(i64),
    Bool(bool),
    Str(&'static str),
}

impl ParamDefault {
    fn to_param(self) -> ParamValue {
        match self {
            ParamDefault::Int(i) => ParamValue::Int(i),
            ParamDefault::Bool(b) => ParamValue::Bool(b),
            ParamDefault::Str(s) => ParamValue::Str(s.to_string()),
        }
    }

    fn to_json(self) -> Value {
        match self {
            ParamDefault::Int(i) => json!(i),
            ParamDefault::Bool(b) => json!(b),
            ParamDefault::Str(s) => json!(s),
        }
    }
}

/// Declared shape of one parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<ParamDefault>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    /// Allowed values for string params; empty means unrestricted.
    pub choices: &'static [&'static str],
}

impl ParamSpec {
    const fn new(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            default: None,
            min: None,
            max: None,
            min_len: None,
            max_len: None,
            choices: &[],
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn default(mut self, value: ParamDefault) -> Self {
        self.default = Some(value);
        self
    }

    const fn range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    const fn length(mut self, min: usize, max: usize) -> Self {
        self.min_len = Some(min);
        self.max_len = Some(max);
        self
    }

    const fn choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = choices;
        self
    }

    /// Coerce a raw value to this param's type and check its bounds.
    pub fn coerce(&self, raw: &Value) -> Result<ParamValue, ForumError> {
        let value = match self.kind {
            ParamKind::Integer => ParamValue::Int(coerce_int(raw).ok_or_else(|| {
                ForumError::validation(self.name, format!("expected an integer, got {raw}"))
            })?),
            ParamKind::Boolean => ParamValue::Bool(coerce_bool(raw).ok_or_else(|| {
                ForumError::validation(self.name, format!("expected a boolean, got {raw}"))
            })?),
            ParamKind::String => ParamValue::Str(coerce_string(raw).ok_or_else(|| {
                ForumError::validation(self.name, format!("expected a string, got {raw}"))
            })?),
        };
        self.check_bounds(&value)?;
        Ok(value)
    }

    fn check_bounds(&self, value: &ParamValue) -> Result<(), ForumError> {
        match value {
            ParamValue::Int(i) => {
                if let Some(min) = self.min.filter(|min| i < min) {
                    return Err(ForumError::validation(self.name, format!("must be >= {min}, got {i}")));
                }
                if let Some(max) = self.max.filter(|max| i > max) {
                    return Err(ForumError::validation(self.name, format!("must be <= {max}, got {i}")));
                }
            }
            ParamValue::Str(s) => {
                let len = s.chars().count();
                if let Some(min) = self.min_len.filter(|min| len < *min) {
                    return Err(ForumError::validation(
                        self.name,
                        format!("must be at least {min} characters"),
                    ));
                }
                if let Some(max) = self.max_len.filter(|max| len > *max) {
                    return Err(ForumError::validation(
                        self.name,
                        format!("must be at most {max} characters"),
                    ));
                }
                if !self.choices.is_empty() && !self.choices.contains(&s.as_str()) {
                    return Err(ForumError::validation(
                        self.name,
                        format!("must be one of: {}", self.choices.join(", ")),
                    ));
                }
            }
            ParamValue::Bool(_) => {}
        }
        Ok(())
    }

    fn json_schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), json!(self.kind.json_type()));
        schema.insert("description".into(), json!(self.description));
        if let Some(default) = self.default {
            schema.insert("default".into(), default.to_json());
        }
        if let Some(min) = self.min {
            schema.insert("minimum".into(), json!(min));
        }
        if let Some(max) = self.max {
            schema.insert("maximum".into(), json!(max));
        }
        if let Some(min) = self.min_len {
            schema.insert("minLength".into(), json!(min));
        }
        if let Some(max) = self.max_len {
            schema.insert("maxLength".into(), json!(max));
        }
        if !self.choices.is_empty() {
            schema.insert("enum".into(), json!(self.choices));
        }
        Value::Object(schema)
    }
}

fn coerce_int(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_bool(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_string(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A coerced, bounds-checked parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

/// Validated parameters for one call. Optional params without a default are
/// simply absent.
#[derive(Debug, Clone, Default)]
pub struct ParamValues {
    values: HashMap<&'static str, ParamValue>,
}

impl ParamValues {
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ParamValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(ParamValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ParamValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// One entry of the operation table.
#[derive(Debug, Clone, Copy)]
pub struct OperationSpec {
    pub kind: OperationKind,
    pub name: &'static str,
    pub description: &'static str,
    /// Used in failure messages: "Error {action}: ...".
    pub action: &'static str,
    pub params: &'static [ParamSpec],
}

impl OperationSpec {
    /// Coerce and validate raw params. Unknown names are ignored; `null`
    /// counts as absent.
    pub fn validate(&self, raw: &Map<String, Value>) -> Result<ParamValues, ForumError> {
        let mut values = HashMap::new();
        for param in self.params {
            match raw.get(param.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    values.insert(param.name, param.coerce(value)?);
                }
                None if param.required => {
                    return Err(ForumError::validation(param.name, "is required"));
                }
                None => {
                    if let Some(default) = param.default {
                        values.insert(param.name, default.to_param());
                    }
                }
            }
        }
        Ok(ParamValues { values })
    }

    /// JSON Schema for the operation's parameters.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.json_schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Descriptor in the shape MCP `tools/list` expects.
    pub fn descriptor(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }
}

pub const LATEST_ORDERS: &[&str] = &[
    "default", "created", "activity", "views", "posts", "category", "likes",
];

static OPERATIONS: &[OperationSpec] = &[
    OperationSpec {
        kind: OperationKind::LatestTopics,
        name: "get_latest_topics",
        description: "Get the latest topics from the forum. Results are cached for a few minutes per session.",
        action: "fetching latest topics",
        params: &[
            ParamSpec::new("per_page", ParamKind::Integer, "Number of topics to return (1-50)")
                .default(ParamDefault::Int(10))
                .range(1, 50),
            ParamSpec::new("use_cache", ParamKind::Boolean, "Serve from the session cache when it is still fresh")
                .default(ParamDefault::Bool(true)),
            ParamSpec::new("order", ParamKind::String, "Sort order for the listing")
                .choices(LATEST_ORDERS),
        ],
    },
    OperationSpec {
        kind: OperationKind::SearchPosts,
        name: "search_posts",
        description: "Search forum posts. An empty query browses the most recent posts instead.",
        action: "searching posts",
        params: &[
            ParamSpec::new("query", ParamKind::String, "Search query; leave empty to browse recent posts")
                .default(ParamDefault::Str(""))
                .length(0, 500),
            ParamSpec::new("max_results", ParamKind::Integer, "Maximum number of posts to return (1-100)")
                .default(ParamDefault::Int(20))
                .range(1, 100),
        ],
    },
    OperationSpec {
        kind: OperationKind::GetTopic,
        name: "get_topic",
        description: "Get a single topic by id, optionally with its first posts.",
        action: "fetching topic",
        params: &[
            ParamSpec::new("id", ParamKind::String, "Topic id")
                .required()
                .length(1, 64),
            ParamSpec::new("include_posts", ParamKind::Boolean, "Include up to 5 posts of the topic")
                .default(ParamDefault::Bool(true)),
        ],
    },
    OperationSpec {
        kind: OperationKind::RecentPosts,
        name: "get_recent_posts",
        description: "Get recent posts across the forum, optionally before a given post id.",
        action: "fetching recent posts",
        params: &[
            ParamSpec::new("before", ParamKind::String, "Only posts older than this post id")
                .length(1, 32),
            ParamSpec::new("limit", ParamKind::Integer, "Number of posts to return (1-20)")
                .default(ParamDefault::Int(10))
                .range(1, 20),
        ],
    },
];

/// Declarative table of every operation.
pub fn operations() -> &'static [OperationSpec] {
    OPERATIONS
}

pub fn find(name: &str) -> Option<&'static OperationSpec> {
    OPERATIONS.iter().find(|op| op.name == name)
}

pub fn operation_names() -> Vec<&'static str> {
    OPERATIONS.iter().map(|op| op.name).collect()
}
