//! Host-supplied parameters and the merged arguments a tool receives

use crate::error::{Result, ToolError};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A shared Rust value passed to tools by the host, such as a database
/// handle or a callback
#[derive(Clone)]
pub struct HostObject {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl HostObject {
    /// Wrap a value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an already shared value
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: type_name::<T>(),
        }
    }

    /// The value, if it is a `T`
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// Name of the wrapped type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HostObject").field(&self.type_name).finish()
    }
}

/// One host-supplied parameter value
#[derive(Debug, Clone)]
pub enum HostValue {
    /// A plain JSON value
    Json(Value),
    /// A shared Rust value
    Object(HostObject),
}

impl HostValue {
    /// Text used when the value is substituted into a message template.
    ///
    /// Strings are inserted as they are, other JSON in its compact encoding,
    /// and host objects by type name.
    pub fn render(&self) -> String {
        match self {
            Self::Json(Value::String(s)) => s.clone(),
            Self::Json(other) => other.to_string(),
            Self::Object(object) => object.type_name().to_string(),
        }
    }
}

impl From<Value> for HostValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<HostObject> for HostValue {
    fn from(object: HostObject) -> Self {
        Self::Object(object)
    }
}

/// Parameters the host controls, keyed by name.
///
/// Tools pick out the ones they declare as injected; the model never sees them.
#[derive(Debug, Clone, Default)]
pub struct HostParams {
    values: HashMap<String, HostValue>,
}

impl HostParams {
    /// Empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a JSON value
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, HostValue::Json(value.into()));
        self
    }

    /// Add a Rust value
    pub fn with_object<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.insert(name, HostValue::Object(HostObject::new(value)));
        self
    }

    /// Add an already shared Rust value
    pub fn with_shared<T: Any + Send + Sync>(
        mut self,
        name: impl Into<String>,
        value: Arc<T>,
    ) -> Self {
        self.insert(name, HostValue::Object(HostObject::from_arc(value)));
        self
    }

    /// Insert or replace a parameter
    pub fn insert(&mut self, name: impl Into<String>, value: HostValue) {
        self.values.insert(name.into(), value);
    }

    /// Look a parameter up
    pub fn get(&self, name: &str) -> Option<&HostValue> {
        self.values.get(name)
    }

    /// Whether a parameter is present
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no parameters
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The merged arguments of one tool call
#[derive(Debug, Clone)]
pub struct ToolArgs {
    tool: String,
    values: IndexMap<String, HostValue>,
}

impl ToolArgs {
    /// Arguments taken from a JSON object, as the model would send them
    pub fn from_model(tool: impl Into<String>, model: Map<String, Value>) -> Self {
        Self {
            tool: tool.into(),
            values: model
                .into_iter()
                .map(|(name, value)| (name, HostValue::Json(value)))
                .collect(),
        }
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: HostValue) {
        self.values.insert(name.into(), value);
    }

    /// Name of the tool being called
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Deserialize a required parameter
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self.json(name)?.ok_or_else(|| {
            ToolError::invalid_arguments(&self.tool, format!("missing parameter '{name}'"))
        })?;
        self.decode(name, value)
    }

    /// Deserialize a parameter that may be absent or null
    pub fn get_optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.json(name)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => self.decode(name, value).map(Some),
        }
    }

    /// A shared Rust value supplied by the host
    pub fn object<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        match self.values.get(name) {
            Some(HostValue::Object(object)) => object.downcast::<T>().ok_or_else(|| {
                ToolError::invalid_arguments(
                    &self.tool,
                    format!(
                        "parameter '{name}' is a {}, not a {}",
                        object.type_name(),
                        type_name::<T>()
                    ),
                )
            }),
            Some(HostValue::Json(_)) => Err(ToolError::invalid_arguments(
                &self.tool,
                format!("parameter '{name}' is JSON, not a {}", type_name::<T>()),
            )),
            None => Err(ToolError::invalid_arguments(
                &self.tool,
                format!("missing parameter '{name}'"),
            )),
        }
    }

    /// The raw JSON value of a parameter
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.values.get(name) {
            Some(HostValue::Json(value)) => Some(value),
            _ => None,
        }
    }

    /// A parameter as it was merged, JSON or host object
    pub fn entry(&self, name: &str) -> Option<&HostValue> {
        self.values.get(name)
    }

    /// Whether a parameter is present
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// All parameters in merge order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HostValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    fn json(&self, name: &str) -> Result<Option<&Value>> {
        match self.values.get(name) {
            Some(HostValue::Json(value)) => Ok(Some(value)),
            Some(HostValue::Object(object)) => Err(ToolError::invalid_arguments(
                &self.tool,
                format!("parameter '{name}' is a {}, not JSON", object.type_name()),
            )),
            None => Ok(None),
        }
    }

    fn decode<T: DeserializeOwned>(&self, name: &str, value: &Value) -> Result<T> {
        T::deserialize(value).map_err(|err| {
            ToolError::invalid_arguments(&self.tool, format!("parameter '{name}': {err}"))
        })
    }
}
