//! Tool return values

use crate::error::ToolError;
use serde_json::Value;
use std::fmt;

/// Items produced by a streaming tool
pub type ToolStream = Box<dyn Iterator<Item = Result<Value, ToolError>> + Send>;

/// What a tool returns: one value, or a stream of values produced lazily
pub enum ToolOutput {
    /// A single value
    Single(Value),
    /// A sequence of values, possibly failing part way through
    Stream(ToolStream),
}

impl ToolOutput {
    /// A single value
    pub fn single(value: impl Into<Value>) -> Self {
        Self::Single(value.into())
    }

    /// A stream of values that cannot fail
    pub fn stream<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V> + 'static,
        I::IntoIter: Send + 'static,
        V: Into<Value> + 'static,
    {
        Self::Stream(Box::new(items.into_iter().map(|item| Ok::<Value, ToolError>(item.into()))))
    }

    /// A stream of values that may fail
    pub fn try_stream<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Result<Value, ToolError>>,
        I::IntoIter: Send + 'static,
    {
        Self::Stream(Box::new(items.into_iter()))
    }

    /// Whether this output is a stream
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// The single value, or every streamed value collected into an array
    pub fn into_value(self) -> Result<Value, ToolError> {
        match self {
            Self::Single(value) => Ok(value),
            Self::Stream(items) => items.collect::<Result<Vec<_>, _>>().map(Value::Array),
        }
    }
}

impl fmt::Debug for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(value) => f.debug_tuple("Single").field(value).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Value> for ToolOutput {
    fn from(value: Value) -> Self {
        Self::Single(value)
    }
}

impl From<String> for ToolOutput {
    fn from(value: String) -> Self {
        Self::Single(Value::String(value))
    }
}

impl From<&str> for ToolOutput {
    fn from(value: &str) -> Self {
        Self::Single(Value::String(value.to_string()))
    }
}

/// Text of a value as it appears in results shown to the model.
///
/// Strings appear without quotes, everything else in compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
