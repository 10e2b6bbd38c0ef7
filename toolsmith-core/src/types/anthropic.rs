//! Anthropic-style tool definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tool entry for the Anthropic messages API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicTool {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// Input schema
    pub input_schema: AnthropicInputSchema,
    /// Prompt caching marker
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cache_control: Option<CacheControl>,
}

/// Input schema of an Anthropic tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicInputSchema {
    /// Always `"object"`
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Parameter schemas by name
    pub properties: Map<String, Value>,
    /// Required parameter names
    pub required: Vec<String>,
}

/// Cache control block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheControl {
    /// Cache type
    #[serde(rename = "type")]
    pub cache_type: String,
}

impl CacheControl {
    /// The `ephemeral` cache marker
    pub fn ephemeral() -> Self {
        Self {
            cache_type: "ephemeral".to_string(),
        }
    }
}
