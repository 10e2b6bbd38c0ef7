//! OpenAI-style function tool definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tool entry in an OpenAI `tools` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiTool {
    /// Always `"function"`
    #[serde(rename = "type")]
    pub tool_type: String,
    /// The function definition
    pub function: OpenAiFunction,
}

/// Function definition for an OpenAI tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiFunction {
    /// Function name
    pub name: String,
    /// Function description
    pub description: String,
    /// JSON schema for the arguments
    pub parameters: OpenAiParameters,
    /// Whether the model must follow the schema exactly
    pub strict: bool,
}

/// Argument schema of an OpenAI function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiParameters {
    /// Always `"object"`
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Whether keys outside `properties` are allowed
    #[serde(rename = "additionalProperties")]
    pub additional_properties: bool,
    /// Parameter schemas by name
    pub properties: Map<String, Value>,
    /// Required parameter names
    pub required: Vec<String>,
}
