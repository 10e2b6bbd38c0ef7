//! Gemini function declarations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Gemini tool holding function declarations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiTool {
    /// Declared functions
    pub function_declarations: Vec<GeminiFunctionDeclaration>,
}

/// One callable function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiFunctionDeclaration {
    /// Function name
    pub name: String,
    /// What the function does; the model uses it to decide whether to call it
    pub description: String,
    /// Parameter schema, unset for functions without parameters
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parameters: Option<GeminiParameters>,
    /// Output schema
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub response: Option<Value>,
}

/// Parameter schema of a Gemini function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiParameters {
    /// Always `"object"`
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Parameter schemas by name
    pub properties: Map<String, Value>,
    /// Required parameter names
    pub required: Vec<String>,
}
