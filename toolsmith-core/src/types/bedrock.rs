//! AWS Bedrock Converse tool configuration

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `toolConfig` passed to Bedrock Converse
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BedrockToolConfig {
    /// Available tools
    pub tools: Vec<BedrockTool>,
}

/// Wrapper object Bedrock expects around every tool spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedrockTool {
    /// The tool specification
    #[serde(rename = "toolSpec")]
    pub tool_spec: BedrockToolSpec,
}

/// Name, description and input schema of a Bedrock tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedrockToolSpec {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// Input schema
    #[serde(rename = "inputSchema")]
    pub input_schema: BedrockInputSchema,
}

/// Bedrock nests the JSON schema under a `json` key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedrockInputSchema {
    /// The JSON schema
    pub json: BedrockJsonSchema,
}

/// JSON schema of a Bedrock tool input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedrockJsonSchema {
    /// Always `"object"`
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Parameter schemas by name
    pub properties: Map<String, Value>,
    /// Required parameter names
    pub required: Vec<String>,
}
