//! Vendor-neutral tool schema and its vendor exports

use super::anthropic::{AnthropicInputSchema, AnthropicTool, CacheControl};
use super::bedrock::{BedrockInputSchema, BedrockJsonSchema, BedrockTool, BedrockToolSpec};
use super::gemini::{GeminiFunctionDeclaration, GeminiParameters};
use super::openai::{OpenAiFunction, OpenAiParameters, OpenAiTool};
use crate::json::remove_keys;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys OpenAI strict mode rejects inside property schemas
const STRICT_MODE_STRIPPED_KEYS: &[&str] = &["format", "default"];

/// The schema of one tool: its name, description and parameters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// Parameter schemas by name, in declaration order
    pub input_properties: Map<String, Value>,
    /// Names of parameters without a default
    pub required_parameters: Vec<String>,
}

impl ToolSchema {
    /// A schema with no parameters
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Export as an OpenAI function tool.
    ///
    /// Strict mode removes `format` and `default` keys at every depth, marks
    /// every property as required and disallows additional properties.
    pub fn to_openai(&self, strict: bool) -> OpenAiTool {
        let (properties, required) = if strict {
            let properties = match remove_keys(
                &Value::Object(self.input_properties.clone()),
                STRICT_MODE_STRIPPED_KEYS,
            ) {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            let required = properties.keys().cloned().collect();
            (properties, required)
        } else {
            (self.input_properties.clone(), self.required_parameters.clone())
        };

        OpenAiTool {
            tool_type: "function".to_string(),
            function: OpenAiFunction {
                name: self.name.clone(),
                description: self.description.clone(),
                parameters: OpenAiParameters {
                    schema_type: "object".to_string(),
                    additional_properties: !strict,
                    properties,
                    required,
                },
                strict,
            },
        }
    }

    /// Export as an Anthropic tool
    pub fn to_anthropic(&self, use_cache_control: bool) -> AnthropicTool {
        AnthropicTool {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: AnthropicInputSchema {
                schema_type: "object".to_string(),
                properties: self.input_properties.clone(),
                required: self.required_parameters.clone(),
            },
            cache_control: use_cache_control.then(CacheControl::ephemeral),
        }
    }

    /// Export as a Bedrock tool spec
    pub fn to_bedrock(&self) -> BedrockTool {
        BedrockTool {
            tool_spec: BedrockToolSpec {
                name: self.name.clone(),
                description: self.description.clone(),
                input_schema: BedrockInputSchema {
                    json: BedrockJsonSchema {
                        schema_type: "object".to_string(),
                        properties: self.input_properties.clone(),
                        required: self.required_parameters.clone(),
                    },
                },
            },
        }
    }

    /// Export as a Gemini function declaration
    pub fn to_gemini(&self) -> GeminiFunctionDeclaration {
        let parameters = (!self.input_properties.is_empty()).then(|| GeminiParameters {
            schema_type: "object".to_string(),
            properties: self.input_properties.clone(),
            required: self.required_parameters.clone(),
        });

        GeminiFunctionDeclaration {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters,
            response: None,
        }
    }
}
