//! Core types for the toolsmith tool library
//!
//! This crate holds the plain data shared by the rest of the workspace:
//! declared parameter types, the vendor-neutral [`ToolSchema`] and the wire
//! formats it exports to. It has no logic beyond those conversions.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod json;
pub mod types;

// Re-export commonly used items
pub use json::remove_keys;
pub use types::{
    anthropic::{AnthropicInputSchema, AnthropicTool, CacheControl},
    bedrock::{BedrockInputSchema, BedrockJsonSchema, BedrockTool, BedrockToolConfig, BedrockToolSpec},
    gemini::{GeminiFunctionDeclaration, GeminiParameters, GeminiTool},
    native::{JsonType, NativeType},
    openai::{OpenAiFunction, OpenAiParameters, OpenAiTool},
    param::{Describe, ModelSchema, ParamType, ToolEnum},
    schema::ToolSchema,
};

// Re-export the derive macro when the feature is enabled
#[cfg(feature = "derive")]
pub use toolsmith_derive::ToolEnum as DeriveToolEnum;

#[doc(hidden)]
pub mod __private {
    //! Paths used by generated code
    pub use serde_json::Value;
}
