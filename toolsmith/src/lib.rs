//! Toolsmith - turn Rust functions into tools for language models
//!
//! Declare a function's parameters once and get tool definitions for OpenAI,
//! Anthropic, Bedrock and Gemini, plus a call path that merges the model's
//! arguments with values only the host controls.
//!
//! # Features
//!
//! - **Schema derivation**: JSON schemas from parameter types and docstrings
//! - **Injected parameters**: host-supplied values the model never sees
//! - **Tool libraries**: grouping, subsetting and vendor exports
//! - **Batching**: a `batch_tool` that runs several calls in one round trip
//! - **Extensible types**: global or per-tool type and format mappings
//!
//! # Quick Start
//!
//! ```
//! # #[cfg(feature = "tools")]
//! # fn main() -> Result<(), toolsmith::tools::ToolError> {
//! use serde_json::json;
//! use toolsmith::prelude::*;
//!
//! let square = ToolDefinition::builder("square")
//!     .doc("Square a number.\n\nArgs:\n    x: The number to square.")
//!     .param("x", ParamType::of::<i64>())
//!     .build(|args| Ok(json!(args.get::<i64>("x")?.pow(2))))?;
//!
//! let library = ToolLibrary::from_tools([square], false)?;
//! assert_eq!(library.to_openai(true)[0].function.name, "square");
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "tools"))]
//! # fn main() {}
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export core types
pub use toolsmith_core::*;

// Re-export derive macro when feature is enabled.
// Derives in crates using only this facade need `#[tool_enum(crate = "toolsmith")]`.
#[cfg(feature = "derive")]
pub use toolsmith_core::DeriveToolEnum as ToolEnum;

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub mod tools {
    //! Tool definitions, libraries and batch dispatch
    pub use toolsmith_tools::*;
}

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use toolsmith_tools::config;

/// Prelude module for convenient imports
pub mod prelude {
    pub use toolsmith_core::{Describe, JsonType, NativeType, ParamType, ToolSchema};

    #[cfg(feature = "tools")]
    pub use toolsmith_tools::{
        HostParams, Param, ToolArgs, ToolDefinition, ToolError, ToolLibrary, ToolOutput,
        TypeMap,
    };
}
