//! Turn Rust functions into tools a language model can call
//!
//! A [`ToolDefinition`] pairs a function with its declared parameters and a
//! docstring. Building it derives a JSON schema for the parameters the model
//! fills in; parameters the host controls are injected at call time and never
//! appear in the schema. A [`ToolLibrary`] groups definitions, exports them in
//! each vendor's format and can expose a `batch_tool` that runs several calls
//! in one round trip.
//!
//! ```rust,ignore
//! let square = ToolDefinition::builder("square")
//!     .doc("Square a number.\n\nArgs:\n    x: The number to square.")
//!     .param("x", ParamType::of::<i64>())
//!     .user_message("Squaring {{x}}")
//!     .build(|args| Ok(json!(args.get::<i64>("x")?.pow(2))))?;
//!
//! let library = ToolLibrary::from_tools([square], true)?;
//! let tools = library.to_openai(false);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod args;
pub mod batch;
pub mod config;
pub mod definition;
pub mod definitions;
pub mod docstring;
pub mod error;
pub mod library;
pub mod output;
pub mod runner;
pub mod schema;
pub mod type_map;

pub use args::{HostObject, HostParams, HostValue, ToolArgs};
pub use batch::{dispatch, invocations, BATCH_TOOL_NAME};
pub use definition::{Param, ToolDefinition, ToolDefinitionBuilder, ToolFunction};
pub use definitions::{hoist_definitions, hoist_property_definitions};
pub use docstring::{inject_into_docstring, parse_docstring, render_template, Docstring};
pub use error::{Result, SchemaError, ToolError, ToolErrorKind};
pub use library::ToolLibrary;
pub use output::{display_value, ToolOutput, ToolStream};
pub use runner::{BatchJob, BatchRunner, SequentialRunner, ThreadedRunner};
pub use schema::{ParameterDescriptor, SchemaBuilder};
pub use type_map::TypeMap;
