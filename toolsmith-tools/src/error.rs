//! Error types for schema derivation and tool execution

use std::error::Error as StdError;
use thiserror::Error;

/// Result type for tool operations
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors raised while turning a declared parameter type into JSON schema
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// No JSON type is configured for a native type
    #[error("Unmapped type: {type_name}. Add a mapping for it with `config::update_type_map`")]
    UnmappedType {
        /// Name of the unmapped type
        type_name: String,
    },

    /// An enum or literal declaration without any values
    #[error("Type {type_name} declares no values")]
    EmptyEnum {
        /// Name of the declared type
        type_name: String,
    },

    /// A structured type could not produce its schema
    #[error("Could not generate a schema for {type_name}: {source}")]
    Introspection {
        /// Name of the structured type
        type_name: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// A structured type produced something other than a JSON object
    #[error("Schema for {type_name} is not a JSON object")]
    InvalidModelSchema {
        /// Name of the structured type
        type_name: String,
    },

    /// A parameter name collides with the hoisted definitions block
    #[error("Parameter name '{parameter}' is reserved for shared schema definitions")]
    ReservedName {
        /// Parameter name
        parameter: String,
    },

    /// Extra schema keys for a parameter were not given as a JSON object
    #[error("Additional schema keys for '{parameter}' must be a JSON object")]
    InvalidOverride {
        /// Parameter name
        parameter: String,
    },
}

/// Error type for tool operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ToolError {
    /// A parameter could not be turned into schema when the tool was built
    #[error("Error building tool '{tool}', parameter '{parameter}': {source}")]
    Configuration {
        /// Tool name
        tool: String,
        /// Parameter name
        parameter: String,
        /// Underlying schema error
        #[source]
        source: SchemaError,
    },

    /// A tool with the same name is already registered
    #[error("Tool already registered: {name}")]
    DuplicateTool {
        /// Tool name
        name: String,
    },

    /// Tool not found in the library
    #[error("Tool not found: {name}")]
    NotFound {
        /// Tool name that was not found
        name: String,
    },

    /// Tool group not found in the library
    #[error("Tool group not found: {group}")]
    UnknownGroup {
        /// Group name that was not found
        group: String,
    },

    /// The host did not supply a parameter the tool injects
    #[error("Tool '{tool}' requires injected parameter '{parameter}', which was not supplied")]
    MissingInjectedParameter {
        /// Tool name
        tool: String,
        /// Injected parameter name
        parameter: String,
    },

    /// Arguments could not be read as the declared types
    #[error("Invalid arguments for tool '{tool}': {message}")]
    InvalidArguments {
        /// Tool name
        tool: String,
        /// Error message
        message: String,
    },

    /// The tool function itself failed
    #[error("{message}")]
    Execution {
        /// Error message
        message: String,
        /// Underlying error if available
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// The batch tool was invoked without belonging to a library
    #[error("Tool '{tool}' is not attached to a tool library")]
    LibraryUnavailable {
        /// Tool name
        tool: String,
    },

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// Tool construction failed
    Configuration,
    /// Duplicate registration
    DuplicateTool,
    /// Tool not found
    NotFound,
    /// Group not found
    UnknownGroup,
    /// Injected parameter missing
    MissingInjectedParameter,
    /// Invalid arguments
    InvalidArguments,
    /// Execution failed
    Execution,
    /// Tool not attached to a library
    LibraryUnavailable,
    /// JSON error
    Json,
}

impl ToolError {
    /// Get the error kind
    pub fn kind(&self) -> ToolErrorKind {
        match self {
            Self::Configuration { .. } => ToolErrorKind::Configuration,
            Self::DuplicateTool { .. } => ToolErrorKind::DuplicateTool,
            Self::NotFound { .. } => ToolErrorKind::NotFound,
            Self::UnknownGroup { .. } => ToolErrorKind::UnknownGroup,
            Self::MissingInjectedParameter { .. } => ToolErrorKind::MissingInjectedParameter,
            Self::InvalidArguments { .. } => ToolErrorKind::InvalidArguments,
            Self::Execution { .. } => ToolErrorKind::Execution,
            Self::LibraryUnavailable { .. } => ToolErrorKind::LibraryUnavailable,
            Self::Json(_) => ToolErrorKind::Json,
        }
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            source: None,
        }
    }

    /// Create an execution error wrapping an underlying error
    pub fn execution_with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Execution {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid arguments error
    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ToolError::not_found("square");
        assert_eq!(err.to_string(), "Tool not found: square");

        let err = ToolError::execution("This is an error");
        assert_eq!(err.to_string(), "This is an error");

        let err = ToolError::MissingInjectedParameter {
            tool: "lookup".to_string(),
            parameter: "db".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Tool 'lookup' requires injected parameter 'db', which was not supplied"
        );
    }

    #[test]
    fn test_configuration_error_carries_schema_error() {
        let err = ToolError::Configuration {
            tool: "upload".to_string(),
            parameter: "payload".to_string(),
            source: SchemaError::UnmappedType {
                type_name: "alloc::vec::Vec<u8>".to_string(),
            },
        };

        let message = err.to_string();
        assert!(message.contains("upload"));
        assert!(message.contains("payload"));
        assert!(message.contains("Unmapped type: alloc::vec::Vec<u8>"));
        assert!(err.source().is_some());
        assert_eq!(err.kind(), ToolErrorKind::Configuration);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ToolError::not_found("x").kind(), ToolErrorKind::NotFound);
        assert_eq!(
            ToolError::invalid_arguments("x", "bad").kind(),
            ToolErrorKind::InvalidArguments
        );

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ToolError::from(json_err).kind(), ToolErrorKind::Json);
    }

    #[test]
    fn test_execution_with_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = ToolError::execution_with_source("write failed", io);
        assert_eq!(err.to_string(), "write failed");
        assert_eq!(err.source().map(ToString::to_string), Some("disk full".to_string()));
    }
}
