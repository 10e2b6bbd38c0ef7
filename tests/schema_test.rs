//! Integration tests for schema derivation from parameter declarations

use pretty_assertions::assert_eq;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use toolsmith::prelude::*;
use toolsmith::tools::{Param, SchemaError, ToolErrorKind};
use toolsmith::ToolEnum;

#[derive(Debug, Clone, Copy, ToolEnum)]
#[tool_enum(crate = "toolsmith")]
enum Direction {
    North,
    South,
    EastBound,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize, JsonSchema)]
struct Item {
    sku: String,
    quantity: u32,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize, JsonSchema)]
struct Order {
    id: String,
    item: Item,
}

fn properties(tool: &ToolDefinition) -> Value {
    Value::Object(tool.schema().input_properties.clone())
}

#[test]
fn test_database_lookup_schema() {
    let tool = ToolDefinition::builder("lookup_rows")
        .doc(
            "Look rows up in the warehouse database.

Args:
    database: Connection to use.
    table (str): The table to read.
    limit: Maximum number of rows
        to return.
    columns: Columns to include.
    direction: Which way to scan.",
        )
        .param("database", ParamType::dict())
        .param("table", ParamType::of::<String>())
        .param_with_default("limit", ParamType::of::<u32>(), 100)
        .param_with_default("columns", ParamType::infer::<Vec<String>>(), json!([]))
        .param_with_default("direction", ParamType::infer::<Direction>(), "north")
        .inject("database")
        .build(|_| Ok("ok"))
        .unwrap();

    assert_eq!(tool.description(), "Look rows up in the warehouse database.");
    assert_eq!(tool.schema().required_parameters, vec!["table".to_string()]);
    assert_eq!(
        properties(&tool),
        json!({
            "table": {"type": "string", "description": "The table to read."},
            "limit": {
                "type": "integer",
                "description": "Maximum number of rows to return.",
                "default": 100
            },
            "columns": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Columns to include."
            },
            "direction": {
                "type": "string",
                "enum": ["north", "south", "east_bound"],
                "description": "Which way to scan.",
                "default": "north"
            }
        })
    );
}

#[test]
fn test_optional_and_literal_parameters() {
    let tool = ToolDefinition::builder("format_report")
        .param_with_default("title", ParamType::infer::<Option<String>>(), Value::Null)
        .param("style", ParamType::literal(["brief", "full"]))
        .param("level", ParamType::literal([1, 2, 3]))
        .build(|_| Ok("ok"))
        .unwrap();

    assert_eq!(
        properties(&tool),
        json!({
            "title": {
                "anyOf": [{"type": "string"}, {"type": "null"}],
                "default": "null"
            },
            "style": {"type": "string", "enum": ["brief", "full"]},
            "level": {"type": "integer", "enum": [1, 2, 3]}
        })
    );
    assert_eq!(
        tool.schema().required_parameters,
        vec!["style".to_string(), "level".to_string()]
    );
}

#[test]
fn test_model_definitions_are_hoisted() {
    let tool = ToolDefinition::builder("place_order")
        .param("order", ParamType::model::<Order>())
        .param("backup", ParamType::optional(ParamType::model::<Order>()))
        .build(|_| Ok("ok"))
        .unwrap();

    let properties = &tool.schema().input_properties;
    let order = &properties["order"];
    assert_eq!(order["type"], "object");
    assert!(order.get("$schema").is_none());
    assert!(order.get("$defs").is_none());
    assert!(order["properties"]["id"].is_object());
    assert!(order["properties"]["item"].to_string().contains("Item"));

    let backup = &properties["backup"]["anyOf"];
    assert_eq!(backup[1], json!({"type": "null"}));
    assert!(backup[0].get("$defs").is_none());

    let definitions = properties["definitions"].as_object().unwrap();
    assert!(definitions.contains_key("Item"));
    assert_eq!(definitions.len(), 1);
}

#[test]
fn test_unmapped_type_is_reported() {
    struct Connection;

    let err = ToolDefinition::builder("connect")
        .param("conn", ParamType::of::<Connection>())
        .build(|_| Ok("ok"))
        .unwrap_err();

    assert_eq!(err.kind(), ToolErrorKind::Configuration);
    let message = err.to_string();
    assert!(message.contains("connect"));
    assert!(message.contains("conn"));
    assert!(message.contains("Unmapped type"));

    let source = std::error::Error::source(&err)
        .and_then(|source| source.downcast_ref::<SchemaError>())
        .unwrap();
    assert!(matches!(source, SchemaError::UnmappedType { .. }));
}

#[test]
fn test_additional_parameters_are_applied_last() {
    let tool = ToolDefinition::builder("rate")
        .param_with(
            Param::new("score", ParamType::of::<f64>()).description("How good it was."),
        )
        .additional_parameter("score", json!({"minimum": 0, "maximum": 5, "type": "number"}))
        .build(|_| Ok("ok"))
        .unwrap();

    assert_eq!(
        properties(&tool),
        json!({
            "score": {
                "type": "number",
                "description": "How good it was.",
                "minimum": 0,
                "maximum": 5
            }
        })
    );

    let err = ToolDefinition::builder("rate")
        .param("score", ParamType::of::<f64>())
        .additional_parameter("score", json!("not an object"))
        .build(|_| Ok("ok"))
        .unwrap_err();
    assert_eq!(err.kind(), ToolErrorKind::Configuration);
}

#[test]
fn test_vendor_exports() {
    let tool = ToolDefinition::builder("greet")
        .doc("Greet someone.\n\nArgs:\n    name: Who to greet.")
        .param("name", ParamType::of::<String>())
        .param_with_default("shout", ParamType::of::<bool>(), false)
        .build(|_| Ok("ok"))
        .unwrap();
    let schema = tool.schema();

    let strict = serde_json::to_value(schema.to_openai(true)).unwrap();
    assert_eq!(
        strict,
        json!({
            "type": "function",
            "function": {
                "name": "greet",
                "description": "Greet someone.",
                "parameters": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "name": {"type": "string", "description": "Who to greet."},
                        "shout": {"type": "boolean"}
                    },
                    "required": ["name", "shout"]
                },
                "strict": true
            }
        })
    );

    let anthropic = serde_json::to_value(schema.to_anthropic(true)).unwrap();
    assert_eq!(anthropic["input_schema"]["required"], json!(["name"]));
    assert_eq!(anthropic["cache_control"], json!({"type": "ephemeral"}));

    let bedrock = serde_json::to_value(schema.to_bedrock()).unwrap();
    assert_eq!(bedrock["toolSpec"]["inputSchema"]["json"]["type"], "object");
    assert_eq!(bedrock["toolSpec"]["name"], "greet");
}
