//! The `batch_tool`: several tool calls in one model round trip
//!
//! The model sends a list of `{name, arguments}` pairs where `arguments` is a
//! JSON-encoded string. Every pair becomes one job on the configured
//! [`BatchRunner`](crate::runner::BatchRunner); the report has one line per
//! result, numbered by the pair's position in the request:
//!
//! ```text
//! #0 (square) Result: 4
//! #1 (square) Result: 9
//! #2 (errors) Result (note: errored): This is an error
//! ```

use crate::args::{HostParams, ToolArgs};
use crate::config;
use crate::definition::{ToolDefinition, ToolDefinitionBuilder, ToolFunction, ToolKind};
use crate::error::Result;
use crate::library::ToolLibrary;
use crate::output::{display_value, ToolOutput};
use crate::runner::{panic_message, BatchJob};
use serde_json::{json, Map, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use toolsmith_core::{ParamType, ToolSchema};
use tracing::{debug, warn};

/// Reserved name of the batch tool
pub const BATCH_TOOL_NAME: &str = "batch_tool";

/// Injected parameter carrying the calling library
pub const TOOL_LIBRARY_PARAM: &str = "tool_library";

/// Injected parameter carrying the host parameters of the batch call
pub const HARDSET_PARAMETERS_PARAM: &str = "hardset_parameters";

const DESCRIPTION: &str = "Execute multiple tool calls simultaneously for improved efficiency";

pub(crate) const NOT_A_STRING: &str = "arguments must be a JSON-encoded string";

fn batch_schema() -> ToolSchema {
    let mut schema = ToolSchema::new(BATCH_TOOL_NAME, DESCRIPTION);
    schema.input_properties.insert(
        "invocations".to_string(),
        json!({
            "type": "array",
            "description": "The tool calls to execute in parallel",
            "items": {
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "The name of the tool to invoke"
                    },
                    "arguments": {
                        "type": "string",
                        "description": "The arguments to the tool as a JSON string"
                    }
                },
                "required": ["name", "arguments"]
            }
        }),
    );
    schema.required_parameters.push("invocations".to_string());
    schema
}

/// A detached batch tool; it only works once a library adopts it
pub(crate) fn batch_tool_definition() -> ToolDefinition {
    let builder = ToolDefinitionBuilder::new(BATCH_TOOL_NAME)
        .doc(DESCRIPTION)
        .param("invocations", ParamType::array(ParamType::dict()))
        .inject(TOOL_LIBRARY_PARAM)
        .inject(HARDSET_PARAMETERS_PARAM);
    let function: ToolFunction =
        Arc::new(|args: ToolArgs| run_batch(&args).map(ToolOutput::from));
    ToolDefinition::with_schema(builder, batch_schema(), ToolKind::Batch, function)
}

fn run_batch(args: &ToolArgs) -> Result<String> {
    let library = args.object::<ToolLibrary>(TOOL_LIBRARY_PARAM)?;
    let hardset = args.object::<HostParams>(HARDSET_PARAMETERS_PARAM)?;
    let invocations: Vec<Value> = args.get("invocations")?;
    Ok(dispatch(&library, &hardset, invocations))
}

/// Run `invocations` against `library` and format the report
pub fn dispatch(library: &ToolLibrary, hardset: &HostParams, invocations: Vec<Value>) -> String {
    debug!(invocations = invocations.len(), "Dispatching batch");

    let hardset = Arc::new(hardset.clone());
    let jobs: Vec<BatchJob> = invocations
        .into_iter()
        .enumerate()
        .map(|(index, invocation)| {
            let library = library.clone();
            let hardset = Arc::clone(&hardset);
            Box::new(move || run_invocation(index, &invocation, &library, &hardset)) as BatchJob
        })
        .collect();

    config::batch_runner()
        .run(jobs)
        .into_iter()
        .filter(|result| !result.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn run_invocation(
    index: usize,
    invocation: &Value,
    library: &ToolLibrary,
    hardset: &HostParams,
) -> String {
    let Some(name) = invocation.get("name").and_then(Value::as_str) else {
        return format!("#{index} (Unknown Tool) Error: Invocation missing 'name'.");
    };

    let raw = match invocation.get("arguments") {
        None => "{}",
        Some(Value::String(raw)) => raw.as_str(),
        Some(other) => {
            return format!(
                "#{index} ({name}) Error: Could not parse arguments '{other}': {NOT_A_STRING}"
            )
        }
    };
    let arguments = match config::deserialize_batch_arguments(raw) {
        Ok(arguments) => arguments,
        Err(err) => {
            return format!("#{index} ({name}) Error: Could not parse arguments '{raw}': {err}")
        }
    };

    let tool = match library.get_tool_from_name(name) {
        Ok(tool) => tool,
        Err(err) => return format!("#{index} ({name}) Error: {err}"),
    };

    catch_unwind(AssertUnwindSafe(|| {
        match tool.invoke(arguments, hardset) {
            Ok(ToolOutput::Single(value)) => {
                format!("#{index} ({name}) Result: {}", display_value(&value))
            }
            Ok(ToolOutput::Stream(items)) => stream_lines(index, name, items),
            Err(err) => {
                warn!(index, tool = %name, error = %err, "Batch invocation failed");
                format!("#{index} ({name}) Result (note: errored): {err}")
            }
        }
    }))
    .unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        warn!(index, tool = %name, error = %message, "Batch invocation panicked");
        format!("#{index} ({name}) Result (note: errored): Tool panicked: {message}")
    })
}

fn stream_lines(
    index: usize,
    name: &str,
    items: impl Iterator<Item = Result<Value>>,
) -> String {
    let mut lines = Vec::new();
    let mut count = 0;
    for item in items {
        match item {
            Ok(value) => {
                lines.push(format!(
                    "#{index} ({name}) Stream Result {count}: {}",
                    display_value(&value)
                ));
                count += 1;
            }
            Err(err) => {
                warn!(index, tool = %name, error = %err, "Batch stream failed");
                lines.push(format!("#{index} ({name}) Stream Error: {err}"));
                return lines.join("\n");
            }
        }
    }

    if lines.is_empty() {
        return format!("#{index} ({name}) Stream (empty)");
    }
    lines.join("\n")
}

/// Build the arguments of a batch call from `(tool, arguments)` pairs
pub fn invocations<'a>(calls: impl IntoIterator<Item = (&'a str, Value)>) -> Map<String, Value> {
    let invocations: Vec<Value> = calls
        .into_iter()
        .map(|(name, arguments)| json!({"name": name, "arguments": arguments.to_string()}))
        .collect();
    let mut model = Map::new();
    model.insert("invocations".to_string(), Value::Array(invocations));
    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::runner::ThreadedRunner;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    fn library() -> ToolLibrary {
        let square = ToolDefinition::builder("square")
            .param("x", ParamType::of::<i64>())
            .user_message("Squaring {{x}}")
            .build(|args| {
                let x: i64 = args.get("x")?;
                Ok(json!(x * x))
            })
            .unwrap();
        let errors = ToolDefinition::builder("errors")
            .build(|_| -> Result<Value> { Err(ToolError::execution("This is an error")) })
            .unwrap();
        let count = ToolDefinition::builder("count")
            .param("n", ParamType::of::<u32>())
            .build(|args| {
                let n: u32 = args.get("n")?;
                Ok(ToolOutput::stream((1..=n).map(|i| format!("Num: {i}"))))
            })
            .unwrap();
        let flaky = ToolDefinition::builder("flaky")
            .build(|_| {
                Ok(ToolOutput::try_stream(vec![
                    Ok(json!("first")),
                    Err(ToolError::execution("stream broke")),
                    Ok(json!("never")),
                ]))
            })
            .unwrap();

        ToolLibrary::from_tools([square, errors, count, flaky], true).unwrap()
    }

    fn call(library: &ToolLibrary, model: Map<String, Value>) -> String {
        library
            .call_tool(BATCH_TOOL_NAME, model, &HostParams::new())
            .unwrap()
            .into_value()
            .map(|value| display_value(&value))
            .unwrap()
    }

    #[test]
    #[serial]
    fn test_results_and_errors() {
        let library = library();
        let report = call(
            &library,
            invocations([
                ("square", json!({"x": 2})),
                ("square", json!({"x": 3})),
                ("errors", json!({})),
            ]),
        );
        assert_eq!(
            report,
            "#0 (square) Result: 4\n#1 (square) Result: 9\n#2 (errors) Result (note: errored): This is an error"
        );
    }

    #[test]
    #[serial]
    fn test_malformed_invocations() {
        let library = library();
        let mut model = Map::new();
        model.insert(
            "invocations".to_string(),
            json!([
                {"arguments": "{}"},
                {"name": "square", "arguments": "not json"},
                {"name": "missing", "arguments": "{}"},
                {"name": "errors"}
            ]),
        );

        let report = call(&library, model);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "#0 (Unknown Tool) Error: Invocation missing 'name'.");
        assert!(lines[1].starts_with("#1 (square) Error: Could not parse arguments 'not json': "));
        assert_eq!(lines[2], "#2 (missing) Error: Tool not found: missing");
        assert_eq!(lines[3], "#3 (errors) Result (note: errored): This is an error");
    }

    #[test]
    #[serial]
    fn test_stream_results() {
        let library = library();
        let report = call(
            &library,
            invocations([
                ("count", json!({"n": 2})),
                ("count", json!({"n": 0})),
                ("flaky", json!({})),
            ]),
        );
        assert_eq!(
            report,
            "#0 (count) Stream Result 0: Num: 1\n\
             #0 (count) Stream Result 1: Num: 2\n\
             #1 (count) Stream (empty)\n\
             #2 (flaky) Stream Result 0: first\n\
             #2 (flaky) Stream Error: stream broke"
        );
    }

    #[test]
    #[serial]
    fn test_threaded_runner_keeps_order() {
        config::set_batch_runner(ThreadedRunner::new(4));
        let library = library();
        let calls: Vec<_> = (1..=8).map(|x| ("square", json!({"x": x}))).collect();
        let report = call(&library, invocations(calls));
        config::unset_batch_runner();

        let expected: Vec<String> = (1..=8)
            .map(|x| format!("#{} (square) Result: {}", x - 1, x * x))
            .collect();
        assert_eq!(report, expected.join("\n"));
    }

    #[test]
    #[serial]
    fn test_threaded_runner_with_streams_and_panics() {
        let library = library();
        library
            .add_tool(
                ToolDefinition::builder("explodes")
                    .build(|_| -> Result<Value> { panic!("sub-tool exploded") })
                    .unwrap(),
            )
            .unwrap();

        config::set_batch_runner(ThreadedRunner::new(2));
        let report = call(
            &library,
            invocations([
                ("square", json!({"x": 2})),
                ("explodes", json!({})),
                ("count", json!({"n": 2})),
                ("flaky", json!({})),
            ]),
        );
        config::unset_batch_runner();

        assert_eq!(
            report,
            "#0 (square) Result: 4\n\
             #1 (explodes) Result (note: errored): Tool panicked: sub-tool exploded\n\
             #2 (count) Stream Result 0: Num: 1\n\
             #2 (count) Stream Result 1: Num: 2\n\
             #3 (flaky) Stream Result 0: first\n\
             #3 (flaky) Stream Error: stream broke"
        );
    }

    #[test]
    #[serial]
    fn test_non_string_arguments_are_rejected() {
        let library = library();
        let mut model = Map::new();
        model.insert(
            "invocations".to_string(),
            json!([{"name": "square", "arguments": {"x": 2}}]),
        );
        assert_eq!(
            call(&library, model.clone()),
            format!("#0 (square) Error: Could not parse arguments '{{\"x\":2}}': {NOT_A_STRING}")
        );

        let batch = library.get_tool_from_name(BATCH_TOOL_NAME).unwrap();
        assert_eq!(batch.render_message(&model, &HostParams::new()).unwrap(), None);
    }

    #[test]
    #[serial]
    fn test_batch_messages() {
        let library = library();
        let batch = library.get_tool_from_name(BATCH_TOOL_NAME).unwrap();

        let message = batch
            .render_message(&invocations([("square", json!({"x": 2}))]), &HostParams::new())
            .unwrap();
        assert_eq!(message.as_deref(), Some("Squaring 2"));

        let message = batch
            .render_message(
                &invocations([
                    ("square", json!({"x": 2})),
                    ("errors", json!({})),
                    ("missing", json!({})),
                    ("square", json!({"x": 3})),
                ]),
                &HostParams::new(),
            )
            .unwrap();
        assert_eq!(message.as_deref(), Some("Squaring 2\nSquaring 3"));

        let message = batch
            .render_message(&invocations([("errors", json!({}))]), &HostParams::new())
            .unwrap();
        assert_eq!(message, None);
    }

    #[test]
    #[serial]
    fn test_hardset_parameters_reach_sub_tools() {
        let library = ToolLibrary::with_batch_tool(true);
        library
            .add_tool(
                ToolDefinition::builder("greet")
                    .param("greeting", ParamType::of::<String>())
                    .inject("user")
                    .build(|args| {
                        let greeting: String = args.get("greeting")?;
                        let user: String = args.get("user")?;
                        Ok(format!("{greeting}, {user}"))
                    })
                    .unwrap(),
            )
            .unwrap();

        let host = HostParams::new().with_value("user", "ada");
        let report = library
            .call_tool(
                BATCH_TOOL_NAME,
                invocations([("greet", json!({"greeting": "hello"}))]),
                &host,
            )
            .unwrap()
            .into_value()
            .unwrap();
        assert_eq!(report, json!("#0 (greet) Result: hello, ada"));
    }

    #[test]
    fn test_batch_schema() {
        let schema = batch_schema();
        assert_eq!(schema.description, DESCRIPTION);
        assert_eq!(schema.required_parameters, vec!["invocations"]);
        assert_eq!(
            schema.input_properties["invocations"]["items"]["required"],
            json!(["name", "arguments"])
        );
    }
}
