//! Example of building a tool library, exporting it and running a batch locally

use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use toolsmith::config;
use toolsmith::prelude::*;
use toolsmith::tools::{invocations, ThreadedRunner, BATCH_TOOL_NAME};
use toolsmith::ToolEnum;

#[derive(Debug, Clone, Copy, ToolEnum)]
#[tool_enum(crate = "toolsmith")]
enum Unit {
    Celsius,
    Fahrenheit,
}

/// Readings the host owns; the model never sees this parameter
struct WeatherStation {
    readings: Mutex<HashMap<String, f64>>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Toolsmith Batch Tool Demo ===\n");

    let temperature = ToolDefinition::builder("get_temperature")
        .doc(
            "Current temperature in a city.

Args:
    station: Weather station handle.
    city: City to look up.
    unit: Unit of the result.",
        )
        .param("station", ParamType::dict())
        .param("city", ParamType::of::<String>())
        .param_with_default("unit", ParamType::infer::<Unit>(), "celsius")
        .inject("station")
        .group("weather")
        .user_message("Checking the weather in {{city}}")
        .build(|args| {
            let station = args.object::<WeatherStation>("station")?;
            let city: String = args.get("city")?;
            let unit: String = args.get("unit")?;
            let celsius = station
                .readings
                .lock()
                .map_err(|_| ToolError::execution("station lock poisoned"))?
                .get(&city)
                .copied()
                .ok_or_else(|| ToolError::execution(format!("No reading for {city}")))?;
            let value = if unit == "fahrenheit" {
                celsius * 9.0 / 5.0 + 32.0
            } else {
                celsius
            };
            Ok(json!(format!("{value:.1} {unit}")))
        })?;

    let forecast = ToolDefinition::builder("forecast")
        .doc("Hourly forecast.\n\nArgs:\n    hours: How many hours ahead.")
        .param_with_default("hours", ParamType::of::<u32>(), 3)
        .group("weather")
        .build(|args| {
            let hours: u32 = args.get("hours")?;
            Ok(ToolOutput::stream(
                (1..=hours).map(|h| format!("+{h}h: partly cloudy")),
            ))
        })?;

    let library = ToolLibrary::from_tools([temperature, forecast], true)?;

    println!("OpenAI tools:");
    println!("{}\n", serde_json::to_string_pretty(&library.to_openai(true))?);

    let station = WeatherStation {
        readings: Mutex::new(HashMap::from([
            ("Lisbon".to_string(), 21.5),
            ("Oslo".to_string(), 4.0),
        ])),
    };
    let host = HostParams::new().with_object("station", station);

    config::set_batch_runner(ThreadedRunner::default());

    let batch = library.get_tool_from_name(BATCH_TOOL_NAME)?;
    let (output, message) = batch.invoke_with_message(
        invocations([
            ("get_temperature", json!({"city": "Lisbon"})),
            ("get_temperature", json!({"city": "Oslo", "unit": "fahrenheit"})),
            ("get_temperature", json!({"city": "Atlantis"})),
            ("forecast", json!({"hours": 2})),
        ]),
        &host,
    )?;

    if let Some(message) = message {
        println!("Shown to the user:\n{message}\n");
    }
    println!("Returned to the model:\n{}", output.into_value()?.as_str().unwrap_or_default());

    Ok(())
}
