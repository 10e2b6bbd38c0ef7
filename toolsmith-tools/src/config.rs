//! Process-wide configuration
//!
//! Tools built without their own [`TypeMap`] read the global one below, and
//! every batch call runs through the global [`BatchRunner`] and batch argument
//! deserializer. Settings last for the life of the process.
//!
//! Updating the type mappings while other threads build tools is safe, but
//! which mapping those builds see is unspecified; configure before building.

use crate::error::ToolError;
use crate::runner::{BatchRunner, SequentialRunner};
use crate::type_map::TypeMap;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::{Arc, LazyLock};
use toolsmith_core::{JsonType, NativeType};
use tracing::debug;

/// Decodes the `arguments` string of one batch invocation
pub type ArgumentDeserializer =
    Arc<dyn Fn(&str) -> Result<Map<String, Value>, ToolError> + Send + Sync>;

static TYPE_MAP: LazyLock<RwLock<TypeMap>> = LazyLock::new(|| RwLock::new(TypeMap::new()));

static BATCH_RUNNER: LazyLock<RwLock<Option<Arc<dyn BatchRunner>>>> =
    LazyLock::new(|| RwLock::new(None));

static ARGUMENT_DESERIALIZER: LazyLock<RwLock<Option<ArgumentDeserializer>>> =
    LazyLock::new(|| RwLock::new(None));

/// Snapshot of the global type mappings
pub fn type_map() -> TypeMap {
    TYPE_MAP.read().clone()
}

/// Add or override global type mappings.
///
/// # Example
///
/// ```rust,ignore
/// struct ObjectId;
/// config::update_type_map([(NativeType::of::<ObjectId>(), JsonType::String)]);
/// ```
pub fn update_type_map(entries: impl IntoIterator<Item = (NativeType, JsonType)>) {
    let mut map = TYPE_MAP.write();
    map.update_types(entries);
    debug!("Updated global type map");
}

/// Add or override global format mappings
pub fn update_format_map<S: Into<String>>(entries: impl IntoIterator<Item = (NativeType, S)>) {
    let mut map = TYPE_MAP.write();
    map.update_formats(entries);
    debug!("Updated global format map");
}

/// Restore the seeded global type mappings
pub fn reset_type_map() {
    TYPE_MAP.write().reset_types();
    debug!("Reset global type map");
}

/// Restore the seeded global format mappings
pub fn reset_format_map() {
    TYPE_MAP.write().reset_formats();
    debug!("Reset global format map");
}

/// Run batch jobs with `runner` from now on
pub fn set_batch_runner(runner: impl BatchRunner + 'static) {
    *BATCH_RUNNER.write() = Some(Arc::new(runner));
    debug!("Installed custom batch runner");
}

/// Go back to running batch jobs sequentially
pub fn unset_batch_runner() {
    *BATCH_RUNNER.write() = None;
    debug!("Removed custom batch runner");
}

/// The batch runner currently in effect
pub fn batch_runner() -> Arc<dyn BatchRunner> {
    BATCH_RUNNER
        .read()
        .clone()
        .unwrap_or_else(|| Arc::new(SequentialRunner))
}

/// Decode batch invocation arguments with `deserializer` from now on
pub fn set_batch_argument_deserializer<F>(deserializer: F)
where
    F: Fn(&str) -> Result<Map<String, Value>, ToolError> + Send + Sync + 'static,
{
    *ARGUMENT_DESERIALIZER.write() = Some(Arc::new(deserializer));
    debug!("Installed custom batch argument deserializer");
}

/// Go back to decoding batch invocation arguments as JSON objects
pub fn reset_batch_argument_deserializer() {
    *ARGUMENT_DESERIALIZER.write() = None;
}

/// Decode the `arguments` string of a batch invocation
pub fn deserialize_batch_arguments(raw: &str) -> Result<Map<String, Value>, ToolError> {
    let custom = ARGUMENT_DESERIALIZER.read().clone();
    match custom {
        Some(deserializer) => deserializer(raw),
        None => Ok(serde_json::from_str(raw)?),
    }
}
