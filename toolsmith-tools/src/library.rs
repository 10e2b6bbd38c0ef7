//! Tool libraries: named, grouped collections of tools with vendor exports

use crate::args::HostParams;
use crate::batch::{batch_tool_definition, BATCH_TOOL_NAME};
use crate::definition::ToolDefinition;
use crate::error::{Result, ToolError};
use crate::output::ToolOutput;
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, Weak};
use toolsmith_core::{AnthropicTool, BedrockToolConfig, GeminiTool, OpenAiTool};
use tracing::{debug, info};

#[derive(Default)]
struct LibraryState {
    tools: IndexMap<String, ToolDefinition>,
    groups: IndexMap<String, Vec<String>>,
    batch: Option<ToolDefinition>,
}

/// A collection of tools addressed by name.
///
/// Clones share the same tools. Tools are cloned out of the library before
/// they are called, so a long-running tool never blocks registration.
#[derive(Clone)]
pub struct ToolLibrary {
    state: Arc<RwLock<LibraryState>>,
    include_batch_tool: bool,
}

/// Non-owning reference from a tool back to its library
#[derive(Clone)]
pub(crate) struct LibraryHandle {
    state: Weak<RwLock<LibraryState>>,
    include_batch_tool: bool,
}

impl LibraryHandle {
    pub(crate) fn upgrade(&self) -> Option<ToolLibrary> {
        self.state.upgrade().map(|state| ToolLibrary {
            state,
            include_batch_tool: self.include_batch_tool,
        })
    }
}

impl ToolLibrary {
    /// Empty library without the batch tool
    pub fn new() -> Self {
        Self::with_batch_tool(false)
    }

    /// Empty library, optionally exposing the batch tool
    pub fn with_batch_tool(include_batch_tool: bool) -> Self {
        let library = Self {
            state: Arc::new(RwLock::new(LibraryState::default())),
            include_batch_tool,
        };

        if include_batch_tool {
            let mut batch = batch_tool_definition();
            batch.attach(library.handle());
            library.state.write().batch = Some(batch);
        }

        library
    }

    /// Build a library from tools
    pub fn from_tools(
        tools: impl IntoIterator<Item = ToolDefinition>,
        include_batch_tool: bool,
    ) -> Result<Self> {
        let library = Self::with_batch_tool(include_batch_tool);
        library.add_tools(tools)?;
        Ok(library)
    }

    /// Whether the batch tool is exposed
    pub fn includes_batch_tool(&self) -> bool {
        self.include_batch_tool
    }

    fn handle(&self) -> LibraryHandle {
        LibraryHandle {
            state: Arc::downgrade(&self.state),
            include_batch_tool: self.include_batch_tool,
        }
    }

    /// Register a tool
    pub fn add_tool(&self, mut tool: ToolDefinition) -> Result<()> {
        let name = tool.name().to_string();
        if self.include_batch_tool && name == BATCH_TOOL_NAME {
            return Err(ToolError::DuplicateTool { name });
        }

        let mut state = self.state.write();
        if state.tools.contains_key(&name) {
            return Err(ToolError::DuplicateTool { name });
        }

        tool.attach(self.handle());
        if let Some(group) = tool.tool_group() {
            state
                .groups
                .entry(group.to_string())
                .or_default()
                .push(name.clone());
        }
        debug!(tool = %name, group = ?tool.tool_group(), "Registered tool");
        state.tools.insert(name, tool);
        Ok(())
    }

    /// Register several tools, stopping at the first failure
    pub fn add_tools(&self, tools: impl IntoIterator<Item = ToolDefinition>) -> Result<()> {
        for tool in tools {
            self.add_tool(tool)?;
        }
        Ok(())
    }

    /// Look a tool up by name; `batch_tool` finds the batch tool when exposed
    pub fn get_tool_from_name(&self, name: &str) -> Result<ToolDefinition> {
        let state = self.state.read();
        if let Some(tool) = state.tools.get(name) {
            return Ok(tool.clone());
        }
        if name == BATCH_TOOL_NAME {
            if let Some(batch) = &state.batch {
                return Ok(batch.clone());
            }
        }
        Err(ToolError::not_found(name))
    }

    /// Names of the registered tools in registration order, without the batch tool
    pub fn get_all_tool_names(&self) -> Vec<String> {
        self.state.read().tools.keys().cloned().collect()
    }

    /// Names of the tools tagged with `group`
    pub fn get_tools_in_group(&self, group: &str) -> Result<Vec<String>> {
        self.state
            .read()
            .groups
            .get(group)
            .cloned()
            .ok_or_else(|| ToolError::UnknownGroup {
                group: group.to_string(),
            })
    }

    /// Known group names
    pub fn groups(&self) -> Vec<String> {
        self.state.read().groups.keys().cloned().collect()
    }

    /// Whether a tool is registered
    pub fn contains(&self, name: &str) -> bool {
        self.state.read().tools.contains_key(name)
    }

    /// Number of registered tools, not counting the batch tool
    pub fn len(&self) -> usize {
        self.state.read().tools.len()
    }

    /// Whether no tools are registered
    pub fn is_empty(&self) -> bool {
        self.state.read().tools.is_empty()
    }

    /// A new library holding only the named tools and the tools of the named groups
    pub fn subset(&self, tool_names: &[&str], tool_groups: &[&str]) -> Result<ToolLibrary> {
        let selected = self.resolve(tool_names, tool_groups)?;
        let tools: Vec<_> = {
            let state = self.state.read();
            state
                .tools
                .values()
                .filter(|tool| selected.contains(tool.name()))
                .cloned()
                .collect()
        };
        info!(tools = tools.len(), "Created library subset");
        Self::from_tools(tools, self.include_batch_tool)
    }

    /// A new library without the named tools and the tools of the named groups
    pub fn exclude(&self, tool_names: &[&str], tool_groups: &[&str]) -> Result<ToolLibrary> {
        let excluded = self.resolve(tool_names, tool_groups)?;
        let tools: Vec<_> = {
            let state = self.state.read();
            state
                .tools
                .values()
                .filter(|tool| !excluded.contains(tool.name()))
                .cloned()
                .collect()
        };
        info!(tools = tools.len(), "Created library exclusion");
        Self::from_tools(tools, self.include_batch_tool)
    }

    fn resolve(&self, tool_names: &[&str], tool_groups: &[&str]) -> Result<IndexSet<String>> {
        let state = self.state.read();
        let mut names = IndexSet::new();

        for name in tool_names {
            if !state.tools.contains_key(*name) {
                return Err(ToolError::not_found(*name));
            }
            names.insert(name.to_string());
        }
        for group in tool_groups {
            let members = state
                .groups
                .get(*group)
                .ok_or_else(|| ToolError::UnknownGroup {
                    group: group.to_string(),
                })?;
            names.extend(members.iter().cloned());
        }

        Ok(names)
    }

    /// Call a tool by name
    pub fn call_tool(
        &self,
        name: &str,
        model: Map<String, Value>,
        host: &HostParams,
    ) -> Result<ToolOutput> {
        let tool = self.get_tool_from_name(name)?;
        tool.invoke(model, host)
    }

    /// Call a tool by name and render its user message
    pub fn call_tool_with_message(
        &self,
        name: &str,
        model: Map<String, Value>,
        host: &HostParams,
    ) -> Result<(ToolOutput, Option<String>)> {
        let tool = self.get_tool_from_name(name)?;
        tool.invoke_with_message(model, host)
    }

    /// Every exported tool, the batch tool first when exposed
    fn exported(&self) -> Vec<ToolDefinition> {
        let state = self.state.read();
        state
            .batch
            .iter()
            .chain(state.tools.values())
            .cloned()
            .collect()
    }

    /// Tool definitions in the OpenAI format
    pub fn to_openai(&self, strict: bool) -> Vec<OpenAiTool> {
        self.exported()
            .iter()
            .map(|tool| tool.schema().to_openai(strict))
            .collect()
    }

    /// Tool definitions in the Anthropic format; the last one carries the
    /// cache marker when `use_cache_control` is set
    pub fn to_anthropic(&self, use_cache_control: bool) -> Vec<AnthropicTool> {
        let tools = self.exported();
        let last = tools.len().saturating_sub(1);
        tools
            .iter()
            .enumerate()
            .map(|(index, tool)| tool.schema().to_anthropic(use_cache_control && index == last))
            .collect()
    }

    /// Tool configuration in the Bedrock format
    pub fn to_bedrock(&self) -> BedrockToolConfig {
        BedrockToolConfig {
            tools: self
                .exported()
                .iter()
                .map(|tool| tool.schema().to_bedrock())
                .collect(),
        }
    }

    /// Function declarations in the Gemini format
    pub fn to_gemini(&self) -> GeminiTool {
        GeminiTool {
            function_declarations: self
                .exported()
                .iter()
                .map(|tool| tool.schema().to_gemini())
                .collect(),
        }
    }
}

impl Default for ToolLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ToolLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolLibrary")
            .field("tools", &self.get_all_tool_names())
            .field("include_batch_tool", &self.include_batch_tool)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_log::test;
    use toolsmith_core::ParamType;

    fn tool(name: &str, group: Option<&str>) -> ToolDefinition {
        let builder = ToolDefinition::builder(name)
            .doc(format!("The {name} tool."))
            .param("x", ParamType::of::<i64>());
        let builder = match group {
            Some(group) => builder.group(group),
            None => builder,
        };
        builder
            .build(|args| Ok(json!(args.get::<i64>("x")? * 2)))
            .unwrap()
    }

    fn library(include_batch_tool: bool) -> ToolLibrary {
        ToolLibrary::from_tools(
            [
                tool("a", Some("math")),
                tool("b", Some("math")),
                tool("c", Some("text")),
                tool("d", None),
            ],
            include_batch_tool,
        )
        .unwrap()
    }

    #[test]
    fn test_registration_and_lookup() {
        let library = library(false);
        assert_eq!(library.get_all_tool_names(), vec!["a", "b", "c", "d"]);
        assert_eq!(library.get_tools_in_group("math").unwrap(), vec!["a", "b"]);
        assert_eq!(library.groups(), vec!["math", "text"]);
        assert!(library.contains("d"));
        assert_eq!(library.len(), 4);

        assert!(matches!(
            library.get_tool_from_name("zzz"),
            Err(ToolError::NotFound { .. })
        ));
        assert!(matches!(
            library.get_tools_in_group("nope"),
            Err(ToolError::UnknownGroup { .. })
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let library = library(false);
        let err = library.add_tool(tool("a", None)).unwrap_err();
        assert!(matches!(err, ToolError::DuplicateTool { ref name } if name == "a"));
        assert_eq!(library.len(), 4);
    }

    #[test]
    fn test_batch_tool_name_reserved() {
        let library = ToolLibrary::with_batch_tool(true);
        assert!(library.add_tool(tool(BATCH_TOOL_NAME, None)).is_err());

        let plain = ToolLibrary::new();
        assert!(plain.add_tool(tool(BATCH_TOOL_NAME, None)).is_ok());
    }

    #[test]
    fn test_batch_tool_lookup() {
        let library = library(true);
        let batch = library.get_tool_from_name(BATCH_TOOL_NAME).unwrap();
        assert!(batch.is_batch_tool());
        assert!(!library.get_all_tool_names().contains(&BATCH_TOOL_NAME.to_string()));

        assert!(self::library(false).get_tool_from_name(BATCH_TOOL_NAME).is_err());
    }

    #[test]
    fn test_subset_and_exclude() {
        let library = library(true);

        let subset = library.subset(&["d"], &["math"]).unwrap();
        assert_eq!(subset.get_all_tool_names(), vec!["a", "b", "d"]);
        assert!(subset.includes_batch_tool());

        let rest = library.exclude(&["d"], &["math"]).unwrap();
        assert_eq!(rest.get_all_tool_names(), vec!["c"]);

        assert!(library.subset(&["zzz"], &[]).is_err());
        assert!(library.exclude(&[], &["nope"]).is_err());
        assert_eq!(library.len(), 4);
    }

    #[test]
    fn test_call_tool() {
        let library = library(false);
        let output = library
            .call_tool("a", json!({"x": 4}).as_object().cloned().unwrap(), &HostParams::new())
            .unwrap();
        assert_eq!(output.into_value().unwrap(), json!(8));
    }

    #[test]
    fn test_exports_put_batch_tool_first() {
        let library = library(true);

        let openai = library.to_openai(false);
        assert_eq!(openai.len(), 5);
        assert_eq!(openai[0].function.name, BATCH_TOOL_NAME);
        assert_eq!(openai[1].function.name, "a");

        let anthropic = library.to_anthropic(true);
        assert_eq!(anthropic.len(), 5);
        assert!(anthropic[..4].iter().all(|tool| tool.cache_control.is_none()));
        assert!(anthropic[4].cache_control.is_some());

        assert_eq!(library.to_bedrock().tools.len(), 5);
        assert_eq!(library.to_gemini().function_declarations.len(), 5);
    }

    #[test]
    fn test_empty_exports() {
        let library = ToolLibrary::new();
        assert!(library.to_openai(true).is_empty());
        assert!(library.to_anthropic(true).is_empty());
        assert!(library.to_bedrock().tools.is_empty());
    }
}
