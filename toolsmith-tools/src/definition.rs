//! Tool definitions: a function, its declared parameters and its call policy

use crate::args::{HostParams, HostValue, ToolArgs};
use crate::config;
use crate::definitions::hoist_property_definitions;
use crate::docstring::{inject_into_docstring, parse_docstring, render_template};
use crate::error::{Result, ToolError};
use crate::library::{LibraryHandle, ToolLibrary};
use crate::output::ToolOutput;
use crate::schema::{ParameterDescriptor, SchemaBuilder};
use crate::type_map::TypeMap;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use toolsmith_core::{ParamType, ToolSchema};
use tracing::{debug, trace, warn};

/// Type alias for tool functions
pub type ToolFunction = Arc<dyn Fn(ToolArgs) -> Result<ToolOutput> + Send + Sync>;

/// One declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    ty: ParamType,
    default: Option<Value>,
    description: Option<String>,
}

impl Param {
    /// A required parameter
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            description: None,
        }
    }

    /// Give the parameter a default, making it optional
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Describe the parameter here instead of in the docstring
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    pub fn ty(&self) -> &ParamType {
        &self.ty
    }

    /// Default value
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ToolKind {
    Function,
    Batch,
}

/// A callable tool with its schema and call policy.
///
/// The schema is built when the definition is built; a definition that
/// exists always has a valid schema.
#[derive(Clone)]
pub struct ToolDefinition {
    name: String,
    doc: String,
    params: Vec<Param>,
    injected_parameters: Vec<String>,
    additional_parameters: HashMap<String, Value>,
    user_message: Option<String>,
    tool_group: Option<String>,
    type_map: Option<Arc<TypeMap>>,
    function: ToolFunction,
    kind: ToolKind,
    schema: Arc<ToolSchema>,
    library: Option<LibraryHandle>,
}

impl ToolDefinition {
    /// Start building a tool called `name`
    pub fn builder(name: impl Into<String>) -> ToolDefinitionBuilder {
        ToolDefinitionBuilder::new(name)
    }

    /// A definition whose schema is supplied rather than derived
    pub(crate) fn with_schema(
        builder: ToolDefinitionBuilder,
        schema: ToolSchema,
        kind: ToolKind,
        function: ToolFunction,
    ) -> Self {
        Self {
            name: builder.name,
            doc: builder.doc,
            params: builder.params,
            injected_parameters: builder.injected_parameters,
            additional_parameters: builder.additional_parameters,
            user_message: builder.user_message,
            tool_group: builder.tool_group,
            type_map: builder.type_map,
            function,
            kind,
            schema: Arc::new(schema),
            library: None,
        }
    }

    /// Tool name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The docstring the schema was built from
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Tool description
    pub fn description(&self) -> &str {
        &self.schema.description
    }

    /// Declared parameters, injected ones included
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Names the host supplies at call time
    pub fn injected_parameters(&self) -> &[String] {
        &self.injected_parameters
    }

    /// Message template shown to the user when the tool is called
    pub fn user_message(&self) -> Option<&str> {
        self.user_message.as_deref()
    }

    /// Group tag
    pub fn tool_group(&self) -> Option<&str> {
        self.tool_group.as_deref()
    }

    /// Whether this is the synthetic batch tool
    pub fn is_batch_tool(&self) -> bool {
        self.kind == ToolKind::Batch
    }

    /// The schema built with the definition
    pub fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    /// Build the tool schema.
    ///
    /// Without substitutions this is the schema built with the definition.
    /// With substitutions, `{{key}}` markers in the docstring are replaced
    /// first and a fresh schema is built; the stored schema is not touched.
    pub fn build_json_schema(
        &self,
        substitutions: Option<&HashMap<String, String>>,
    ) -> Result<Arc<ToolSchema>> {
        match substitutions {
            None => Ok(Arc::clone(&self.schema)),
            Some(substitutions) => {
                let doc = inject_into_docstring(&self.doc, substitutions);
                derive_schema(
                    &self.name,
                    &doc,
                    &self.params,
                    &self.injected_parameters,
                    &self.additional_parameters,
                    self.type_map.as_deref(),
                )
                .map(Arc::new)
            }
        }
    }

    /// Call the tool with model arguments and host parameters.
    ///
    /// Model arguments are passed as given. Each injected parameter is then
    /// taken from `host`, replacing any model value of the same name.
    pub fn invoke(&self, model: Map<String, Value>, host: &HostParams) -> Result<ToolOutput> {
        let host = self.effective_host(host)?;
        let args = self.merge(model, &host)?;
        debug!(tool = %self.name, "Invoking tool");
        (self.function)(args)
    }

    /// Call the tool and render its user message
    pub fn invoke_with_message(
        &self,
        model: Map<String, Value>,
        host: &HostParams,
    ) -> Result<(ToolOutput, Option<String>)> {
        let output = self.invoke(model.clone(), host)?;
        let message = self.render_message(&model, host)?;
        Ok((output, message))
    }

    /// Render the user message for a call without calling the tool.
    ///
    /// For the batch tool this is every sub-invocation's message, one per line.
    pub fn render_message(
        &self,
        model: &Map<String, Value>,
        host: &HostParams,
    ) -> Result<Option<String>> {
        if self.is_batch_tool() {
            return self.render_batch_message(model, host);
        }

        let Some(template) = self.user_message.as_deref() else {
            return Ok(None);
        };

        let args = self.merge(model.clone(), host)?;
        if !template.contains("{{") {
            return Ok(Some(template.to_string()));
        }
        Ok(Some(render_template(template, |key| {
            args.entry(key).map(HostValue::render)
        })))
    }

    fn render_batch_message(
        &self,
        model: &Map<String, Value>,
        host: &HostParams,
    ) -> Result<Option<String>> {
        let library = self.library()?;
        let invocations = model
            .get("invocations")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut messages = Vec::new();
        for (index, invocation) in invocations.iter().enumerate() {
            match sub_message(&library, invocation, host) {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => {}
                Err(err) => debug!(index, error = %err, "Skipping batch message"),
            }
        }

        Ok((!messages.is_empty()).then(|| messages.join("\n")))
    }

    pub(crate) fn attach(&mut self, handle: LibraryHandle) {
        self.library = Some(handle);
    }

    fn library(&self) -> Result<ToolLibrary> {
        self.library
            .as_ref()
            .and_then(LibraryHandle::upgrade)
            .ok_or_else(|| ToolError::LibraryUnavailable {
                tool: self.name.clone(),
            })
    }

    fn effective_host<'a>(&self, host: &'a HostParams) -> Result<Cow<'a, HostParams>> {
        match self.kind {
            ToolKind::Function => Ok(Cow::Borrowed(host)),
            ToolKind::Batch => {
                let library = self.library()?;
                let host = HostParams::new()
                    .with_object(crate::batch::TOOL_LIBRARY_PARAM, library)
                    .with_object(crate::batch::HARDSET_PARAMETERS_PARAM, host.clone());
                Ok(Cow::Owned(host))
            }
        }
    }

    fn merge(&self, model: Map<String, Value>, host: &HostParams) -> Result<ToolArgs> {
        let mut args = ToolArgs::from_model(&self.name, model);

        for param in &self.params {
            if args.contains(&param.name) || self.injected_parameters.contains(&param.name) {
                continue;
            }
            if let Some(default) = &param.default {
                args.insert(param.name.clone(), HostValue::Json(default.clone()));
            }
        }

        for name in &self.injected_parameters {
            let value = host
                .get(name)
                .ok_or_else(|| ToolError::MissingInjectedParameter {
                    tool: self.name.clone(),
                    parameter: name.clone(),
                })?;
            args.insert(name.clone(), value.clone());
        }

        trace!(tool = %self.name, "Merged tool arguments");
        Ok(args)
    }
}

fn sub_message(
    library: &ToolLibrary,
    invocation: &Value,
    host: &HostParams,
) -> Result<Option<String>> {
    let name = invocation
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::invalid_arguments("batch_tool", "invocation missing 'name'"))?;
    let tool = library.get_tool_from_name(name)?;
    let raw = match invocation.get("arguments") {
        None => "{}",
        Some(Value::String(raw)) => raw.as_str(),
        Some(_) => return Err(ToolError::invalid_arguments(name, crate::batch::NOT_A_STRING)),
    };
    let arguments = config::deserialize_batch_arguments(raw)?;
    tool.render_message(&arguments, host)
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("injected_parameters", &self.injected_parameters)
            .field("tool_group", &self.tool_group)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Build a schema from a docstring and parameter declarations
fn derive_schema(
    name: &str,
    doc: &str,
    params: &[Param],
    injected_parameters: &[String],
    additional_parameters: &HashMap<String, Value>,
    type_map: Option<&TypeMap>,
) -> Result<ToolSchema> {
    let global;
    let type_map = match type_map {
        Some(type_map) => type_map,
        None => {
            global = config::type_map();
            &global
        }
    };
    let builder = SchemaBuilder::new(type_map);
    let docstring = parse_docstring(doc);

    let mut schema = ToolSchema::new(name, docstring.description.clone());
    for param in params {
        if injected_parameters.contains(&param.name) {
            continue;
        }

        let descriptor = ParameterDescriptor {
            name: &param.name,
            ty: &param.ty,
            default: param.default.as_ref(),
            description: param
                .description
                .as_deref()
                .or_else(|| docstring.param(&param.name)),
            overrides: additional_parameters.get(&param.name),
        };

        let (fragment, required) =
            builder
                .build_parameter(&descriptor)
                .map_err(|source| ToolError::Configuration {
                    tool: name.to_string(),
                    parameter: param.name.clone(),
                    source,
                })?;

        schema
            .input_properties
            .insert(param.name.clone(), Value::Object(fragment));
        if required {
            schema.required_parameters.push(param.name.clone());
        }
    }

    schema.input_properties =
        hoist_property_definitions(schema.input_properties).map_err(|source| {
            ToolError::Configuration {
                tool: name.to_string(),
                parameter: "definitions".to_string(),
                source,
            }
        })?;
    Ok(schema)
}

/// Builder for creating tool definitions
pub struct ToolDefinitionBuilder {
    name: String,
    doc: String,
    params: Vec<Param>,
    injected_parameters: Vec<String>,
    additional_parameters: HashMap<String, Value>,
    user_message: Option<String>,
    tool_group: Option<String>,
    type_map: Option<Arc<TypeMap>>,
}

impl ToolDefinitionBuilder {
    /// Create a new builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            params: Vec::new(),
            injected_parameters: Vec::new(),
            additional_parameters: HashMap::new(),
            user_message: None,
            tool_group: None,
            type_map: None,
        }
    }

    /// Set the docstring the description and parameter descriptions come from
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Declare a required parameter
    pub fn param(self, name: impl Into<String>, ty: ParamType) -> Self {
        self.param_with(Param::new(name, ty))
    }

    /// Declare a parameter with a default
    pub fn param_with_default(
        self,
        name: impl Into<String>,
        ty: ParamType,
        default: impl Into<Value>,
    ) -> Self {
        self.param_with(Param::new(name, ty).default_value(default))
    }

    /// Declare a fully specified parameter; a later declaration of the same
    /// name replaces the earlier one
    pub fn param_with(mut self, param: Param) -> Self {
        match self.params.iter_mut().find(|p| p.name == param.name) {
            Some(existing) => *existing = param,
            None => self.params.push(param),
        }
        self
    }

    /// Have the host supply `name` at call time; the model never sees it
    pub fn inject(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.injected_parameters.contains(&name) {
            self.injected_parameters.push(name);
        }
        self
    }

    /// Extra JSON schema keys for one parameter, applied after everything else
    pub fn additional_parameter(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.additional_parameters.insert(name.into(), schema);
        self
    }

    /// Message shown to the user when the tool is called; `{{param}}`
    /// markers are replaced with argument values
    pub fn user_message(mut self, template: impl Into<String>) -> Self {
        self.user_message = Some(template.into());
        self
    }

    /// Tag the tool with a group
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.tool_group = Some(group.into());
        self
    }

    /// Build against these type mappings instead of the global ones
    pub fn type_map(mut self, type_map: TypeMap) -> Self {
        self.type_map = Some(Arc::new(type_map));
        self
    }

    /// Build the definition, deriving and checking its schema
    pub fn build<F, O>(self, function: F) -> Result<ToolDefinition>
    where
        F: Fn(ToolArgs) -> Result<O> + Send + Sync + 'static,
        O: Into<ToolOutput>,
    {
        let schema = derive_schema(
            &self.name,
            &self.doc,
            &self.params,
            &self.injected_parameters,
            &self.additional_parameters,
            self.type_map.as_deref(),
        )
        .inspect_err(|err| warn!(tool = %self.name, error = %err, "Failed to build tool"))?;

        debug!(
            tool = %self.name,
            parameters = schema.input_properties.len(),
            required = schema.required_parameters.len(),
            "Built tool schema"
        );

        let function: ToolFunction = Arc::new(move |args: ToolArgs| -> Result<ToolOutput> {
            function(args).map(Into::into)
        });
        Ok(ToolDefinition::with_schema(
            self,
            schema,
            ToolKind::Function,
            function,
        ))
    }
}
