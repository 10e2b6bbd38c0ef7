//! Compiles declared parameter types into JSON schema fragments

use crate::error::SchemaError;
use crate::type_map::TypeMap;
use serde_json::{Map, Value};
use toolsmith_core::{JsonType, NativeType, ParamType};

/// Everything known about one parameter while its schema is built
#[derive(Debug, Clone, Copy)]
pub struct ParameterDescriptor<'a> {
    /// Parameter name
    pub name: &'a str,
    /// Declared type
    pub ty: &'a ParamType,
    /// Default value, if the parameter has one
    pub default: Option<&'a Value>,
    /// Description from the docstring
    pub description: Option<&'a str>,
    /// Extra schema keys applied last
    pub overrides: Option<&'a Value>,
}

impl<'a> ParameterDescriptor<'a> {
    /// A required parameter with no description
    pub fn new(name: &'a str, ty: &'a ParamType) -> Self {
        Self {
            name,
            ty,
            default: None,
            description: None,
            overrides: None,
        }
    }

    /// Set the default value
    pub fn default_value(mut self, default: &'a Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Set the description
    pub fn description(mut self, description: &'a str) -> Self {
        self.description = Some(description);
        self
    }

    /// Set the extra schema keys
    pub fn overrides(mut self, overrides: &'a Value) -> Self {
        self.overrides = Some(overrides);
        self
    }
}

/// Builds schema fragments against one set of type mappings
#[derive(Debug, Clone, Copy)]
pub struct SchemaBuilder<'a> {
    type_map: &'a TypeMap,
}

impl<'a> SchemaBuilder<'a> {
    /// Create a builder reading from `type_map`
    pub fn new(type_map: &'a TypeMap) -> Self {
        Self { type_map }
    }

    /// Build the schema of a top-level parameter.
    ///
    /// Returns the fragment and whether the parameter is required. A parameter
    /// is required exactly when it has no default. Scalar defaults are written
    /// to `default`, a null default as the string `"null"`; other defaults make
    /// the parameter optional without a `default` key.
    pub fn build_parameter(
        &self,
        param: &ParameterDescriptor<'_>,
    ) -> Result<(Map<String, Value>, bool), SchemaError> {
        let mut schema = self.build_type(param.ty)?;

        if let Some(description) = param.description {
            schema.insert("description".to_string(), Value::String(description.to_string()));
        }

        let required = match param.default {
            None => true,
            Some(default) => {
                if let Some(encoded) = encode_default(default) {
                    schema.insert("default".to_string(), encoded);
                }
                false
            }
        };

        match param.overrides {
            Some(Value::Object(overrides)) => {
                schema.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            Some(_) => {
                return Err(SchemaError::InvalidOverride {
                    parameter: param.name.to_string(),
                })
            }
            None => {}
        }

        Ok((schema, required))
    }

    /// Build the bare schema of a type, with no description or default
    pub fn build_type(&self, ty: &ParamType) -> Result<Map<String, Value>, SchemaError> {
        let options = ty.options();
        if let [single] = options.as_slice() {
            return self.build_member(single, Vec::new());
        }

        let schemas = options
            .into_iter()
            .map(|option| self.build_member(option, Vec::new()).map(Value::Object))
            .collect::<Result<Vec<_>, _>>()?;

        let mut schema = Map::new();
        schema.insert("anyOf".to_string(), Value::Array(schemas));
        Ok(schema)
    }

    fn build_member(
        &self,
        ty: &ParamType,
        mut lineage: Vec<NativeType>,
    ) -> Result<Map<String, Value>, SchemaError> {
        let mut schema = Map::new();
        match ty {
            ParamType::Alias { wrapper, inner } => {
                lineage.push(*wrapper);
                return self.build_member(inner, lineage);
            }
            ParamType::Native(native) => {
                lineage.push(*native);
                schema.insert("type".to_string(), self.json_type(native)?.into());
                self.insert_format(&mut schema, &lineage);
            }
            ParamType::Array(item) => {
                let list = NativeType::list();
                lineage.push(list);
                schema.insert("type".to_string(), self.json_type(&list)?.into());
                schema.insert("items".to_string(), Value::Object(self.build_type(item)?));
                self.insert_format(&mut schema, &lineage);
            }
            ParamType::Enum { type_name, values } => {
                self.insert_enum(&mut schema, type_name, values)?;
            }
            ParamType::Literal(values) => {
                self.insert_enum(&mut schema, &ty.to_string(), values)?;
            }
            ParamType::Model(model) => {
                let generated = model.schema().map_err(|source| SchemaError::Introspection {
                    type_name: model.type_name().to_string(),
                    source,
                })?;
                let Value::Object(generated) = generated else {
                    return Err(SchemaError::InvalidModelSchema {
                        type_name: model.type_name().to_string(),
                    });
                };
                schema.insert("type".to_string(), JsonType::Object.into());
                schema.extend(generated.into_iter().filter(|(key, _)| key != "$schema"));
            }
            ParamType::Union(_) => return self.build_type(ty),
        }

        Ok(schema)
    }

    fn insert_enum(
        &self,
        schema: &mut Map<String, Value>,
        type_name: &str,
        values: &[Value],
    ) -> Result<(), SchemaError> {
        let first = values.first().ok_or_else(|| SchemaError::EmptyEnum {
            type_name: type_name.to_string(),
        })?;
        let json_type = self.json_type(&NativeType::of_value(first))?;
        schema.insert("type".to_string(), json_type.into());
        schema.insert("enum".to_string(), Value::Array(values.to_vec()));
        Ok(())
    }

    fn insert_format(&self, schema: &mut Map<String, Value>, lineage: &[NativeType]) {
        if let Some(format) = self.type_map.format_for(lineage) {
            schema.insert("format".to_string(), Value::String(format.to_string()));
        }
    }

    fn json_type(&self, ty: &NativeType) -> Result<JsonType, SchemaError> {
        self.type_map
            .json_type(ty)
            .ok_or_else(|| SchemaError::UnmappedType {
                type_name: ty.name().to_string(),
            })
    }
}

/// Encode a default value for the `default` key, if it can be written there
fn encode_default(default: &Value) -> Option<Value> {
    match default {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Some(default.clone()),
        Value::Null => Some(Value::String("null".to_string())),
        Value::Array(_) | Value::Object(_) => None,
    }
}
