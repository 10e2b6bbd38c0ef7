//! Declared parameter types
//!
//! Tools declare the type of each parameter up front as a [`ParamType`].
//! Common Rust types describe themselves through [`Describe`], so a
//! declaration usually reads `ParamType::infer::<Option<i64>>()`.

use super::native::NativeType;
use chrono::{DateTime, FixedOffset, Utc};
use schemars::JsonSchema;
use serde_json::{Map, Value};
use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use uuid::Uuid;

/// The declared type of a tool parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    /// A native type looked up in the type mapping
    Native(NativeType),
    /// A named wrapper around another type
    Alias {
        /// The wrapper type, still consulted for `format`
        wrapper: NativeType,
        /// The underlying type
        inner: Box<ParamType>,
    },
    /// A homogeneous list
    Array(Box<ParamType>),
    /// A closed set of values taken from an enum type
    Enum {
        /// Name of the enum type
        type_name: &'static str,
        /// Allowed values, in declaration order
        values: Vec<Value>,
    },
    /// An explicit set of allowed literal values
    Literal(Vec<Value>),
    /// A structured type with its own JSON schema
    Model(ModelSchema),
    /// Any one of several types
    Union(Vec<ParamType>),
}

impl ParamType {
    /// A native type
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Native(NativeType::of::<T>())
    }

    /// The declaration a describable type gives itself
    pub fn infer<T: Describe + ?Sized>() -> Self {
        T::describe()
    }

    /// The null type
    pub fn none() -> Self {
        Self::Native(NativeType::null())
    }

    /// A free-form object
    pub fn dict() -> Self {
        Self::Native(NativeType::dict())
    }

    /// A list of `item`
    pub fn array(item: ParamType) -> Self {
        Self::Array(Box::new(item))
    }

    /// One of `options`; nested unions are flattened
    pub fn union(options: impl IntoIterator<Item = ParamType>) -> Self {
        let mut flat = Vec::new();
        for option in options {
            match option {
                Self::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Self::Union(flat)
    }

    /// `inner` or null
    pub fn optional(inner: ParamType) -> Self {
        Self::union([inner, Self::none()])
    }

    /// The values of a [`ToolEnum`]
    pub fn enumeration<E: ToolEnum + ?Sized + 'static>() -> Self {
        Self::Enum {
            type_name: type_name::<E>(),
            values: E::variants(),
        }
    }

    /// A fixed set of literal values
    pub fn literal<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Literal(values.into_iter().map(Into::into).collect())
    }

    /// A structured type described by `schemars`
    pub fn model<T: JsonSchema>() -> Self {
        Self::Model(ModelSchema::of::<T>())
    }

    /// A structured type with a hand-written object schema
    pub fn object_schema(name: impl Into<String>, schema: Value) -> Self {
        Self::Model(ModelSchema::fixed(name, schema))
    }

    /// `inner` declared through the wrapper type `W`
    pub fn alias<W: ?Sized + 'static>(inner: ParamType) -> Self {
        Self::Alias {
            wrapper: NativeType::of::<W>(),
            inner: Box::new(inner),
        }
    }

    /// Members of this type, with unions flattened
    pub fn options(&self) -> Vec<&ParamType> {
        match self {
            Self::Union(options) => options.iter().flat_map(ParamType::options).collect(),
            other => vec![other],
        }
    }

    /// Whether null is one of the accepted types
    pub fn is_nullable(&self) -> bool {
        self.options()
            .iter()
            .any(|option| matches!(option, Self::Native(ty) if *ty == NativeType::null()))
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(ty) => write!(f, "{ty}"),
            Self::Alias { wrapper, .. } => write!(f, "{wrapper}"),
            Self::Array(item) => write!(f, "list[{item}]"),
            Self::Enum { type_name, .. } => f.write_str(type_name),
            Self::Literal(values) => {
                let values: Vec<String> = values.iter().map(Value::to_string).collect();
                write!(f, "Literal[{}]", values.join(", "))
            }
            Self::Model(model) => f.write_str(model.type_name()),
            Self::Union(options) => {
                let options: Vec<String> = options.iter().map(ToString::to_string).collect();
                f.write_str(&options.join(" | "))
            }
        }
    }
}

/// JSON schema source for a structured parameter type
#[derive(Debug, Clone)]
pub struct ModelSchema {
    type_name: String,
    source: SchemaSource,
}

#[derive(Debug, Clone)]
enum SchemaSource {
    Generated(fn() -> Result<Value, serde_json::Error>),
    Fixed(Value),
}

impl ModelSchema {
    /// Schema generated from a `schemars` implementation
    pub fn of<T: JsonSchema>() -> Self {
        Self {
            type_name: T::schema_name().into_owned(),
            source: SchemaSource::Generated(generate_schema::<T>),
        }
    }

    /// A pre-built schema
    pub fn fixed(type_name: impl Into<String>, schema: Value) -> Self {
        Self {
            type_name: type_name.into(),
            source: SchemaSource::Fixed(schema),
        }
    }

    /// Name of the structured type
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Produce the JSON schema
    pub fn schema(&self) -> Result<Value, serde_json::Error> {
        match &self.source {
            SchemaSource::Generated(generate) => generate(),
            SchemaSource::Fixed(schema) => Ok(schema.clone()),
        }
    }
}

impl PartialEq for ModelSchema {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
    }
}

fn generate_schema<T: JsonSchema>() -> Result<Value, serde_json::Error> {
    serde_json::to_value(schemars::schema_for!(T))
}

/// Types that know their own parameter declaration
pub trait Describe {
    /// The declaration of `Self`
    fn describe() -> ParamType;
}

/// Enums usable as a closed set of parameter values.
///
/// Usually derived with `#[derive(ToolEnum)]`.
pub trait ToolEnum {
    /// All values in declaration order
    fn variants() -> Vec<Value>;
}

macro_rules! describe_native {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> ParamType {
                    ParamType::of::<$ty>()
                }
            }
        )*
    };
}

describe_native!(
    String, str, char, bool, (), i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128,
    usize, f32, f64, Uuid, DateTime<Utc>, DateTime<FixedOffset>
);

impl<T: Describe + ?Sized> Describe for &T {
    fn describe() -> ParamType {
        T::describe()
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> ParamType {
        ParamType::array(T::describe())
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> ParamType {
        ParamType::optional(T::describe())
    }
}

impl<V> Describe for HashMap<String, V> {
    fn describe() -> ParamType {
        ParamType::dict()
    }
}

impl<V> Describe for BTreeMap<String, V> {
    fn describe() -> ParamType {
        ParamType::dict()
    }
}

impl Describe for Map<String, Value> {
    fn describe() -> ParamType {
        ParamType::dict()
    }
}
