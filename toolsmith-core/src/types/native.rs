//! Runtime identities for native Rust types and the JSON types they map to

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A Rust type identified at runtime.
///
/// Two `NativeType`s are equal when they name the same [`TypeId`]; the type
/// name is carried along for error messages only.
#[derive(Clone, Copy)]
pub struct NativeType {
    id: TypeId,
    name: &'static str,
}

impl NativeType {
    /// Identity of `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The list origin every array parameter maps through
    pub fn list() -> Self {
        Self::of::<Vec<Value>>()
    }

    /// The dict origin every map parameter maps through
    pub fn dict() -> Self {
        Self::of::<Map<String, Value>>()
    }

    /// The null type
    pub fn null() -> Self {
        Self::of::<()>()
    }

    /// The native type a JSON literal value decodes to.
    ///
    /// Integers that fit in `i64` are `i64`, larger ones `u64`, everything
    /// else numeric is `f64`.
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::null(),
            Value::Bool(_) => Self::of::<bool>(),
            Value::Number(n) if n.is_i64() => Self::of::<i64>(),
            Value::Number(n) if n.is_u64() => Self::of::<u64>(),
            Value::Number(_) => Self::of::<f64>(),
            Value::String(_) => Self::of::<String>(),
            Value::Array(_) => Self::list(),
            Value::Object(_) => Self::dict(),
        }
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The runtime type id
    pub fn id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for NativeType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NativeType {}

impl Hash for NativeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeType").field(&self.name).finish()
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// JSON-schema primitive type names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    /// `"string"`
    String,
    /// `"integer"`
    Integer,
    /// `"number"`
    Number,
    /// `"boolean"`
    Boolean,
    /// `"null"`
    Null,
    /// `"array"`
    Array,
    /// `"object"`
    Object,
}

impl JsonType {
    /// The schema keyword for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<JsonType> for Value {
    fn from(ty: JsonType) -> Self {
        Value::String(ty.as_str().to_string())
    }
}
