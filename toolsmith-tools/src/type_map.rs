//! Native type to JSON type and format mappings

use chrono::{DateTime, FixedOffset, Utc};
use indexmap::IndexMap;
use toolsmith_core::{JsonType, NativeType};
use uuid::Uuid;

/// The two mappings consulted when building parameter schemas.
///
/// `types` gives the JSON type of every native type a parameter may use.
/// `formats` gives an optional `format` string; lookups walk it in insertion
/// order and the first entry matching the type wins.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMap {
    types: IndexMap<NativeType, JsonType>,
    formats: IndexMap<NativeType, String>,
}

impl TypeMap {
    /// The seeded mappings
    pub fn new() -> Self {
        Self {
            types: default_types(),
            formats: default_formats(),
        }
    }

    /// Mappings with nothing in them
    pub fn empty() -> Self {
        Self {
            types: IndexMap::new(),
            formats: IndexMap::new(),
        }
    }

    /// Add or override type mappings
    pub fn update_types(&mut self, entries: impl IntoIterator<Item = (NativeType, JsonType)>) {
        self.types.extend(entries);
    }

    /// Add or override format mappings
    pub fn update_formats<S: Into<String>>(
        &mut self,
        entries: impl IntoIterator<Item = (NativeType, S)>,
    ) {
        self.formats
            .extend(entries.into_iter().map(|(ty, format)| (ty, format.into())));
    }

    /// Map `T` to `json_type`
    pub fn with_type<T: ?Sized + 'static>(mut self, json_type: JsonType) -> Self {
        self.types.insert(NativeType::of::<T>(), json_type);
        self
    }

    /// Give `T` the format `format`
    pub fn with_format<T: ?Sized + 'static>(mut self, format: impl Into<String>) -> Self {
        self.formats.insert(NativeType::of::<T>(), format.into());
        self
    }

    /// Restore the seeded type mappings, dropping every override
    pub fn reset_types(&mut self) {
        self.types = default_types();
    }

    /// Restore the seeded format mappings, dropping every override
    pub fn reset_formats(&mut self) {
        self.formats = default_formats();
    }

    /// The JSON type of `ty`
    pub fn json_type(&self, ty: &NativeType) -> Option<JsonType> {
        self.types.get(ty).copied()
    }

    /// The format of the first entry matching any type in `lineage`
    pub fn format_for(&self, lineage: &[NativeType]) -> Option<&str> {
        self.formats
            .iter()
            .find(|(ty, _)| lineage.contains(ty))
            .map(|(_, format)| format.as_str())
    }

    /// Type mappings in insertion order
    pub fn types(&self) -> impl Iterator<Item = (&NativeType, &JsonType)> {
        self.types.iter()
    }

    /// Format mappings in insertion order
    pub fn formats(&self) -> impl Iterator<Item = (&NativeType, &str)> {
        self.formats.iter().map(|(ty, format)| (ty, format.as_str()))
    }
}

impl Default for TypeMap {
    fn default() -> Self {
        Self::new()
    }
}

fn default_types() -> IndexMap<NativeType, JsonType> {
    let integer = [
        NativeType::of::<i8>(),
        NativeType::of::<i16>(),
        NativeType::of::<i32>(),
        NativeType::of::<i64>(),
        NativeType::of::<i128>(),
        NativeType::of::<isize>(),
        NativeType::of::<u8>(),
        NativeType::of::<u16>(),
        NativeType::of::<u32>(),
        NativeType::of::<u64>(),
        NativeType::of::<u128>(),
        NativeType::of::<usize>(),
    ];

    let mut types = IndexMap::new();
    types.insert(NativeType::of::<String>(), JsonType::String);
    types.insert(NativeType::of::<str>(), JsonType::String);
    types.insert(NativeType::of::<char>(), JsonType::String);
    types.extend(integer.into_iter().map(|ty| (ty, JsonType::Integer)));
    types.insert(NativeType::of::<f32>(), JsonType::Number);
    types.insert(NativeType::of::<f64>(), JsonType::Number);
    types.insert(NativeType::of::<bool>(), JsonType::Boolean);
    types.insert(NativeType::null(), JsonType::Null);
    types.insert(NativeType::list(), JsonType::Array);
    types.insert(NativeType::dict(), JsonType::Object);
    types.insert(NativeType::of::<DateTime<Utc>>(), JsonType::String);
    types.insert(NativeType::of::<DateTime<FixedOffset>>(), JsonType::String);
    types.insert(NativeType::of::<Uuid>(), JsonType::String);
    types
}

fn default_formats() -> IndexMap<NativeType, String> {
    let mut formats = IndexMap::new();
    formats.insert(NativeType::of::<DateTime<Utc>>(), "date-time".to_string());
    formats.insert(NativeType::of::<DateTime<FixedOffset>>(), "date-time".to_string());
    formats.insert(NativeType::of::<Uuid>(), "uuid".to_string());
    formats
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ObjectId;
    struct Slug;

    #[test]
    fn test_defaults() {
        let map = TypeMap::new();
        assert_eq!(map.json_type(&NativeType::of::<String>()), Some(JsonType::String));
        assert_eq!(map.json_type(&NativeType::of::<u16>()), Some(JsonType::Integer));
        assert_eq!(map.json_type(&NativeType::of::<f32>()), Some(JsonType::Number));
        assert_eq!(map.json_type(&NativeType::null()), Some(JsonType::Null));
        assert_eq!(map.json_type(&NativeType::list()), Some(JsonType::Array));
        assert_eq!(map.json_type(&NativeType::of::<Vec<u8>>()), None);
        assert_eq!(map.format_for(&[NativeType::of::<Uuid>()]), Some("uuid"));
        assert_eq!(map.format_for(&[NativeType::of::<String>()]), None);
    }

    #[test]
    fn test_update_and_reset() {
        let mut map = TypeMap::new();
        map.update_types([(NativeType::of::<ObjectId>(), JsonType::String)]);
        map.update_formats([(NativeType::of::<ObjectId>(), "objectid")]);
        assert_eq!(map.json_type(&NativeType::of::<ObjectId>()), Some(JsonType::String));
        assert_eq!(map.format_for(&[NativeType::of::<ObjectId>()]), Some("objectid"));

        map.reset_types();
        map.reset_formats();
        assert_eq!(map, TypeMap::new());

        map.reset_types();
        assert_eq!(map, TypeMap::new());
    }

    #[test]
    fn test_first_format_match_wins() {
        let map = TypeMap::empty()
            .with_format::<Slug>("slug")
            .with_format::<String>("plain");

        let lineage = [NativeType::of::<String>(), NativeType::of::<Slug>()];
        assert_eq!(map.format_for(&lineage), Some("slug"));
        assert_eq!(map.format_for(&lineage[..1]), Some("plain"));
    }
}
