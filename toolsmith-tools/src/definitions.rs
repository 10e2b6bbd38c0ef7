//! Hoisting of nested schema definitions
//!
//! Structured parameter types bring their own `$defs` (or `definitions`)
//! blocks. Vendors expect a single shared block, so every nested block is
//! lifted into one top-level `definitions` object.

use crate::error::SchemaError;
use serde_json::{Map, Value};

const DEFINITIONS: &str = "definitions";
const DEFINITION_KEYS: [&str; 2] = [DEFINITIONS, "$defs"];

/// Move every `definitions`/`$defs` block in `tree` into one top-level
/// `definitions` object.
///
/// Blocks are merged in traversal order, so on a name collision the last
/// block seen wins. The consumed keys are removed from their parents and
/// `$ref` pointers are left as they are. Definition blocks that are not
/// objects are dropped.
pub fn hoist_definitions(tree: Value) -> Value {
    let mut collected = Map::new();
    let mut tree = strip_definitions(tree, &mut collected);

    if !collected.is_empty() {
        if let Value::Object(root) = &mut tree {
            root.insert(DEFINITIONS.to_string(), Value::Object(collected));
        }
    }
    tree
}

/// [`hoist_definitions`] applied to a parameter map.
///
/// Only the schema fragments of the parameters are searched, so parameters
/// named `definitions` or `$defs` keep their own schema. A parameter named
/// `definitions` is rejected when there are definitions to hoist, since the
/// hoisted block would replace it.
pub fn hoist_property_definitions(
    properties: Map<String, Value>,
) -> Result<Map<String, Value>, SchemaError> {
    let mut collected = Map::new();
    let mut hoisted: Map<String, Value> = properties
        .into_iter()
        .map(|(name, fragment)| (name, strip_definitions(fragment, &mut collected)))
        .collect();

    if collected.is_empty() {
        return Ok(hoisted);
    }
    if hoisted.contains_key(DEFINITIONS) {
        return Err(SchemaError::ReservedName {
            parameter: DEFINITIONS.to_string(),
        });
    }
    hoisted.insert(DEFINITIONS.to_string(), Value::Object(collected));
    Ok(hoisted)
}

fn strip_definitions(value: Value, collected: &mut Map<String, Value>) -> Value {
    match value {
        Value::Object(map) => {
            let mut kept = Map::with_capacity(map.len());
            for (key, value) in map {
                if DEFINITION_KEYS.contains(&key.as_str()) {
                    if let Value::Object(definitions) = value {
                        for (name, definition) in definitions {
                            let definition = strip_definitions(definition, collected);
                            collected.insert(name, definition);
                        }
                    }
                } else {
                    kept.insert(key, strip_definitions(value, collected));
                }
            }
            Value::Object(kept)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| strip_definitions(item, collected))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn count_definition_keys(value: &Value) -> usize {
        match value {
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| {
                    usize::from(DEFINITION_KEYS.contains(&key.as_str())) + count_definition_keys(value)
                })
                .sum(),
            Value::Array(items) => items.iter().map(count_definition_keys).sum(),
            _ => 0,
        }
    }

    #[test]
    fn test_hoists_nested_defs() {
        let tree = json!({
            "owner": {
                "type": "object",
                "properties": {"address": {"$ref": "#/$defs/Address"}},
                "$defs": {"Address": {"type": "object", "properties": {"city": {"type": "string"}}}}
            },
            "count": {"type": "integer"}
        });

        assert_eq!(
            hoist_definitions(tree),
            json!({
                "owner": {
                    "type": "object",
                    "properties": {"address": {"$ref": "#/$defs/Address"}}
                },
                "count": {"type": "integer"},
                "definitions": {
                    "Address": {"type": "object", "properties": {"city": {"type": "string"}}}
                }
            })
        );
    }

    #[test]
    fn test_last_definition_wins() {
        let tree = json!({
            "a": {"definitions": {"Shared": {"title": "first"}}},
            "b": {"anyOf": [{"$defs": {"Shared": {"title": "second"}}}, {"type": "null"}]}
        });

        let hoisted = hoist_definitions(tree);
        assert_eq!(hoisted["definitions"]["Shared"], json!({"title": "second"}));
        assert_eq!(hoisted["a"], json!({}));
        assert_eq!(hoisted["b"]["anyOf"][0], json!({}));
    }

    #[test]
    fn test_definitions_inside_definitions() {
        let tree = json!({
            "x": {"$defs": {"Outer": {"$defs": {"Inner": {"type": "string"}}, "type": "object"}}}
        });

        let hoisted = hoist_definitions(tree);
        assert_eq!(hoisted["definitions"]["Outer"], json!({"type": "object"}));
        assert_eq!(hoisted["definitions"]["Inner"], json!({"type": "string"}));
    }

    #[test]
    fn test_parameters_named_like_definition_blocks() {
        let properties = json!({
            "$defs": {"type": "object", "description": "Terms to define"},
            "shape": {"type": "object", "$defs": {"Point": {"type": "object"}}}
        });
        let hoisted =
            hoist_property_definitions(properties.as_object().cloned().unwrap()).unwrap();
        assert_eq!(
            Value::Object(hoisted),
            json!({
                "$defs": {"type": "object", "description": "Terms to define"},
                "shape": {"type": "object"},
                "definitions": {"Point": {"type": "object"}}
            })
        );

        let plain = json!({"definitions": {"type": "object", "description": "Terms to define"}});
        let kept = hoist_property_definitions(plain.as_object().cloned().unwrap()).unwrap();
        assert_eq!(Value::Object(kept), plain);

        let clashing = json!({
            "definitions": {"type": "object"},
            "shape": {"$defs": {"Point": {"type": "object"}}}
        });
        let err = hoist_property_definitions(clashing.as_object().cloned().unwrap()).unwrap_err();
        assert!(matches!(err, SchemaError::ReservedName { ref parameter } if parameter == "definitions"));
    }

    #[test]
    fn test_no_definitions_is_untouched() {
        let tree = json!({"a": {"type": "string"}});
        assert_eq!(hoist_definitions(tree.clone()), tree);
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,6}".prop_map(Value::from),
        ];
        leaf.prop_recursive(4, 64, 6, |inner| {
            let key = prop_oneof![
                Just("definitions".to_string()),
                Just("$defs".to_string()),
                "[a-z]{1,4}",
            ];
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::vec((key, inner), 0..4)
                    .prop_map(|entries| Value::Object(entries.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn test_hoisting_leaves_one_definitions_block(
            entries in prop::collection::vec(("[a-z]{1,4}", arb_json()), 0..4)
        ) {
            let tree = Value::Object(entries.into_iter().collect());
            let hoisted = hoist_definitions(tree);
            let root = hoisted.as_object().cloned().unwrap_or_default();

            let nested: usize = root
                .iter()
                .filter(|(key, _)| key.as_str() != "definitions")
                .map(|(_, value)| count_definition_keys(value))
                .sum();
            prop_assert_eq!(nested, 0);
            prop_assert!(!root.contains_key("$defs"));

            if let Some(definitions) = root.get("definitions") {
                let definitions = definitions.as_object().cloned().unwrap_or_default();
                prop_assert!(!definitions.is_empty());
                for definition in definitions.values() {
                    prop_assert_eq!(count_definition_keys(definition), 0);
                }
            }
        }
    }
}
