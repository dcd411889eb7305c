//! Structured-output schema for the generation service.
//!
//! The schema is derived from [`FullPlayAnalysis`] via `schemars` and then
//! rewritten into the OpenAPI subset Gemini accepts as `responseSchema`:
//! references are inlined, type names are upper-cased and optional fields
//! become `nullable`.

use std::sync::LazyLock;

use serde_json::{Map, Value};

use crate::analysis::FullPlayAnalysis;

/// Field order requested from the model for each side.
const SIDE_FIELD_ORDER: [&str; 7] = [
    "summary",
    "play_type",
    "formation",
    "personnel",
    "key_players",
    "coach_feedback",
    "details",
];

const FEEDBACK_FIELD: &str = "coach_feedback";

static BASE_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    let root = schemars::schema_for!(FullPlayAnalysis);
    let root = serde_json::to_value(&root).unwrap_or_default();
    let definitions = root
        .get("definitions")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    to_gemini(&root, &definitions)
});

/// Build the response schema for a generation request.
///
/// With a persona, `coach_feedback` is required on both sides; without one
/// it is left out entirely.
pub fn response_schema(persona_enabled: bool) -> Value {
    let mut schema = BASE_SCHEMA.clone();

    if let Some(root) = schema.as_object_mut() {
        root.insert(
            "propertyOrdering".to_string(),
            Value::from(vec!["offense", "defense"]),
        );
    }

    for side in ["offense", "defense"] {
        let Some(side_schema) = schema
            .pointer_mut(&format!("/properties/{side}"))
            .and_then(Value::as_object_mut)
        else {
            continue;
        };

        if persona_enabled {
            if let Some(feedback) = side_schema
                .get_mut("properties")
                .and_then(|p| p.get_mut(FEEDBACK_FIELD))
                .and_then(Value::as_object_mut)
            {
                feedback.remove("nullable");
            }
            if let Some(required) = side_schema.get_mut("required").and_then(Value::as_array_mut) {
                if !required.iter().any(|r| r == FEEDBACK_FIELD) {
                    required.push(Value::from(FEEDBACK_FIELD));
                }
            }
        } else if let Some(props) = side_schema
            .get_mut("properties")
            .and_then(Value::as_object_mut)
        {
            props.remove(FEEDBACK_FIELD);
        }

        let ordering: Vec<&str> = SIDE_FIELD_ORDER
            .iter()
            .copied()
            .filter(|f| persona_enabled || *f != FEEDBACK_FIELD)
            .collect();
        side_schema.insert("propertyOrdering".to_string(), Value::from(ordering));
    }

    schema
}

/// Rewrite one JSON Schema node into Gemini's schema dialect.
fn to_gemini(node: &Value, definitions: &Map<String, Value>) -> Value {
    let Some(obj) = node.as_object() else {
        return node.clone();
    };

    // "$ref" and single-element "allOf" (schemars wraps documented refs) are inlined
    let referenced = obj
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| definitions.get(r.rsplit('/').next().unwrap_or(r)))
        .or_else(|| {
            obj.get("allOf")
                .and_then(Value::as_array)
                .filter(|all| all.len() == 1)
                .and_then(|all| all.first())
        });

    if let Some(target) = referenced {
        let mut resolved = to_gemini(target, definitions);
        if let (Some(desc), Some(map)) = (obj.get("description"), resolved.as_object_mut()) {
            map.insert("description".to_string(), desc.clone());
        }
        return resolved;
    }

    let mut out = Map::new();

    match obj.get("type") {
        Some(Value::String(t)) => {
            out.insert("type".to_string(), Value::from(t.to_uppercase()));
        }
        Some(Value::Array(types)) => {
            let concrete: Vec<&str> = types
                .iter()
                .filter_map(Value::as_str)
                .filter(|t| *t != "null")
                .collect();
            if let Some(t) = concrete.first() {
                out.insert("type".to_string(), Value::from(t.to_uppercase()));
            }
            if concrete.len() < types.len() {
                out.insert("nullable".to_string(), Value::Bool(true));
            }
        }
        _ => {}
    }

    if let Some(desc) = obj.get("description") {
        out.insert("description".to_string(), desc.clone());
    }

    if let Some(items) = obj.get("items") {
        out.insert("items".to_string(), to_gemini(items, definitions));
    }

    if let Some(props) = obj.get("properties").and_then(Value::as_object) {
        let converted: Map<String, Value> = props
            .iter()
            .map(|(name, schema)| (name.clone(), to_gemini(schema, definitions)))
            .collect();
        out.insert("properties".to_string(), Value::Object(converted));
    }

    if let Some(required) = obj.get("required") {
        out.insert("required".to_string(), required.clone());
    }

    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required_of(schema: &Value, side: &str) -> Vec<String> {
        schema["properties"][side]["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_schema_nests_both_sides() {
        let schema = response_schema(false);

        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["offense"]["type"], "OBJECT");
        assert_eq!(schema["properties"]["defense"]["type"], "OBJECT");
        assert!(schema.get("definitions").is_none());
        assert!(schema.get("$schema").is_none());
    }

    #[test]
    fn test_schema_field_types() {
        let schema = response_schema(false);
        let props = &schema["properties"]["offense"]["properties"];

        assert_eq!(props["summary"]["type"], "STRING");
        assert_eq!(props["key_players"]["type"], "ARRAY");
        assert_eq!(props["key_players"]["items"]["type"], "STRING");
        assert!(props["details"]["description"]
            .as_str()
            .unwrap()
            .contains("bulleted"));
    }

    #[test]
    fn test_schema_without_persona_omits_feedback() {
        let schema = response_schema(false);

        assert!(schema["properties"]["offense"]["properties"]
            .get("coach_feedback")
            .is_none());
        let required = required_of(&schema, "offense");
        for field in ["summary", "play_type", "formation", "personnel", "key_players", "details"] {
            assert!(required.contains(&field.to_string()), "missing {field}");
        }
        assert!(!required.contains(&"coach_feedback".to_string()));
    }

    #[test]
    fn test_schema_with_persona_requires_feedback() {
        let schema = response_schema(true);
        let feedback = &schema["properties"]["defense"]["properties"]["coach_feedback"];

        assert_eq!(feedback["type"], "STRING");
        assert!(feedback.get("nullable").is_none());
        assert!(required_of(&schema, "defense").contains(&"coach_feedback".to_string()));
    }

    #[test]
    fn test_property_ordering_follows_declaration() {
        let schema = response_schema(false);
        let ordering = schema["properties"]["offense"]["propertyOrdering"]
            .as_array()
            .unwrap();

        assert_eq!(ordering.first().unwrap(), "summary");
        assert_eq!(ordering.last().unwrap(), "details");
        assert_eq!(ordering.len(), 6);
    }
}
