//! Discovery schema projection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{ObjectDescriptor, TypeDescriptor};

/// How non-primitive descriptors are advertised to clients.
///
/// The policy must match how arguments actually travel: under
/// [`OpaqueString`](Self::OpaqueString) every non-primitive argument arrives as
/// a JSON-encoded string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPolicy {
    /// Arrays, objects, and unions project to native JSON Schema shapes.
    #[default]
    Structural,
    /// Non-primitive shapes project to a described string.
    #[serde(alias = "opaque")]
    OpaqueString,
}

impl SchemaPolicy {
    /// Returns `true` when `descriptor` travels as a JSON-encoded string.
    #[must_use]
    pub fn is_string_encoded(self, descriptor: &TypeDescriptor) -> bool {
        match (self, descriptor) {
            (Self::Structural, _) => false,
            (Self::OpaqueString, TypeDescriptor::Optional(inner)) => self.is_string_encoded(inner),
            (Self::OpaqueString, other) => !other.is_primitive(),
        }
    }
}

impl fmt::Display for SchemaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structural => f.write_str("structural"),
            Self::OpaqueString => f.write_str("opaque_string"),
        }
    }
}

impl FromStr for SchemaPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structural" => Ok(Self::Structural),
            "opaque" | "opaque_string" | "opaque-string" => Ok(Self::OpaqueString),
            other => Err(format!("unknown schema policy `{other}`")),
        }
    }
}

/// Projects `descriptor` to a client-facing JSON Schema fragment.
#[must_use]
pub fn project(descriptor: &TypeDescriptor, policy: SchemaPolicy) -> Value {
    match descriptor {
        TypeDescriptor::Primitive(kind) => json!({ "type": kind.json_type() }),
        TypeDescriptor::Optional(inner) => {
            json!({ "anyOf": [project(inner, policy), { "type": "null" }] })
        }
        other if policy == SchemaPolicy::OpaqueString => json!({
            "type": "string",
            "description": format!("JSON-encoded {}", other.describe()),
        }),
        TypeDescriptor::Array(items) => {
            json!({ "type": "array", "items": project(items, policy) })
        }
        TypeDescriptor::Object(object) => project_object(object, policy),
        TypeDescriptor::Union(variants) => {
            let variants: Vec<_> = variants.iter().map(|v| project(v, policy)).collect();
            json!({ "anyOf": variants })
        }
        TypeDescriptor::Any => Value::Object(Map::new()),
    }
}

fn project_object(object: &ObjectDescriptor, policy: SchemaPolicy) -> Value {
    let properties: Map<String, Value> = object
        .properties()
        .iter()
        .map(|(name, descriptor)| (name.clone(), project(descriptor, policy)))
        .collect();

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    schema.insert("required".into(), json!(object.required()));
    if let Some(tag) = object.type_tag() {
        schema.insert("x-mcp-type".into(), json!(tag));
    }
    if let Some(description) = object.description() {
        schema.insert("description".into(), json!(description));
    }
    Value::Object(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> TypeDescriptor {
        ObjectDescriptor::tagged("Point")
            .with_description("a point")
            .with_property("x", TypeDescriptor::INT, true)
            .with_property("label", TypeDescriptor::optional(TypeDescriptor::STRING), false)
            .into()
    }

    #[test]
    fn structural_projection_recurses() {
        let descriptor = TypeDescriptor::array(point());
        assert_eq!(
            project(&descriptor, SchemaPolicy::Structural),
            json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "x": { "type": "integer" },
                        "label": { "anyOf": [{ "type": "string" }, { "type": "null" }] }
                    },
                    "required": ["x"],
                    "x-mcp-type": "Point",
                    "description": "a point"
                }
            })
        );
    }

    #[test]
    fn unions_and_any_project_structurally() {
        let union =
            TypeDescriptor::union(vec![TypeDescriptor::INT, TypeDescriptor::BOOL]).unwrap();
        assert_eq!(
            project(&union, SchemaPolicy::Structural),
            json!({ "anyOf": [{ "type": "integer" }, { "type": "boolean" }] })
        );
        assert_eq!(project(&TypeDescriptor::Any, SchemaPolicy::Structural), json!({}));
    }

    #[test]
    fn opaque_projection_describes_strings() {
        let descriptor = TypeDescriptor::array(TypeDescriptor::FLOAT);
        assert_eq!(
            project(&descriptor, SchemaPolicy::OpaqueString),
            json!({ "type": "string", "description": "JSON-encoded array of number" })
        );
        assert_eq!(
            project(&TypeDescriptor::FLOAT, SchemaPolicy::OpaqueString),
            json!({ "type": "number" })
        );
        assert_eq!(
            project(&TypeDescriptor::optional(point()), SchemaPolicy::OpaqueString)["anyOf"][1],
            json!({ "type": "null" })
        );
    }

    #[test]
    fn policy_parses_and_classifies() {
        assert_eq!("Opaque".parse::<SchemaPolicy>().unwrap(), SchemaPolicy::OpaqueString);
        assert_eq!("structural".parse::<SchemaPolicy>().unwrap(), SchemaPolicy::Structural);
        assert!("weird".parse::<SchemaPolicy>().is_err());

        let optional_list = TypeDescriptor::optional(TypeDescriptor::array(TypeDescriptor::INT));
        assert!(SchemaPolicy::OpaqueString.is_string_encoded(&optional_list));
        assert!(!SchemaPolicy::OpaqueString.is_string_encoded(&TypeDescriptor::INT));
        assert!(
            !SchemaPolicy::OpaqueString
                .is_string_encoded(&TypeDescriptor::optional(TypeDescriptor::STRING))
        );
        assert!(!SchemaPolicy::Structural.is_string_encoded(&optional_list));
    }
}
