//! Wire-level markers and the pointer envelope layout.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{CodecError, CodecResult, ObjectId};

/// Key flagging a JSON object as a pointer envelope.
pub const POINTER_MARKER: &str = "__mcp_ptr__";

/// Key carrying the type tag of an inline structured payload.
pub const TYPE_MARKER: &str = "__mcp_type__";

/// Reference to a live host object, sent in place of an inline copy.
///
/// On the wire this is exactly
/// `{"__mcp_ptr__": true, "type": <tag>, "id": <handle>, "attrs": [<name>, ...]}`.
/// `attrs` is descriptive only and never used for reconstruction.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointerEnvelope {
    #[serde(rename = "__mcp_ptr__")]
    marker: bool,
    #[serde(rename = "type")]
    type_name: String,
    id: String,
    attrs: Vec<String>,
}

impl PointerEnvelope {
    /// Creates an envelope for a registered object.
    #[must_use]
    pub fn new(type_name: impl Into<String>, id: ObjectId, attrs: Vec<String>) -> Self {
        Self {
            marker: true,
            type_name: type_name.into(),
            id: id.to_string(),
            attrs,
        }
    }

    /// Parses an envelope out of wire data.
    ///
    /// Returns `None` when the data does not carry the pointer marker.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidEnvelope`] when the marker is present but
    /// the remaining keys do not form a valid envelope.
    pub fn from_wire(value: &Value) -> Option<CodecResult<Self>> {
        if !has_pointer_marker(value) {
            return None;
        }
        Some(
            Self::deserialize(value).map_err(|err| CodecError::InvalidEnvelope {
                reason: err.to_string(),
            }),
        )
    }

    /// Renders the envelope as a wire value with keys in canonical order.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        let mut map = Map::new();
        map.insert(POINTER_MARKER.to_owned(), Value::Bool(true));
        map.insert("type".to_owned(), Value::String(self.type_name.clone()));
        map.insert("id".to_owned(), Value::String(self.id.clone()));
        map.insert(
            "attrs".to_owned(),
            Value::Array(self.attrs.iter().cloned().map(Value::String).collect()),
        );
        Value::Object(map)
    }

    /// Type tag of the referenced object.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Handle of the referenced object, as carried on the wire.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Field names advertised for client introspection.
    #[must_use]
    pub fn attrs(&self) -> &[String] {
        &self.attrs
    }
}

/// Returns `true` when `value` is an object whose pointer marker is `true`.
#[must_use]
pub fn has_pointer_marker(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|map| map.get(POINTER_MARKER))
        .is_some_and(|marker| marker == &Value::Bool(true))
}

/// Returns the inline type tag embedded in `value`, if any.
#[must_use]
pub fn embedded_type_tag(value: &Value) -> Option<&str> {
    value.as_object()?.get(TYPE_MARKER)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_has_exact_wire_keys() {
        let id = ObjectId::random();
        let wire = PointerEnvelope::new("Calculator", id, vec!["value".into()]).to_wire();
        let keys: Vec<_> = wire.as_object().expect("object").keys().cloned().collect();
        assert_eq!(keys, vec![POINTER_MARKER, "type", "id", "attrs"]);
        assert_eq!(wire["id"], json!(id.to_string()));
    }

    #[test]
    fn parses_envelope_from_wire() {
        let id = ObjectId::random();
        let envelope = PointerEnvelope::new("Calculator", id, vec!["value".into()]);
        let parsed = PointerEnvelope::from_wire(&envelope.to_wire())
            .expect("marker present")
            .expect("valid envelope");
        assert_eq!(parsed, envelope);
        assert_eq!(parsed.id(), id.to_string());
        assert_eq!(parsed.attrs(), ["value"]);
    }

    #[test]
    fn malformed_envelope_is_rejected() {
        let wire = json!({"__mcp_ptr__": true, "type": "Calculator"});
        let err = PointerEnvelope::from_wire(&wire)
            .expect("marker present")
            .expect_err("missing id");
        assert!(matches!(err, CodecError::InvalidEnvelope { .. }));
    }

    #[test]
    fn unmarked_data_is_not_an_envelope() {
        assert!(PointerEnvelope::from_wire(&json!({"id": "x"})).is_none());
        assert!(PointerEnvelope::from_wire(&json!({"__mcp_ptr__": false})).is_none());
        assert_eq!(embedded_type_tag(&json!({"__mcp_type__": "Point"})), Some("Point"));
    }
}
