//! The closed type descriptor algebra.

use bridge_primitives::{
    CodecError, CodecResult, Fields, HostValue, PointerEnvelope, PrimitiveKind, TYPE_MARKER,
    embedded_type_tag,
};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::Codec;
use crate::coerce;

/// Shape of a value exchanged with a client, independent of wire encoding.
///
/// Every variant encodes a [`HostValue`] to a wire value with
/// [`serialize`](Self::serialize) and decodes wire data with
/// [`deserialize`](Self::deserialize).
#[derive(Clone, Debug, PartialEq)]
pub enum TypeDescriptor {
    /// Scalar coerced to a primitive kind.
    Primitive(PrimitiveKind),
    /// Homogeneous sequence.
    Array(Box<TypeDescriptor>),
    /// Structured value with named properties.
    Object(ObjectDescriptor),
    /// One of several shapes, tried in declared order.
    Union(Vec<TypeDescriptor>),
    /// Nullable wrapper.
    Optional(Box<TypeDescriptor>),
    /// Anything; resolved structurally or through the registries.
    Any,
}

impl TypeDescriptor {
    /// Integer primitive.
    pub const INT: Self = Self::Primitive(PrimitiveKind::Int);
    /// Float primitive.
    pub const FLOAT: Self = Self::Primitive(PrimitiveKind::Float);
    /// String primitive.
    pub const STRING: Self = Self::Primitive(PrimitiveKind::String);
    /// Boolean primitive.
    pub const BOOL: Self = Self::Primitive(PrimitiveKind::Bool);

    /// Array of `items`.
    #[must_use]
    pub fn array(items: Self) -> Self {
        Self::Array(Box::new(items))
    }

    /// Nullable `inner`.
    #[must_use]
    pub fn optional(inner: Self) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Union of `variants`; order is significant, most specific first.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidDescriptor`] with fewer than two variants.
    pub fn union(variants: Vec<Self>) -> CodecResult<Self> {
        if variants.len() < 2 {
            return Err(CodecError::InvalidDescriptor {
                reason: "union must have at least 2 variants".into(),
            });
        }
        Ok(Self::Union(variants))
    }

    /// Returns `true` for primitive descriptors.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Human-readable description of the shape.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Primitive(kind) => kind.json_type().to_owned(),
            Self::Array(items) => format!("array of {}", items.describe()),
            Self::Object(object) => object.describe(),
            Self::Union(variants) => {
                let rendered: Vec<_> = variants.iter().map(Self::describe).collect();
                format!("one of ({})", rendered.join(", "))
            }
            Self::Optional(inner) => format!("optional {}", inner.describe()),
            Self::Any => "any value".to_owned(),
        }
    }

    /// Encodes `value` according to this descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Coercion`] when a primitive cannot be coerced.
    /// Unions never fail.
    pub fn serialize(&self, value: &HostValue, cx: &Codec) -> CodecResult<Value> {
        match self {
            Self::Primitive(kind) => coerce::serialize(*kind, value),
            Self::Array(items) => match value {
                HostValue::List(values) => values
                    .iter()
                    .map(|item| items.serialize(item, cx))
                    .collect::<CodecResult<Vec<_>>>()
                    .map(Value::Array),
                single => Ok(Value::Array(vec![items.serialize(single, cx)?])),
            },
            Self::Object(object) => object.serialize(value, cx),
            Self::Union(variants) => Ok(serialize_union(variants, value, cx)),
            Self::Optional(inner) => match value {
                HostValue::Null => Ok(Value::Null),
                present => inner.serialize(present, cx),
            },
            Self::Any => Ok(cx.serialize_value(value)),
        }
    }

    /// Decodes wire data according to this descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Coercion`] or [`CodecError::TypeMismatch`] for
    /// bad input against a declared shape, and
    /// [`CodecError::UnknownReference`] for stale pointer envelopes.
    pub fn deserialize(&self, wire: &Value, cx: &Codec) -> CodecResult<HostValue> {
        match self {
            Self::Primitive(kind) => coerce::deserialize(*kind, wire),
            Self::Array(items) => match wire {
                Value::Array(values) => values
                    .iter()
                    .map(|item| items.deserialize(item, cx))
                    .collect::<CodecResult<Vec<_>>>()
                    .map(HostValue::List),
                single => Ok(HostValue::List(vec![items.deserialize(single, cx)?])),
            },
            Self::Object(object) => object.deserialize(wire, cx),
            Self::Union(variants) => Ok(deserialize_union(variants, wire, cx)),
            Self::Optional(inner) => match wire {
                Value::Null => Ok(HostValue::Null),
                present => inner.deserialize(present, cx),
            },
            Self::Any => deserialize_any(wire, cx),
        }
    }
}

impl From<ObjectDescriptor> for TypeDescriptor {
    fn from(value: ObjectDescriptor) -> Self {
        Self::Object(value)
    }
}

impl From<PrimitiveKind> for TypeDescriptor {
    fn from(value: PrimitiveKind) -> Self {
        Self::Primitive(value)
    }
}

fn serialize_union(variants: &[TypeDescriptor], value: &HostValue, cx: &Codec) -> Value {
    for variant in variants {
        match variant.serialize(value, cx) {
            Ok(wire) => return wire,
            Err(err) => trace!(%err, variant = %variant.describe(), "union variant rejected value"),
        }
    }
    debug!(kind = value.kind_name(), "no union variant matched; stringifying");
    Value::String(value.to_string())
}

fn deserialize_union(variants: &[TypeDescriptor], wire: &Value, cx: &Codec) -> HostValue {
    if let Some(tag) = embedded_type_tag(wire) {
        let tagged = variants.iter().find(|variant| {
            matches!(variant, TypeDescriptor::Object(object) if object.type_tag() == Some(tag))
        });
        if let Some(variant) = tagged {
            match variant.deserialize(wire, cx) {
                Ok(value) => return value,
                Err(err) => trace!(%err, tag, "tagged union variant rejected data"),
            }
        }
    }
    for variant in variants {
        match variant.deserialize(wire, cx) {
            Ok(value) => return value,
            Err(err) => trace!(%err, variant = %variant.describe(), "union variant rejected data"),
        }
    }
    debug!("no union variant matched; passing data through");
    HostValue::from_json(wire)
}

fn deserialize_any(wire: &Value, cx: &Codec) -> CodecResult<HostValue> {
    if let Some(envelope) = PointerEnvelope::from_wire(wire) {
        return resolve_envelope(&envelope?, cx);
    }
    if let (Some(tag), Some(map)) = (embedded_type_tag(wire), wire.as_object()) {
        if let Some(factory) = cx.types().get(tag) {
            let fields = map
                .iter()
                .filter(|(key, _)| key.as_str() != TYPE_MARKER)
                .map(|(key, item)| -> CodecResult<(String, HostValue)> {
                    Ok((key.clone(), deserialize_any(item, cx)?))
                })
                .collect::<CodecResult<Fields>>()?;
            return factory.instantiate(fields).map(HostValue::Object);
        }
        trace!(tag, "type tag not registered; keeping structural value");
    }
    Ok(HostValue::from_json(wire))
}

fn resolve_envelope(envelope: &PointerEnvelope, cx: &Codec) -> CodecResult<HostValue> {
    cx.objects()
        .resolve(envelope.id())
        .map(HostValue::Object)
        .ok_or_else(|| CodecError::UnknownReference {
            id: envelope.id().to_owned(),
        })
}

/// Structured shape: named properties, the required subset, and an optional type tag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectDescriptor {
    properties: IndexMap<String, TypeDescriptor>,
    required: Vec<String>,
    type_tag: Option<String>,
    description: Option<String>,
}

impl ObjectDescriptor {
    /// Creates an empty, untagged object shape.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty object shape carrying `type_tag`.
    #[must_use]
    pub fn tagged(type_tag: impl Into<String>) -> Self {
        Self::new().with_type_tag(type_tag)
    }

    /// Adds (or replaces) a property.
    #[must_use]
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        descriptor: TypeDescriptor,
        required: bool,
    ) -> Self {
        let name = name.into();
        self.required.retain(|existing| existing != &name);
        if required {
            self.required.push(name.clone());
        }
        self.properties.insert(name, descriptor);
        self
    }

    /// Sets the type tag embedded in and checked against wire data.
    #[must_use]
    pub fn with_type_tag(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declared properties in order.
    #[must_use]
    pub fn properties(&self) -> &IndexMap<String, TypeDescriptor> {
        &self.properties
    }

    /// Names of the required properties.
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Optional type tag.
    #[must_use]
    pub fn type_tag(&self) -> Option<&str> {
        self.type_tag.as_deref()
    }

    /// Optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn describe(&self) -> String {
        let head = self
            .type_tag
            .as_ref()
            .map_or_else(|| "object".to_owned(), |tag| format!("{tag} object"));
        if self.properties.is_empty() {
            return head;
        }
        let fields: Vec<_> = self
            .properties
            .iter()
            .map(|(name, descriptor)| format!("{name}: {}", descriptor.describe()))
            .collect();
        format!("{head} with fields {}", fields.join(", "))
    }

    fn serialize(&self, value: &HostValue, cx: &Codec) -> CodecResult<Value> {
        let source = match value {
            HostValue::Map(fields) => fields.clone(),
            HostValue::Object(object) => object.fields().unwrap_or_else(|| wrap(value)),
            other => wrap(other),
        };

        let mut result = Map::new();
        if let Some(tag) = &self.type_tag {
            result.insert(TYPE_MARKER.to_owned(), Value::String(tag.clone()));
        }
        for (name, descriptor) in &self.properties {
            if let Some(item) = source.get(name) {
                result.insert(name.clone(), descriptor.serialize(item, cx)?);
            }
        }
        Ok(Value::Object(result))
    }

    fn deserialize(&self, wire: &Value, cx: &Codec) -> CodecResult<HostValue> {
        if let Some(envelope) = PointerEnvelope::from_wire(wire) {
            let envelope = envelope?;
            self.check_tag(envelope.type_name())?;
            return resolve_envelope(&envelope, cx);
        }
        let Value::Object(map) = wire else {
            return Ok(HostValue::from_json(wire));
        };
        if let Some(found) = embedded_type_tag(wire) {
            self.check_tag(found)?;
        }

        let mut fields = Fields::new();
        for (name, descriptor) in &self.properties {
            if let Some(item) = map.get(name) {
                fields.insert(name.clone(), descriptor.deserialize(item, cx)?);
            }
        }
        Ok(HostValue::Map(fields))
    }

    fn check_tag(&self, found: &str) -> CodecResult<()> {
        match &self.type_tag {
            Some(expected) if expected != found => Err(CodecError::TypeMismatch {
                expected: expected.clone(),
                found: found.to_owned(),
            }),
            _ => Ok(()),
        }
    }
}

fn wrap(value: &HostValue) -> Fields {
    let mut fields = Fields::new();
    fields.insert("value".to_owned(), value.clone());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use bridge_primitives::{POINTER_MARKER, Record};
    use serde_json::json;

    fn point() -> TypeDescriptor {
        ObjectDescriptor::tagged("Point")
            .with_property("x", TypeDescriptor::INT, true)
            .with_property("y", TypeDescriptor::INT, true)
            .into()
    }

    fn fields(pairs: &[(&str, HostValue)]) -> Fields {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), value.clone()))
            .collect()
    }

    #[test]
    fn array_round_trips_element_wise() {
        let cx = Codec::default();
        let descriptor = TypeDescriptor::array(TypeDescriptor::FLOAT);
        let value = HostValue::List(vec![HostValue::Int(1), HostValue::Float(2.5)]);

        let wire = descriptor.serialize(&value, &cx).unwrap();
        assert_eq!(wire, json!([1.0, 2.5]));
        assert_eq!(
            descriptor.deserialize(&wire, &cx).unwrap(),
            HostValue::List(vec![HostValue::Float(1.0), HostValue::Float(2.5)])
        );
    }

    #[test]
    fn array_lifts_bare_scalars() {
        let cx = Codec::default();
        let descriptor = TypeDescriptor::array(TypeDescriptor::INT);
        assert_eq!(descriptor.serialize(&HostValue::Int(4), &cx).unwrap(), json!([4]));
        assert_eq!(
            descriptor.deserialize(&json!("4"), &cx).unwrap(),
            HostValue::List(vec![HostValue::Int(4)])
        );
    }

    #[test]
    fn object_deserializes_declared_properties() {
        let cx = Codec::default();
        let value = point().deserialize(&json!({"x": "3", "y": 4, "z": 9}), &cx).unwrap();
        assert_eq!(
            value,
            HostValue::Map(fields(&[("x", HostValue::Int(3)), ("y", HostValue::Int(4))]))
        );
    }

    #[test]
    fn object_rejects_mismatched_tag() {
        let cx = Codec::default();
        let err = point()
            .deserialize(&json!({"__mcp_type__": "Bar", "x": 1}), &cx)
            .expect_err("tag mismatch");
        assert!(
            matches!(err, CodecError::TypeMismatch { expected, found } if expected == "Point" && found == "Bar")
        );
        assert!(point().deserialize(&json!({"__mcp_type__": "Point", "x": 1}), &cx).is_ok());
    }

    #[test]
    fn object_serializes_tag_and_declared_fields() {
        let cx = Codec::default();
        let object = Record::shared(
            "Point",
            fields(&[
                ("x", HostValue::Int(1)),
                ("y", HostValue::from("2")),
                ("secret", HostValue::from("hidden")),
            ]),
        );
        let wire = point().serialize(&HostValue::Object(object), &cx).unwrap();
        assert_eq!(wire, json!({"__mcp_type__": "Point", "x": 1, "y": 2}));

        let partial = point()
            .serialize(&HostValue::Map(fields(&[("x", HostValue::Int(5))])), &cx)
            .unwrap();
        assert_eq!(partial, json!({"__mcp_type__": "Point", "x": 5}));
    }

    #[test]
    fn object_propagates_property_errors() {
        let cx = Codec::default();
        let err = point()
            .deserialize(&json!({"x": "three"}), &cx)
            .expect_err("coercion");
        assert!(matches!(err, CodecError::Coercion { .. }));
    }

    #[test]
    fn object_resolves_pointer_envelopes() {
        let cx = Codec::default();
        let object = Record::shared("Point", Fields::new());
        let wire = cx.serialize_value(&HostValue::Object(Arc::clone(&object)));

        let resolved = point().deserialize(&wire, &cx).unwrap();
        assert!(Arc::ptr_eq(resolved.as_object().expect("object"), &object));

        let other = TypeDescriptor::from(ObjectDescriptor::tagged("Line"));
        let err = other.deserialize(&wire, &cx).expect_err("mismatch");
        assert!(matches!(err, CodecError::TypeMismatch { .. }));
    }

    #[test]
    fn union_picks_first_matching_variant() {
        let cx = Codec::default();
        let descriptor =
            TypeDescriptor::union(vec![TypeDescriptor::INT, TypeDescriptor::STRING]).unwrap();

        assert_eq!(descriptor.serialize(&HostValue::Int(5), &cx).unwrap(), json!(5));
        assert_eq!(descriptor.serialize(&HostValue::from("abc"), &cx).unwrap(), json!("abc"));
        assert_eq!(descriptor.deserialize(&json!(5), &cx).unwrap(), HostValue::Int(5));
        assert_eq!(
            descriptor.deserialize(&json!("abc"), &cx).unwrap(),
            HostValue::from("abc")
        );
    }

    #[test]
    fn union_falls_back_when_nothing_matches() {
        let cx = Codec::default();
        let descriptor =
            TypeDescriptor::union(vec![TypeDescriptor::INT, TypeDescriptor::FLOAT]).unwrap();

        assert_eq!(descriptor.serialize(&HostValue::from("x"), &cx).unwrap(), json!("x"));
        let list = HostValue::List(vec![HostValue::Int(1)]);
        assert_eq!(descriptor.serialize(&list, &cx).unwrap(), json!("[1]"));
        assert_eq!(
            descriptor.deserialize(&json!({"k": "v"}), &cx).unwrap(),
            HostValue::Map(fields(&[("k", HostValue::from("v"))]))
        );
    }

    #[test]
    fn union_prefers_tagged_object_variant() {
        let cx = Codec::default();
        let line: TypeDescriptor = ObjectDescriptor::tagged("Line")
            .with_property("length", TypeDescriptor::FLOAT, true)
            .into();
        let descriptor = TypeDescriptor::union(vec![line, point()]).unwrap();

        let value = descriptor
            .deserialize(&json!({"__mcp_type__": "Point", "x": "1", "y": 2}), &cx)
            .unwrap();
        assert_eq!(
            value,
            HostValue::Map(fields(&[("x", HostValue::Int(1)), ("y", HostValue::Int(2))]))
        );
    }

    #[test]
    fn union_requires_two_variants() {
        let err = TypeDescriptor::union(vec![TypeDescriptor::INT]).expect_err("too small");
        assert!(matches!(err, CodecError::InvalidDescriptor { .. }));
    }

    #[test]
    fn optional_passes_null_through() {
        let cx = Codec::default();
        let descriptor = TypeDescriptor::optional(TypeDescriptor::INT);
        assert_eq!(descriptor.serialize(&HostValue::Null, &cx).unwrap(), Value::Null);
        assert_eq!(descriptor.deserialize(&Value::Null, &cx).unwrap(), HostValue::Null);
        assert_eq!(descriptor.deserialize(&json!("7"), &cx).unwrap(), HostValue::Int(7));
        assert!(descriptor.deserialize(&json!("seven"), &cx).is_err());
    }

    #[test]
    fn any_resolves_live_references() {
        let cx = Codec::default();
        let object = Record::shared("Calculator", fields(&[("value", HostValue::Int(0))]));
        let wire = TypeDescriptor::Any
            .serialize(&HostValue::Object(Arc::clone(&object)), &cx)
            .unwrap();
        assert_eq!(wire[POINTER_MARKER], json!(true));

        let resolved = TypeDescriptor::Any.deserialize(&wire, &cx).unwrap();
        assert!(Arc::ptr_eq(resolved.as_object().expect("object"), &object));
    }

    #[test]
    fn any_reports_stale_references() {
        let cx = Codec::default();
        let object = Record::shared("Calculator", Fields::new());
        let wire = cx.serialize_value(&HostValue::Object(object));

        let err = TypeDescriptor::Any.deserialize(&wire, &cx).expect_err("expired");
        assert!(matches!(err, CodecError::UnknownReference { .. }));
    }

    #[test]
    fn any_reconstructs_registered_types() {
        let cx = Codec::default();
        cx.types().register_record("Point");

        let value = TypeDescriptor::Any
            .deserialize(&json!({"__mcp_type__": "Point", "x": 1, "y": [2]}), &cx)
            .unwrap();
        let object = value.as_object().expect("object");
        let record = object.downcast_ref::<Record>().expect("record");
        assert_eq!(object.type_name(), "Point");
        assert_eq!(record.get("x"), Some(&HostValue::Int(1)));
        assert_eq!(record.get("y"), Some(&HostValue::List(vec![HostValue::Int(2)])));
        assert!(record.get(TYPE_MARKER).is_none());

        let unknown = TypeDescriptor::Any
            .deserialize(&json!({"__mcp_type__": "Unknown", "x": 1}), &cx)
            .unwrap();
        assert!(unknown.as_map().is_some());
    }

    #[test]
    fn describe_renders_nested_shapes() {
        let descriptor = TypeDescriptor::optional(TypeDescriptor::array(point()));
        assert_eq!(
            descriptor.describe(),
            "optional array of Point object with fields x: integer, y: integer"
        );
    }
}
