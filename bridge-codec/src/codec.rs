//! The codec context: registries plus encoding policy.

use std::sync::Arc;

use bridge_primitives::{CodecResult, HostValue, ObjectRef, POINTER_MARKER, PointerEnvelope};
use bridge_registry::{ObjectRegistry, TypeRegistry};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{SchemaPolicy, TypeDescriptor, infer, project};

/// Nesting depth beyond which inference gives up and yields `Any`.
pub const DEFAULT_MAX_INFERENCE_DEPTH: usize = 32;

/// Shared state consulted while encoding and decoding values.
///
/// Cloning is cheap: both registries are reference counted, so clones observe
/// the same handles and factories.
#[derive(Clone, Debug)]
pub struct Codec {
    objects: Arc<ObjectRegistry>,
    types: Arc<TypeRegistry>,
    policy: SchemaPolicy,
    max_inference_depth: usize,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(Arc::default(), Arc::default())
    }
}

impl Codec {
    /// Creates a codec over the given registries with the structural policy.
    #[must_use]
    pub fn new(objects: Arc<ObjectRegistry>, types: Arc<TypeRegistry>) -> Self {
        Self {
            objects,
            types,
            policy: SchemaPolicy::default(),
            max_inference_depth: DEFAULT_MAX_INFERENCE_DEPTH,
        }
    }

    /// Sets the schema policy.
    #[must_use]
    pub fn with_policy(mut self, policy: SchemaPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the inference depth limit.
    #[must_use]
    pub fn with_max_inference_depth(mut self, depth: usize) -> Self {
        self.max_inference_depth = depth;
        self
    }

    /// Handle table for objects sent by reference.
    #[must_use]
    pub fn objects(&self) -> &Arc<ObjectRegistry> {
        &self.objects
    }

    /// Factories for inline-tagged payloads.
    #[must_use]
    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    /// Active schema policy.
    #[must_use]
    pub fn policy(&self) -> SchemaPolicy {
        self.policy
    }

    /// Nesting depth at which inference degrades to `Any`.
    #[must_use]
    pub fn max_inference_depth(&self) -> usize {
        self.max_inference_depth
    }

    /// Infers a descriptor for `value` using this codec's depth limit.
    #[must_use]
    pub fn infer(&self, value: &HostValue) -> TypeDescriptor {
        infer(value, self.max_inference_depth)
    }

    /// Encodes `value` against a declared descriptor.
    ///
    /// # Errors
    ///
    /// Propagates the descriptor's encoding errors.
    pub fn encode(&self, descriptor: &TypeDescriptor, value: &HostValue) -> CodecResult<Value> {
        descriptor.serialize(value, self)
    }

    /// Decodes wire data against a declared descriptor.
    ///
    /// # Errors
    ///
    /// Propagates the descriptor's decoding errors.
    pub fn decode(&self, descriptor: &TypeDescriptor, wire: &Value) -> CodecResult<HostValue> {
        descriptor.deserialize(wire, self)
    }

    /// Decodes a tool argument, honoring the schema policy.
    ///
    /// Under [`SchemaPolicy::OpaqueString`] a non-primitive argument arrives as
    /// a JSON-encoded string; it is parsed before decoding. A string that is
    /// not valid JSON is decoded as-is.
    ///
    /// # Errors
    ///
    /// Propagates the descriptor's decoding errors.
    pub fn decode_argument(
        &self,
        descriptor: &TypeDescriptor,
        wire: &Value,
    ) -> CodecResult<HostValue> {
        if let Value::String(text) = wire
            && self.policy.is_string_encoded(descriptor)
        {
            if let Ok(parsed) = serde_json::from_str::<Value>(text) {
                return descriptor.deserialize(&parsed, self);
            }
            debug!("string-encoded argument is not JSON; decoding verbatim");
        }
        descriptor.deserialize(wire, self)
    }

    /// Projects `descriptor` under this codec's policy.
    #[must_use]
    pub fn project(&self, descriptor: &TypeDescriptor) -> Value {
        project(descriptor, self.policy)
    }

    /// Encodes a value with no declared descriptor. Never fails.
    ///
    /// Null stays null. Attribute-bearing objects are registered and sent as
    /// a pointer envelope; opaque objects are stringified. A mapping that
    /// already is an envelope payload passes through unchanged. Everything
    /// else is encoded inline through an inferred descriptor, and stringified
    /// if that fails.
    #[must_use]
    pub fn serialize_value(&self, value: &HostValue) -> Value {
        match value {
            HostValue::Null => Value::Null,
            HostValue::Object(object) => self.serialize_object(object),
            HostValue::Map(fields)
                if fields.get(POINTER_MARKER) == Some(&HostValue::Bool(true)) =>
            {
                let passthrough: Map<String, Value> = fields
                    .iter()
                    .map(|(name, item)| (name.clone(), self.serialize_value(item)))
                    .collect();
                Value::Object(passthrough)
            }
            other => {
                let descriptor = self.infer(other);
                descriptor.serialize(other, self).unwrap_or_else(|err| {
                    debug!(%err, kind = other.kind_name(), "inferred encoding failed; stringifying");
                    Value::String(other.to_string())
                })
            }
        }
    }

    fn serialize_object(&self, object: &ObjectRef) -> Value {
        let Some(fields) = object.fields() else {
            return Value::String(object.display());
        };
        let id = self.objects.register(object);
        let attrs = fields.keys().cloned().collect();
        PointerEnvelope::new(object.type_name(), id, attrs).to_wire()
    }
}
