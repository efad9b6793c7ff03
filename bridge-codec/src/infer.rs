//! Descriptor synthesis from sample values.

use bridge_primitives::{Fields, HostValue};

use crate::{ObjectDescriptor, TypeDescriptor};

/// Infers a descriptor from a sample `value`.
///
/// Sequences infer their item shape from the first element; an empty sequence
/// is an array of strings. Mappings and attribute-bearing objects infer object
/// shapes with every key required, objects additionally carrying their type
/// name as tag. Null, opaque objects, and anything nested deeper than
/// `max_depth` degrade to [`TypeDescriptor::Any`].
#[must_use]
pub fn infer(value: &HostValue, max_depth: usize) -> TypeDescriptor {
    infer_at(value, 0, max_depth)
}

fn infer_at(value: &HostValue, depth: usize, max_depth: usize) -> TypeDescriptor {
    if depth > max_depth {
        return TypeDescriptor::Any;
    }
    match value {
        HostValue::Null => TypeDescriptor::Any,
        HostValue::Bool(_) => TypeDescriptor::BOOL,
        HostValue::Int(_) => TypeDescriptor::INT,
        HostValue::Float(_) => TypeDescriptor::FLOAT,
        HostValue::Str(_) => TypeDescriptor::STRING,
        HostValue::List(items) => TypeDescriptor::array(
            items
                .first()
                .map_or(TypeDescriptor::STRING, |first| infer_at(first, depth + 1, max_depth)),
        ),
        HostValue::Map(fields) => infer_fields(ObjectDescriptor::new(), fields, depth, max_depth),
        HostValue::Object(object) => match object.fields() {
            Some(fields) => infer_fields(
                ObjectDescriptor::tagged(object.type_name()),
                &fields,
                depth,
                max_depth,
            ),
            None => TypeDescriptor::Any,
        },
    }
}

fn infer_fields(
    shape: ObjectDescriptor,
    fields: &Fields,
    depth: usize,
    max_depth: usize,
) -> TypeDescriptor {
    fields
        .iter()
        .fold(shape, |shape, (name, item)| {
            shape.with_property(name.clone(), infer_at(item, depth + 1, max_depth), true)
        })
        .into()
}
