//! Dynamic host-side value model exchanged with tools.

use std::any::Any;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

/// Ordered, string-keyed fields of a mapping or structured object.
pub type Fields = IndexMap<String, HostValue>;

/// Shared reference to a live host object. Identity is pointer identity.
pub type ObjectRef = Arc<dyn HostObject>;

/// A structured runtime value with identity, owned by the host process.
///
/// Objects that expose [`fields`](HostObject::fields) are attribute-bearing:
/// the serializer hands them to clients by reference, listing the field
/// names for introspection. Objects returning `None` are opaque and are
/// rendered through [`display`](HostObject::display).
pub trait HostObject: Any + Send + Sync + fmt::Debug {
    /// Name of the object's type, embedded in envelopes and inferred tags.
    fn type_name(&self) -> &str;

    /// Snapshot of the enumerable named fields, if the object has any.
    fn fields(&self) -> Option<Fields> {
        None
    }

    /// Human-readable rendering used when the value has to be stringified.
    fn display(&self) -> String {
        format!("<{} object>", self.type_name())
    }

    /// Upcast used for downcasting back to the concrete type.
    fn as_any(&self) -> &dyn Any;
}

impl dyn HostObject {
    /// Returns the concrete object if it is of type `T`.
    #[must_use]
    pub fn downcast_ref<T: HostObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Runtime value flowing into and out of tools.
#[derive(Clone, Debug, Default)]
pub enum HostValue {
    /// Absence of a value.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating point scalar.
    Float(f64),
    /// String scalar.
    Str(String),
    /// Plain sequence with no identity of its own.
    List(Vec<HostValue>),
    /// Plain mapping with no identity of its own.
    Map(Fields),
    /// Structured object with identity.
    Object(ObjectRef),
}

impl HostValue {
    /// Converts an untyped wire value structurally, without any descriptor.
    ///
    /// Integers that fit in `i64` become [`HostValue::Int`]; every other
    /// number becomes [`HostValue::Float`].
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => number.as_i64().map_or_else(
                || Self::Float(number.as_f64().unwrap_or(f64::NAN)),
                Self::Int,
            ),
            Value::String(text) => Self::Str(text.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(key, item)| (key.clone(), Self::from_json(item)))
                    .collect(),
            ),
        }
    }

    /// Returns `true` for [`HostValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Truthiness used by boolean coercion.
    ///
    /// Null, `false`, zero, and empty strings or collections are false;
    /// everything else is true.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(flag) => *flag,
            Self::Int(number) => *number != 0,
            Self::Float(number) => *number != 0.0,
            Self::Str(text) => !text.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Map(fields) => !fields.is_empty(),
            Self::Object(_) => true,
        }
    }

    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }

    /// Returns the integer payload.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(number) => Some(*number),
            _ => None,
        }
    }

    /// Returns the string payload.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the list payload.
    #[must_use]
    pub fn as_list(&self) -> Option<&[HostValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the mapping payload.
    #[must_use]
    pub const fn as_map(&self) -> Option<&Fields> {
        match self {
            Self::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns the shared object payload.
    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Display for HostValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(text) => f.write_str(text),
            other => write_nested(other, f),
        }
    }
}

fn write_nested(value: &HostValue, f: &mut Formatter<'_>) -> fmt::Result {
    match value {
        HostValue::Null => f.write_str("null"),
        HostValue::Bool(flag) => write!(f, "{flag}"),
        HostValue::Int(number) => write!(f, "{number}"),
        HostValue::Float(number) => write_float(*number, f),
        HostValue::Str(text) => write!(f, "{}", Value::from(text.as_str())),
        HostValue::List(items) => {
            f.write_str("[")?;
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write_nested(item, f)?;
            }
            f.write_str("]")
        }
        HostValue::Map(fields) => {
            f.write_str("{")?;
            for (index, (key, item)) in fields.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}: ", Value::from(key.as_str()))?;
                write_nested(item, f)?;
            }
            f.write_str("}")
        }
        HostValue::Object(object) => f.write_str(&object.display()),
    }
}

fn write_float(number: f64, f: &mut Formatter<'_>) -> fmt::Result {
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e16 {
        write!(f, "{number:.1}")
    } else {
        write!(f, "{number}")
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for HostValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<HostValue>> for HostValue {
    fn from(value: Vec<HostValue>) -> Self {
        Self::List(value)
    }
}

impl From<Fields> for HostValue {
    fn from(value: Fields) -> Self {
        Self::Map(value)
    }
}

impl From<ObjectRef> for HostValue {
    fn from(value: ObjectRef) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<&Value> for HostValue {
    fn from(value: &Value) -> Self {
        Self::from_json(value)
    }
}

/// Generic attribute-bearing object: a type name plus ordered fields.
///
/// Used when the type registry rebuilds an instance from inline wire data.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    type_name: String,
    fields: Fields,
}

impl Record {
    /// Creates a record of the given type.
    #[must_use]
    pub fn new(type_name: impl Into<String>, fields: Fields) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
        }
    }

    /// Creates a record already wrapped as a shared object.
    #[must_use]
    pub fn shared(type_name: impl Into<String>, fields: Fields) -> ObjectRef {
        Arc::new(Self::new(type_name, fields))
    }

    /// Returns the value of a single field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HostValue> {
        self.fields.get(name)
    }
}

impl HostObject for Record {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn fields(&self) -> Option<Fields> {
        Some(self.fields.clone())
    }

    fn display(&self) -> String {
        let rendered: Vec<String> = self
            .fields
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        format!("{}({})", self.type_name, rendered.join(", "))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
