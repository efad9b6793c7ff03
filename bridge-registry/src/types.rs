//! Type tag to factory mapping used for inline reconstruction.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use bridge_primitives::{CodecResult, Fields, ObjectRef, Record};
use tracing::debug;

/// Builds a bare instance of a registered type and assigns `fields` to it.
pub trait TypeFactory: Send + Sync {
    /// Produces a new object from decoded fields.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Construction`](bridge_primitives::CodecError::Construction)
    /// when the fields cannot populate an instance.
    fn instantiate(&self, fields: Fields) -> CodecResult<ObjectRef>;
}

impl<F> TypeFactory for F
where
    F: Fn(Fields) -> CodecResult<ObjectRef> + Send + Sync,
{
    fn instantiate(&self, fields: Fields) -> CodecResult<ObjectRef> {
        (self)(fields)
    }
}

/// Factory producing generic [`Record`] instances of one type.
#[derive(Clone, Debug)]
pub struct RecordFactory {
    type_name: String,
}

impl RecordFactory {
    /// Creates a factory for the given type tag.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

impl TypeFactory for RecordFactory {
    fn instantiate(&self, fields: Fields) -> CodecResult<ObjectRef> {
        Ok(Record::shared(self.type_name.clone(), fields))
    }
}

/// Registry of constructible types keyed by type tag.
///
/// Populated while tools are registered and read concurrently afterwards.
#[derive(Default)]
pub struct TypeRegistry {
    inner: RwLock<HashMap<String, Arc<dyn TypeFactory>>>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name`. Returns `true` if it replaced an
    /// earlier registration.
    pub fn register<F>(&self, name: impl Into<String>, factory: F) -> bool
    where
        F: TypeFactory + 'static,
    {
        self.register_shared(name, Arc::new(factory))
    }

    /// Registers an already shared factory, so one factory can serve several tags.
    pub fn register_shared(&self, name: impl Into<String>, factory: Arc<dyn TypeFactory>) -> bool {
        let name = name.into();
        let replaced = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), factory)
            .is_some();
        debug!(type_name = %name, replaced, "type registered");
        replaced
    }

    /// Registers a [`RecordFactory`] for `name`.
    pub fn register_record(&self, name: impl Into<String>) -> bool {
        let name = name.into();
        let factory = RecordFactory::new(name.clone());
        self.register(name, factory)
    }

    /// Returns the factory registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn TypeFactory>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Builds an instance of `name` from `fields`.
    ///
    /// Returns `None` when `name` is not registered.
    pub fn instantiate(&self, name: &str, fields: Fields) -> Option<CodecResult<ObjectRef>> {
        let factory = self.get(name)?;
        Some(factory.instantiate(fields))
    }

    /// Returns the registered tags in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_primitives::{CodecError, HostValue};

    #[test]
    fn record_factory_builds_tagged_records() {
        let registry = TypeRegistry::new();
        assert!(!registry.register_record("Point"));

        let mut fields = Fields::new();
        fields.insert("x".into(), HostValue::Int(1));
        let object = registry
            .instantiate("Point", fields)
            .expect("registered")
            .expect("constructed");

        assert_eq!(object.type_name(), "Point");
        let record = object.downcast_ref::<Record>().expect("record");
        assert_eq!(record.get("x"), Some(&HostValue::Int(1)));
    }

    #[test]
    fn closures_act_as_factories() {
        let registry = TypeRegistry::new();
        registry.register("Strict", |fields: Fields| {
            if fields.contains_key("id") {
                Ok(Record::shared("Strict", fields))
            } else {
                Err(CodecError::construction("Strict", "missing `id`"))
            }
        });

        let err = registry
            .instantiate("Strict", Fields::new())
            .expect("registered")
            .expect_err("should reject");
        assert!(matches!(err, CodecError::Construction { .. }));
    }

    #[test]
    fn unknown_types_are_absent() {
        let registry = TypeRegistry::new();
        assert!(registry.instantiate("Missing", Fields::new()).is_none());
        assert!(!registry.contains("Missing"));
    }

    #[test]
    fn re_registration_replaces() {
        let registry = TypeRegistry::new();
        registry.register_record("B");
        registry.register_record("A");
        assert!(registry.register_record("A"));
        assert_eq!(registry.names(), vec!["A".to_owned(), "B".to_owned()]);
    }
}
