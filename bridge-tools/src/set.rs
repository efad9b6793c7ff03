//! Named tool collections and the call pipeline.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bridge_codec::{Codec, TypeDescriptor};
use bridge_primitives::{CodecError, Fields, HostValue};
use bridge_registry::TypeFactory;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{CallArgs, FunctionSchema, ToolDefinition, ToolError, ToolResult};

/// Trait implemented by tool executors.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Runs the tool with decoded arguments.
    async fn call(&self, args: CallArgs) -> ToolResult<HostValue>;
}

#[async_trait]
impl<F, Fut> Tool for F
where
    F: Send + Sync + Fn(CallArgs) -> Fut,
    Fut: Future<Output = ToolResult<HostValue>> + Send,
{
    async fn call(&self, args: CallArgs) -> ToolResult<HostValue> {
        (self)(args).await
    }
}

/// Tool that builds an instance of a registered type from its arguments.
struct Constructor {
    factory: Arc<dyn TypeFactory>,
    positional: Vec<String>,
}

#[async_trait]
impl Tool for Constructor {
    async fn call(&self, args: CallArgs) -> ToolResult<HostValue> {
        let (positional, named) = args.into_parts();
        let mut fields: Fields = self.positional.iter().cloned().zip(positional).collect();
        fields.extend(named);
        Ok(HostValue::Object(self.factory.instantiate(fields)?))
    }
}

#[derive(Clone)]
struct Entry {
    schema: Arc<FunctionSchema>,
    tool: Arc<dyn Tool>,
    /// Type registrations owned by a constructor tool.
    types: Vec<(String, Arc<dyn TypeFactory>)>,
}

/// Textual result of a call, as returned to the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallOutcome {
    /// Rendered result, or `error: ...` on failure.
    pub text: String,
    /// Whether the call failed.
    pub is_error: bool,
}

/// Named collection of tools sharing one codec.
///
/// Names are unique within a set and tools keep their registration order.
pub struct ToolSet {
    name: String,
    codec: Codec,
    entries: RwLock<IndexMap<String, Entry>>,
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSet")
            .field("name", &self.name)
            .field("tools", &self.names())
            .finish_non_exhaustive()
    }
}

impl ToolSet {
    /// Creates an empty set with a fresh codec.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_codec(name, Codec::default())
    }

    /// Creates an empty set encoding values through `codec`.
    #[must_use]
    pub fn with_codec(name: impl Into<String>, codec: Codec) -> Self {
        Self {
            name: name.into(),
            codec,
            entries: RwLock::default(),
        }
    }

    /// Set name; may be empty.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Codec used for arguments and results.
    #[must_use]
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, Entry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, Entry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `tool` under the name carried by `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidTool`] for an empty name and
    /// [`ToolError::DuplicateTool`] when the name is taken.
    pub fn add_tool<T>(&self, schema: FunctionSchema, tool: T) -> ToolResult<()>
    where
        T: Tool + 'static,
    {
        self.insert(schema, Arc::new(tool), Vec::new())
    }

    /// Registers a constructor tool for a constructible type.
    ///
    /// Calling the tool passes its arguments, keyed by parameter name, to
    /// `factory`. The factory is also registered with the codec's type
    /// registry under the tool name and under the type tag of the declared
    /// return shape, so inline payloads tagged with either decode to new
    /// instances.
    ///
    /// # Errors
    ///
    /// Same as [`add_tool`](Self::add_tool). Nothing is registered on error.
    pub fn add_type<F>(&self, schema: FunctionSchema, factory: F) -> ToolResult<()>
    where
        F: TypeFactory + 'static,
    {
        let factory: Arc<dyn TypeFactory> = Arc::new(factory);
        let name = schema.name().to_owned();
        let mut types = vec![(name.clone(), Arc::clone(&factory))];
        if let Some(TypeDescriptor::Object(object)) = schema.returns()
            && let Some(tag) = object.type_tag()
            && tag != name
        {
            types.push((tag.to_owned(), Arc::clone(&factory)));
        }
        let constructor = Constructor {
            factory,
            positional: schema
                .positional_parameters()
                .map(|p| p.name().to_owned())
                .collect(),
        };
        self.insert(schema, Arc::new(constructor), types)
    }

    fn insert(
        &self,
        schema: FunctionSchema,
        tool: Arc<dyn Tool>,
        types: Vec<(String, Arc<dyn TypeFactory>)>,
    ) -> ToolResult<()> {
        let name = schema.name().to_owned();
        if name.trim().is_empty() {
            return Err(ToolError::invalid("tool name cannot be empty"));
        }

        let mut entries = self.write();
        if entries.contains_key(&name) {
            return Err(ToolError::DuplicateTool { name });
        }
        info!(
            tool = %name,
            parameters = schema.parameters().len(),
            "tool registered"
        );
        let entry = Entry {
            schema: Arc::new(schema),
            tool,
            types,
        };
        self.register_types(&entry);
        entries.insert(name, entry);
        Ok(())
    }

    fn register_types(&self, entry: &Entry) {
        let registry = self.codec.types();
        for (tag, factory) in &entry.types {
            registry.register_shared(tag.clone(), Arc::clone(factory));
        }
    }

    /// Moves copies of every tool in `other` into this set.
    ///
    /// The merge is all-or-nothing. Constructor tools bring their type
    /// registrations along into this set's codec.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::HolderMismatch`] when both sets are named and the
    /// names differ, and [`ToolError::DuplicateTool`] when any tool name is
    /// already present here.
    pub fn merge(&self, other: &ToolSet) -> ToolResult<()> {
        if !self.name.is_empty() && !other.name.is_empty() && self.name != other.name {
            return Err(ToolError::HolderMismatch {
                target: self.name.clone(),
                source_name: other.name.clone(),
            });
        }

        let incoming: Vec<(String, Entry)> = other
            .read()
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect();

        let mut entries = self.write();
        if let Some((name, _)) = incoming.iter().find(|(name, _)| entries.contains_key(name)) {
            return Err(ToolError::DuplicateTool { name: name.clone() });
        }
        let merged = incoming.len();
        for (_, entry) in &incoming {
            self.register_types(entry);
        }
        entries.extend(incoming);
        info!(set = %self.name, merged, "tool sets merged");
        Ok(())
    }

    /// Returns the schema registered under `name`.
    #[must_use]
    pub fn schema(&self, name: &str) -> Option<Arc<FunctionSchema>> {
        self.read().get(name).map(|entry| Arc::clone(&entry.schema))
    }

    /// Returns `true` when a tool named `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Tool names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` when the set holds no tools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Discovery definitions for every tool, projected under the codec's policy.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        let policy = self.codec.policy();
        self.read()
            .values()
            .map(|entry| entry.schema.to_tool_definition(policy))
            .collect()
    }

    /// Decodes `arguments`, runs tool `name`, and renders its result as text.
    ///
    /// A string result is returned verbatim; any other result is its wire
    /// encoding as compact JSON. Missing or null `arguments` count as an
    /// empty argument object.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] for an unregistered name, argument
    /// binding errors from [`FunctionSchema::bind_arguments`], and whatever
    /// the tool itself returns.
    pub async fn invoke(&self, name: &str, arguments: Option<&Value>) -> ToolResult<String> {
        let entry = self
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::UnknownTool {
                name: name.to_owned(),
            })?;

        let empty = Map::new();
        let raw = match arguments {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(CodecError::TypeMismatch {
                    expected: "object".into(),
                    found: json_kind(other).into(),
                }
                .into());
            }
        };

        let args = entry.schema.bind_arguments(raw, &self.codec)?;
        debug!(tool = name, "invoking tool");
        let result = entry.tool.call(args).await?;

        Ok(match self.codec.serialize_value(&result) {
            Value::String(text) => text,
            wire => wire.to_string(),
        })
    }

    /// Like [`invoke`](Self::invoke), but renders failures as an error outcome.
    pub async fn call_tool(&self, name: &str, arguments: Option<&Value>) -> CallOutcome {
        match self.invoke(name, arguments).await {
            Ok(text) => CallOutcome {
                text,
                is_error: false,
            },
            Err(err) => {
                warn!(tool = name, error = %err, "tool call failed");
                CallOutcome {
                    text: format!("error: {err}"),
                    is_error: true,
                }
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
