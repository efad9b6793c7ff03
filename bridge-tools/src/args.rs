//! Decoded arguments handed to a tool implementation.

use bridge_primitives::{Fields, HostValue};

use crate::{ToolError, ToolResult};

/// Arguments of one call, already decoded to host values.
///
/// Parameters flagged positional arrive in declaration order in
/// [`positional`](Self::positional); every other parameter is looked up by
/// name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<HostValue>,
    named: Fields,
}

impl CallArgs {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn with_positional(mut self, value: impl Into<HostValue>) -> Self {
        self.push_positional(value.into());
        self
    }

    /// Adds a named argument.
    #[must_use]
    pub fn with_named(mut self, name: impl Into<String>, value: impl Into<HostValue>) -> Self {
        self.insert(name, value.into());
        self
    }

    pub(crate) fn push_positional(&mut self, value: HostValue) {
        self.positional.push(value);
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: HostValue) {
        self.named.insert(name.into(), value);
    }

    /// Positional arguments in declaration order.
    #[must_use]
    pub fn positional(&self) -> &[HostValue] {
        &self.positional
    }

    /// Named arguments in declaration order.
    #[must_use]
    pub fn named(&self) -> &Fields {
        &self.named
    }

    /// Returns the positional argument at `index`.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&HostValue> {
        self.positional.get(index)
    }

    /// Returns the named argument `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HostValue> {
        self.named.get(name)
    }

    /// Returns the named argument `name`, failing the call when it is absent
    /// or null.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Execution`] when no usable value is present.
    pub fn require(&self, name: &str) -> ToolResult<&HostValue> {
        self.get(name)
            .filter(|value| !value.is_null())
            .ok_or_else(|| ToolError::execution(format!("argument `{name}` is required")))
    }

    /// Returns the named argument `name` as an integer.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Execution`] when absent or not an integer.
    pub fn int(&self, name: &str) -> ToolResult<i64> {
        self.require(name)?
            .as_int()
            .ok_or_else(|| ToolError::execution(format!("argument `{name}` must be an integer")))
    }

    /// Returns the named argument `name` as text.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Execution`] when absent or not a string.
    pub fn text(&self, name: &str) -> ToolResult<&str> {
        self.require(name)?
            .as_str()
            .ok_or_else(|| ToolError::execution(format!("argument `{name}` must be a string")))
    }

    /// Consumes the arguments, returning positional and named parts.
    #[must_use]
    pub fn into_parts(self) -> (Vec<HostValue>, Fields) {
        (self.positional, self.named)
    }
}
