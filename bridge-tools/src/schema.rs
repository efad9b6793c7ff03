//! Function schemas and discovery definitions.

use bridge_codec::{Codec, SchemaPolicy, TypeDescriptor, project};
use bridge_primitives::HostValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{CallArgs, ToolError, ToolResult};

/// One declared parameter of a tool.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    name: String,
    descriptor: TypeDescriptor,
    required: bool,
    default: Option<HostValue>,
    positional: bool,
    description: Option<String>,
}

impl Parameter {
    /// Required parameter.
    #[must_use]
    pub fn required(name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            descriptor,
            required: true,
            default: None,
            positional: false,
            description: None,
        }
    }

    /// Optional parameter; absent values are passed as null unless a default is set.
    #[must_use]
    pub fn optional(name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        Self {
            required: false,
            ..Self::required(name, descriptor)
        }
    }

    /// Sets the value used when the argument is absent. Makes the parameter optional.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<HostValue>) -> Self {
        self.required = false;
        self.default = Some(default.into());
        self
    }

    /// Passes this parameter positionally instead of by name.
    #[must_use]
    pub fn positional(mut self) -> Self {
        self.positional = true;
        self
    }

    /// Sets the description attached to the parameter's schema.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared shape.
    #[must_use]
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Whether the argument must be supplied.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the argument is passed positionally.
    #[must_use]
    pub fn is_positional(&self) -> bool {
        self.positional
    }

    /// Value used when the argument is absent.
    #[must_use]
    pub fn default_value(&self) -> Option<&HostValue> {
        self.default.as_ref()
    }

    /// Parameter description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn project(&self, policy: SchemaPolicy) -> Value {
        let mut schema = project(&self.descriptor, policy);
        if let (Some(description), Value::Object(map)) = (&self.description, &mut schema) {
            map.insert("description".into(), json!(description));
        }
        schema
    }
}

/// Immutable description of a callable exposed as a tool.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionSchema {
    name: String,
    description: String,
    parameters: Vec<Parameter>,
    returns: Option<TypeDescriptor>,
}

impl FunctionSchema {
    /// Creates a schema with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            returns: None,
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Declares the return shape.
    #[must_use]
    pub fn with_returns(mut self, returns: TypeDescriptor) -> Self {
        self.returns = Some(returns);
        self
    }

    /// Tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tool description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Declared return shape.
    #[must_use]
    pub fn returns(&self) -> Option<&TypeDescriptor> {
        self.returns.as_ref()
    }

    /// Parameters that must be supplied.
    pub fn required_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.required)
    }

    /// Parameters that may be omitted.
    pub fn optional_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| !p.required)
    }

    /// Parameters passed positionally.
    pub fn positional_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.positional)
    }

    /// Object schema describing the accepted arguments.
    #[must_use]
    pub fn input_schema(&self, policy: SchemaPolicy) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.project(policy)))
            .collect();
        let required: Vec<&str> = self.required_parameters().map(Parameter::name).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Discovery entry for this tool.
    #[must_use]
    pub fn to_tool_definition(&self, policy: SchemaPolicy) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema(policy),
        }
    }

    /// Decodes a raw argument bag into call arguments.
    ///
    /// Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::MissingArgument`] for an absent required
    /// parameter and [`ToolError::Codec`] when an argument does not decode.
    pub fn bind_arguments(&self, raw: &Map<String, Value>, codec: &Codec) -> ToolResult<CallArgs> {
        let mut args = CallArgs::new();
        for parameter in &self.parameters {
            let value = match raw.get(&parameter.name) {
                Some(wire) => codec.decode_argument(&parameter.descriptor, wire)?,
                None if parameter.required => {
                    return Err(ToolError::MissingArgument {
                        tool: self.name.clone(),
                        name: parameter.name.clone(),
                    });
                }
                None => parameter.default.clone().unwrap_or_default(),
            };
            if parameter.positional {
                args.push_positional(value);
            } else {
                args.insert(parameter.name.clone(), value);
            }
        }
        Ok(args)
    }
}

/// Tool entry advertised to clients during discovery.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema of the argument object.
    pub input_schema: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_codec::ObjectDescriptor;

    fn repeat() -> FunctionSchema {
        FunctionSchema::new("repeat", "repeat text optionally")
            .with_parameter(Parameter::required("text", TypeDescriptor::STRING).positional())
            .with_parameter(
                Parameter::optional("count", TypeDescriptor::optional(TypeDescriptor::INT))
                    .with_description("how many times"),
            )
            .with_parameter(Parameter::optional("sep", TypeDescriptor::STRING).with_default(" "))
            .with_returns(TypeDescriptor::STRING)
    }

    fn names<'a>(parameters: impl Iterator<Item = &'a Parameter>) -> Vec<&'a str> {
        parameters.map(Parameter::name).collect()
    }

    #[test]
    fn parameter_views_filter_by_flag() {
        let schema = repeat();
        assert_eq!(names(schema.required_parameters()), ["text"]);
        assert_eq!(names(schema.optional_parameters()), ["count", "sep"]);
        assert_eq!(names(schema.positional_parameters()), ["text"]);
    }

    #[test]
    fn tool_definition_lists_properties_and_required() {
        let definition = repeat().to_tool_definition(SchemaPolicy::Structural);
        let wire = serde_json::to_value(&definition).unwrap();
        assert_eq!(
            wire,
            json!({
                "name": "repeat",
                "description": "repeat text optionally",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "text": { "type": "string" },
                        "count": {
                            "anyOf": [{ "type": "integer" }, { "type": "null" }],
                            "description": "how many times"
                        },
                        "sep": { "type": "string" }
                    },
                    "required": ["text"]
                }
            })
        );
    }

    #[test]
    fn opaque_definitions_describe_shapes() {
        let schema = FunctionSchema::new("count", "count items").with_parameter(Parameter::required(
            "items",
            TypeDescriptor::array(TypeDescriptor::STRING),
        ));
        let definition = schema.to_tool_definition(SchemaPolicy::OpaqueString);
        assert_eq!(
            definition.input_schema["properties"]["items"],
            json!({ "type": "string", "description": "JSON-encoded array of string" })
        );
    }

    #[test]
    fn binding_applies_defaults_and_positions() {
        let cx = Codec::default();
        let raw = json!({ "text": "hi", "ignored": true });
        let args = repeat().bind_arguments(raw.as_object().unwrap(), &cx).unwrap();

        assert_eq!(args.positional(), [HostValue::from("hi")]);
        assert_eq!(args.get("count"), Some(&HostValue::Null));
        assert_eq!(args.get("sep"), Some(&HostValue::from(" ")));
        assert!(args.get("text").is_none());
        assert!(args.get("ignored").is_none());
    }

    #[test]
    fn binding_reports_missing_and_bad_arguments() {
        let cx = Codec::default();
        let err = repeat()
            .bind_arguments(&Map::new(), &cx)
            .expect_err("missing text");
        assert!(
            matches!(err, ToolError::MissingArgument { tool, name } if tool == "repeat" && name == "text")
        );

        let raw = json!({ "text": "hi", "count": "lots" });
        let err = repeat()
            .bind_arguments(raw.as_object().unwrap(), &cx)
            .expect_err("bad count");
        assert!(matches!(err, ToolError::Codec(_)));
    }

    #[test]
    fn binding_decodes_through_descriptors() {
        let cx = Codec::default();
        let point: TypeDescriptor = ObjectDescriptor::tagged("Point")
            .with_property("x", TypeDescriptor::INT, true)
            .with_property("y", TypeDescriptor::INT, true)
            .into();
        let schema = FunctionSchema::new("norm", "").with_parameter(Parameter::required("p", point));

        let raw = json!({ "p": { "x": "3", "y": 4 } });
        let args = schema.bind_arguments(raw.as_object().unwrap(), &cx).unwrap();
        let p = args.get("p").and_then(HostValue::as_map).expect("map");
        assert_eq!(p.get("x"), Some(&HostValue::Int(3)));
        assert_eq!(p.get("y"), Some(&HostValue::Int(4)));
    }
}
