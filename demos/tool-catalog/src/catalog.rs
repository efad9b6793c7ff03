//! Sample tools registered by the demo.

use std::any::Any;
use std::sync::{Arc, Mutex, PoisonError};

use mcp_bridge::codec::{ObjectDescriptor, TypeDescriptor};
use mcp_bridge::primitives::{CodecResult, Fields, HostObject, HostValue, ObjectRef};
use mcp_bridge::tools::{CallArgs, FunctionSchema, Parameter, ToolError, ToolResult, ToolSet};

/// Stateful object handed to clients by reference.
#[derive(Debug)]
pub struct Calculator {
    value: Mutex<i64>,
}

impl HostObject for Calculator {
    fn type_name(&self) -> &str {
        "Calculator"
    }

    fn fields(&self) -> Option<Fields> {
        let mut fields = Fields::new();
        fields.insert("value".into(), HostValue::Int(self.current()));
        Some(fields)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Calculator {
    fn current(&self) -> i64 {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add(&self, amount: i64) -> ToolResult<i64> {
        let mut value = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        *value = checked_sum(*value, amount)?;
        Ok(*value)
    }
}

fn checked_sum(a: i64, b: i64) -> ToolResult<i64> {
    a.checked_add(b).ok_or_else(|| ToolError::execution("integer overflow"))
}

/// Keeps constructed objects alive so their handles stay resolvable.
///
/// Objects stay here until released through the `release_calculator` tool,
/// after which their handles expire.
#[derive(Debug, Default)]
pub struct Workspace {
    objects: Mutex<Vec<ObjectRef>>,
}

impl Workspace {
    fn keep(&self, object: ObjectRef) -> ObjectRef {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&object));
        object
    }

    fn release(&self, object: &ObjectRef) -> bool {
        let mut objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
        let before = objects.len();
        objects.retain(|kept| !Arc::ptr_eq(kept, object));
        objects.len() < before
    }

    /// Number of objects currently kept alive.
    pub fn kept(&self) -> usize {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

fn calculator_arg(args: &CallArgs) -> ToolResult<(&ObjectRef, &Calculator)> {
    args.arg(0)
        .and_then(HostValue::as_object)
        .and_then(|object| Some((object, object.downcast_ref::<Calculator>()?)))
        .ok_or_else(|| ToolError::execution("expected a Calculator reference"))
}

fn calculator_state() -> TypeDescriptor {
    ObjectDescriptor::tagged("Calculator")
        .with_description("simple calculator class")
        .with_property("value", TypeDescriptor::INT, true)
        .into()
}

/// Registers every sample tool on `set`.
///
/// # Errors
///
/// Propagates registration failures.
pub fn register(set: &ToolSet, workspace: &Arc<Workspace>) -> ToolResult<()> {
    set.add_tool(
        FunctionSchema::new("add", "add two numbers")
            .with_parameter(Parameter::required("a", TypeDescriptor::INT))
            .with_parameter(Parameter::required("b", TypeDescriptor::INT))
            .with_returns(TypeDescriptor::INT),
        |args: CallArgs| async move {
            checked_sum(args.int("a")?, args.int("b")?).map(HostValue::Int)
        },
    )?;

    set.add_tool(
        FunctionSchema::new("greet", "greet someone")
            .with_parameter(Parameter::required("name", TypeDescriptor::STRING))
            .with_returns(TypeDescriptor::STRING),
        |args: CallArgs| async move {
            Ok::<_, ToolError>(HostValue::from(format!("hello {}!", args.text("name")?)))
        },
    )?;

    set.add_tool(
        FunctionSchema::new("process_list", "count items in a list")
            .with_parameter(Parameter::required(
                "items",
                TypeDescriptor::array(TypeDescriptor::STRING),
            ))
            .with_returns(TypeDescriptor::INT),
        |args: CallArgs| async move {
            let count = args.require("items")?.as_list().map_or(0, <[HostValue]>::len);
            i64::try_from(count)
                .map(HostValue::Int)
                .map_err(|_| ToolError::execution("too many items"))
        },
    )?;

    set.add_tool(
        FunctionSchema::new("optional_param", "repeat text optionally")
            .with_parameter(Parameter::required("text", TypeDescriptor::STRING))
            .with_parameter(Parameter::optional(
                "count",
                TypeDescriptor::optional(TypeDescriptor::INT),
            ))
            .with_returns(TypeDescriptor::STRING),
        |args: CallArgs| async move {
            let text = args.text("text")?;
            let repeated = match args.get("count").and_then(HostValue::as_int) {
                Some(count) => text.repeat(usize::try_from(count).unwrap_or(0)),
                None => text.to_owned(),
            };
            Ok::<_, ToolError>(HostValue::from(repeated))
        },
    )?;

    set.add_tool(
        FunctionSchema::new("union_type", "handle int or string input")
            .with_parameter(Parameter::required(
                "value",
                TypeDescriptor::union(vec![TypeDescriptor::INT, TypeDescriptor::STRING])?,
            ))
            .with_returns(TypeDescriptor::STRING),
        |args: CallArgs| async move {
            let value = args.require("value")?;
            Ok::<_, ToolError>(HostValue::from(format!(
                "received: {value} (type: {})",
                value.kind_name()
            )))
        },
    )?;

    let store = Arc::clone(workspace);
    set.add_type(
        FunctionSchema::new("Calculator", "simple calculator class")
            .with_parameter(Parameter::optional("initial", TypeDescriptor::INT).with_default(0))
            .with_returns(calculator_state()),
        move |fields: Fields| -> CodecResult<ObjectRef> {
            let initial = fields.get("initial").and_then(HostValue::as_int).unwrap_or(0);
            let calculator: ObjectRef = Arc::new(Calculator {
                value: Mutex::new(initial),
            });
            Ok(store.keep(calculator))
        },
    )?;

    set.add_tool(
        FunctionSchema::new("add_to_value", "add amount to stored value")
            .with_parameter(Parameter::required("calculator", TypeDescriptor::Any).positional())
            .with_parameter(Parameter::required("amount", TypeDescriptor::INT))
            .with_returns(TypeDescriptor::INT),
        |args: CallArgs| async move {
            let (_, calculator) = calculator_arg(&args)?;
            calculator.add(args.int("amount")?).map(HostValue::Int)
        },
    )?;

    let store = Arc::clone(workspace);
    set.add_tool(
        FunctionSchema::new("release_calculator", "drop a calculator so its handle expires")
            .with_parameter(Parameter::required("calculator", TypeDescriptor::Any).positional())
            .with_returns(TypeDescriptor::BOOL),
        move |args: CallArgs| {
            let store = Arc::clone(&store);
            async move {
                let (object, _) = calculator_arg(&args)?;
                let released = store.release(object);
                Ok::<_, ToolError>(HostValue::Bool(released))
            }
        },
    )?;

    Ok(())
}
