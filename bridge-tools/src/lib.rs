//! Tool definitions and invocation on top of the value codec.
//!
//! A [`FunctionSchema`] describes a callable: its parameters, each with a
//! [`TypeDescriptor`](bridge_codec::TypeDescriptor), and an optional return
//! shape. A [`ToolSet`] holds schemas alongside their [`Tool`]
//! implementations, renders discovery definitions, and runs calls: raw wire
//! arguments are decoded per parameter, the tool runs, and its result is
//! serialized back to text.

#![warn(missing_docs, clippy::pedantic)]

pub mod args;
pub mod error;
pub mod schema;
pub mod set;

pub use args::CallArgs;
pub use error::{ToolError, ToolResult};
pub use schema::{FunctionSchema, Parameter, ToolDefinition};
pub use set::{CallOutcome, Tool, ToolSet};
