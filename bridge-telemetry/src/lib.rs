//! Observability utilities for mcp-bridge.

#![warn(missing_docs, clippy::pedantic)]

pub mod tracing_support;

pub use tracing_support::init_tracing;
