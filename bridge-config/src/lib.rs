//! Configuration for mcp-bridge deployments.
//!
//! [`BridgeConfig`] fixes the settings that must agree across a deployment,
//! most importantly the schema policy: discovery schemas and argument
//! decoding both follow it. Loaders read it from JSON or the environment.

#![warn(missing_docs, clippy::pedantic)]

pub mod loader;
pub mod schema;

pub use loader::{ENV_LOG, ENV_MAX_INFERENCE_DEPTH, ENV_SCHEMA_POLICY, ENV_SERVER_NAME};
pub use schema::{BridgeConfig, DEFAULT_LOG_FILTER, DEFAULT_SERVER_NAME};
