//! Facade over the mcp-bridge crates.
//!
//! The value model, registries, and codec are always available. Tool sets,
//! configuration, and logging sit behind the `tools`, `config`, and
//! `telemetry` features, all enabled by default.

#![warn(missing_docs, clippy::pedantic)]

/// Value model, handles, wire markers, and codec errors.
pub use bridge_primitives as primitives;

/// Object reference and constructible type registries.
pub use bridge_registry as registry;

/// Type descriptors, inference, serialization, and schema projection.
pub use bridge_codec as codec;

/// Function schemas, tool sets, and invocation (enabled by `tools` feature).
#[cfg(feature = "tools")]
pub use bridge_tools as tools;

/// Deployment configuration (enabled by `config` feature).
#[cfg(feature = "config")]
pub use bridge_config as config;

/// Logging bootstrap (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use bridge_telemetry as telemetry;

/// Creates an empty tool set named and encoded as `config` prescribes.
#[cfg(all(feature = "tools", feature = "config"))]
#[must_use]
pub fn mcpify(config: &bridge_config::BridgeConfig) -> bridge_tools::ToolSet {
    bridge_tools::ToolSet::with_codec(config.server_name.clone(), config.codec())
}
