//! Configuration loader implementations.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::BridgeConfig;

/// Overrides [`BridgeConfig::server_name`].
pub const ENV_SERVER_NAME: &str = "MCP_BRIDGE_SERVER_NAME";
/// Overrides [`BridgeConfig::schema_policy`] (`structural` or `opaque`).
pub const ENV_SCHEMA_POLICY: &str = "MCP_BRIDGE_SCHEMA_POLICY";
/// Overrides [`BridgeConfig::max_inference_depth`].
pub const ENV_MAX_INFERENCE_DEPTH: &str = "MCP_BRIDGE_MAX_INFERENCE_DEPTH";
/// Overrides [`BridgeConfig::log_filter`].
pub const ENV_LOG: &str = "MCP_BRIDGE_LOG";

impl BridgeConfig {
    /// Parses and validates a JSON document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON, unknown keys, or invalid values.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).context("invalid bridge configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config =
            Self::from_json_str(&raw).with_context(|| format!("in {}", path.display()))?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Builds a configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails when a set variable holds an unparseable value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// Unset or empty variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Fails when a variable holds an unparseable value or the result does
    /// not validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(name) = get(ENV_SERVER_NAME) {
            config.server_name = name;
        }
        if let Some(policy) = get(ENV_SCHEMA_POLICY) {
            config.schema_policy = policy
                .parse()
                .map_err(|err: String| anyhow!(err))
                .with_context(|| format!("invalid {ENV_SCHEMA_POLICY}"))?;
        }
        if let Some(depth) = get(ENV_MAX_INFERENCE_DEPTH) {
            config.max_inference_depth = depth
                .trim()
                .parse()
                .with_context(|| format!("invalid {ENV_MAX_INFERENCE_DEPTH} `{depth}`"))?;
        }
        if let Some(filter) = get(ENV_LOG) {
            config.log_filter = filter;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use bridge_codec::SchemaPolicy;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn json_fills_missing_keys_with_defaults() {
        let config = BridgeConfig::from_json_str(r#"{"schema_policy": "opaque"}"#).unwrap();
        assert_eq!(config.schema_policy, SchemaPolicy::OpaqueString);
        assert_eq!(config.server_name, "mcpify");

        assert!(BridgeConfig::from_json_str(r#"{"unknown": 1}"#).is_err());
        assert!(BridgeConfig::from_json_str(r#"{"max_inference_depth": 0}"#).is_err());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = BridgeConfig::from_lookup(lookup(&[
            (ENV_SERVER_NAME, "calc"),
            (ENV_SCHEMA_POLICY, "opaque"),
            (ENV_MAX_INFERENCE_DEPTH, " 8 "),
            (ENV_LOG, ""),
        ]))
        .unwrap();
        assert_eq!(config.server_name, "calc");
        assert_eq!(config.schema_policy, SchemaPolicy::OpaqueString);
        assert_eq!(config.max_inference_depth, 8);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn environment_rejects_bad_values() {
        let err = BridgeConfig::from_lookup(lookup(&[(ENV_SCHEMA_POLICY, "weird")]))
            .expect_err("bad policy");
        assert!(format!("{err:#}").contains(ENV_SCHEMA_POLICY));

        assert!(BridgeConfig::from_lookup(lookup(&[(ENV_MAX_INFERENCE_DEPTH, "deep")])).is_err());
        assert!(BridgeConfig::from_lookup(lookup(&[(ENV_MAX_INFERENCE_DEPTH, "0")])).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = BridgeConfig::from_path("/nonexistent/bridge.json").expect_err("missing");
        assert!(err.to_string().contains("/nonexistent/bridge.json"));
    }
}
