//! Strongly typed configuration schema.

use anyhow::{Result, bail};
use bridge_codec::{Codec, DEFAULT_MAX_INFERENCE_DEPTH, SchemaPolicy};
use serde::{Deserialize, Serialize};

/// Server name used when none is configured.
pub const DEFAULT_SERVER_NAME: &str = "mcpify";

/// Log filter used when none is configured.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Settings shared by every component of a deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Name advertised by the server and given to its tool set.
    pub server_name: String,
    /// Projection and argument encoding policy.
    pub schema_policy: SchemaPolicy,
    /// Nesting depth at which inference degrades to `Any`.
    pub max_inference_depth: usize,
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_owned(),
            schema_policy: SchemaPolicy::default(),
            max_inference_depth: DEFAULT_MAX_INFERENCE_DEPTH,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl BridgeConfig {
    /// Checks the invariants loaders cannot express through types.
    ///
    /// # Errors
    ///
    /// Fails on a blank server name or a zero inference depth.
    pub fn validate(&self) -> Result<()> {
        if self.server_name.trim().is_empty() {
            bail!("server_name cannot be empty");
        }
        if self.max_inference_depth == 0 {
            bail!("max_inference_depth must be at least 1");
        }
        Ok(())
    }

    /// Builds a codec with fresh registries following this configuration.
    #[must_use]
    pub fn codec(&self) -> Codec {
        Codec::default()
            .with_policy(self.schema_policy)
            .with_max_inference_depth(self.max_inference_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BridgeConfig::default();
        assert_eq!(config.server_name, "mcpify");
        assert_eq!(config.schema_policy, SchemaPolicy::Structural);
        assert_eq!(config.max_inference_depth, 32);
        config.validate().unwrap();
    }

    #[test]
    fn validation_rejects_degenerate_values() {
        let blank = BridgeConfig {
            server_name: "  ".into(),
            ..BridgeConfig::default()
        };
        assert!(blank.validate().is_err());

        let shallow = BridgeConfig {
            max_inference_depth: 0,
            ..BridgeConfig::default()
        };
        assert!(shallow.validate().is_err());
    }

    #[test]
    fn codec_follows_configuration() {
        let config = BridgeConfig {
            schema_policy: SchemaPolicy::OpaqueString,
            max_inference_depth: 4,
            ..BridgeConfig::default()
        };
        let codec = config.codec();
        assert_eq!(codec.policy(), SchemaPolicy::OpaqueString);
        assert_eq!(codec.max_inference_depth(), 4);
    }
}
