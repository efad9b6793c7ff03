//! Structured tracing helpers.

use std::io;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber filtered by `filter`.
///
/// Output goes to stderr so stdout stays free for protocol traffic. Returns
/// `Ok(false)` without changing anything when a global subscriber is already
/// installed.
///
/// # Errors
///
/// Fails when `filter` is not a valid filter directive.
pub fn init_tracing(filter: &str) -> Result<bool> {
    let filter =
        EnvFilter::try_new(filter).with_context(|| format!("invalid log filter `{filter}`"))?;
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!("tracing subscriber installed");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_a_no_op() {
        init_tracing("warn").unwrap();
        assert!(!init_tracing("debug").unwrap());
    }

    #[test]
    fn invalid_filters_are_rejected() {
        let err = init_tracing("bridge=loud").expect_err("bad level");
        assert!(err.to_string().contains("bridge=loud"));
    }
}
