//! Registers sample tools, prints their discovery schema, and runs calls.

mod catalog;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mcp_bridge::codec::SchemaPolicy;
use mcp_bridge::config::BridgeConfig;
use mcp_bridge::telemetry::init_tracing;
use serde_json::{Value, json};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tool-catalog", about = "Inspect and call the sample mcp-bridge tools")]
struct Cli {
    /// JSON configuration file; the environment is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Advertise and accept non-primitive arguments as JSON-encoded strings.
    #[arg(long)]
    opaque: bool,

    /// Log filter overriding the configured one.
    #[arg(long)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the discovery definitions of every tool.
    List,
    /// Call one tool with a JSON argument object.
    Call {
        /// Tool name.
        tool: String,
        /// Arguments as a JSON object.
        #[arg(default_value = "{}")]
        arguments: String,
    },
    /// Create a calculator, update it through its reference, then release it.
    Walkthrough,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => BridgeConfig::from_path(path)?,
        None => BridgeConfig::from_env()?,
    };
    if cli.opaque {
        config.schema_policy = SchemaPolicy::OpaqueString;
    }
    if let Some(filter) = &cli.log {
        config.log_filter.clone_from(filter);
    }
    init_tracing(&config.log_filter)?;

    let set = mcp_bridge::mcpify(&config);
    let workspace = Arc::new(catalog::Workspace::default());
    catalog::register(&set, &workspace)?;
    info!(
        server = %config.server_name,
        policy = %config.schema_policy,
        tools = set.len(),
        "catalog ready"
    );

    match cli.command {
        Command::List => {
            let definitions = serde_json::to_string_pretty(&set.list_tools())?;
            println!("{definitions}");
        }
        Command::Call { tool, arguments } => {
            let arguments: Value =
                serde_json::from_str(&arguments).context("arguments must be JSON")?;
            let outcome = set.call_tool(&tool, Some(&arguments)).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if outcome.is_error {
                bail!("call to `{tool}` failed");
            }
        }
        Command::Walkthrough => {
            let envelope = set.invoke("Calculator", Some(&json!({"initial": 10}))).await?;
            println!("Calculator(initial=10) -> {envelope}");

            let reference: Value = serde_json::from_str(&envelope)?;
            for amount in [5, 7] {
                let arguments = json!({"calculator": reference, "amount": amount});
                let value = set.invoke("add_to_value", Some(&arguments)).await?;
                println!("add_to_value(amount={amount}) -> {value}");
            }

            let outcome = set
                .call_tool("add_to_value", Some(&json!({"calculator": {}, "amount": 1})))
                .await;
            println!("add_to_value(calculator={{}}) -> {}", outcome.text);

            let released = set
                .invoke("release_calculator", Some(&json!({"calculator": reference})))
                .await?;
            println!("release_calculator() -> {released} ({} kept)", workspace.kept());
            let outcome = set
                .call_tool("add_to_value", Some(&json!({"calculator": reference, "amount": 1})))
                .await;
            println!("add_to_value(released) -> {}", outcome.text);
        }
    }

    Ok(())
}
