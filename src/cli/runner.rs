//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::RuntimeConfig;
use crate::credentials;
use crate::error::{Error, Result, ResultExt};
use crate::nodes::{NodeContext, NodeRegistry};
use crate::types::JsonValue;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
    registry: NodeRegistry,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            registry: NodeRegistry::new(),
        }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Nodes => self.nodes(),
            Commands::Credentials => self.credentials(),
            Commands::Run {
                node,
                resource,
                operation,
                params,
                items,
                concurrency,
            } => {
                let items = load_items(params.as_deref(), items.as_deref())?;
                self.execute(node, resource, operation, items, *concurrency)
                    .await
            }
            Commands::Options { node, method } => self.options(node, method).await,
        }
    }

    /// Load the runtime config, falling back to defaults without `--config`
    fn load_config(&self) -> Result<RuntimeConfig> {
        match &self.cli.config {
            Some(path) => RuntimeConfig::load(path),
            None => Ok(RuntimeConfig::default()),
        }
    }

    /// Describe nodes
    fn nodes(&self) -> Result<()> {
        self.output(&json!({ "nodes": self.registry.descriptions() }))
    }

    /// Describe credential types
    fn credentials(&self) -> Result<()> {
        self.output(&json!({ "credentials": credentials::all() }))
    }

    /// Run an operation over the items
    async fn execute(
        &self,
        node_name: &str,
        resource: &str,
        operation: &str,
        items: Vec<JsonValue>,
        concurrency: Option<usize>,
    ) -> Result<()> {
        let config = self.load_config()?;
        let node = self.registry.get(node_name)?;
        let description = node.describe();

        if !description.supports(resource, operation) {
            return Err(Error::unknown_operation(node_name, resource, operation));
        }

        let ctx = NodeContext::from_config(&config, description.credential)?;
        let concurrency = concurrency.unwrap_or(config.concurrency);

        let start = Instant::now();
        let outputs = node
            .run(&ctx, resource, operation, items, concurrency)
            .await?;
        info!(
            node = node_name,
            resource,
            operation,
            outputs = outputs.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Operation complete"
        );

        self.output(&outputs)
    }

    /// Load options for a parameter
    async fn options(&self, node_name: &str, method: &str) -> Result<()> {
        let config = self.load_config()?;
        let node = self.registry.get(node_name)?;
        let ctx = NodeContext::from_config(&config, node.describe().credential)?;

        let options = node.options(&ctx, method).await?;
        self.output(&options)
    }

    /// Print a value in the selected format
    fn output<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{rendered}");
        Ok(())
    }
}

/// Read item parameters from `--params` or `--items`. An array yields one
/// item per element, anything else a single item; neither yields one empty
/// item.
pub fn load_items(params: Option<&str>, file: Option<&Path>) -> Result<Vec<JsonValue>> {
    let raw = match (params, file) {
        (Some(inline), _) => inline.to_string(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read items file '{}'", path.display()))?,
        (None, None) => return Ok(vec![json!({})]),
    };

    let value: JsonValue = serde_json::from_str(&raw)
        .map_err(|e| Error::invalid_parameter("params", format!("invalid JSON: {e}")))?;

    Ok(match value {
        JsonValue::Array(items) => items,
        other => vec![other],
    })
}
