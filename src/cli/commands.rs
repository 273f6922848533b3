//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Integration nodes CLI
#[derive(Parser, Debug)]
#[command(name = "integration-nodes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Runtime configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Describe the available nodes
    Nodes,

    /// Describe the credential types nodes authenticate with
    Credentials,

    /// Run an operation over one or more items
    Run {
        /// Node name (e.g. `zoho`)
        #[arg(short, long)]
        node: String,

        /// Resource (e.g. `account`)
        #[arg(short, long)]
        resource: String,

        /// Operation (e.g. `getAll`)
        #[arg(short, long)]
        operation: String,

        /// Inline parameters JSON; an array runs one item per element
        #[arg(short, long, conflicts_with = "items")]
        params: Option<String>,

        /// File holding a JSON array of item parameters
        #[arg(short, long)]
        items: Option<PathBuf>,

        /// Items run at once (overrides the config file)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Load selectable values for a parameter
    Options {
        /// Node name
        #[arg(short, long)]
        node: String,

        /// Options method (e.g. `rooms`)
        #[arg(short, long)]
        method: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}
