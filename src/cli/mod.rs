//! CLI module
//!
//! Command-line interface for running integration nodes.
//!
//! # Commands
//!
//! - `nodes` - Describe the available nodes
//! - `credentials` - Describe credential types
//! - `run` - Run an operation over one or more items
//! - `options` - Load selectable values for a parameter

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{load_items, Runner};
