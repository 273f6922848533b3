//! # Integration Nodes
//!
//! Workflow integration nodes for third-party REST APIs: Cisco Webex
//! messages and meetings, Zoho CRM records, and the Tributech data API.
//!
//! ## Features
//!
//! - **Typed Operations**: Each `(resource, operation)` pair resolves once
//!   into an enum; parameters deserialize into typed structs
//! - **Credentials**: OAuth2 bearer, refresh and client-credentials flows
//! - **Paginated Listings**: Page-flag, body-URI and `Link` header cursors
//!   with `returnAll` / `limit` semantics
//! - **HTTP**: Retries with backoff and token-bucket rate limiting
//! - **Field Adjusters**: Composable `Record -> Record` payload transforms
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use integration_nodes::{NodeContext, NodeRegistry, Result, RuntimeConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = RuntimeConfig::load("nodes.yaml")?;
//!     let registry = NodeRegistry::new();
//!
//!     let zoho = registry.get("zoho")?;
//!     let ctx = NodeContext::from_config(&config, zoho.describe().credential)?;
//!
//!     let accounts = zoho
//!         .run(&ctx, "account", "getAll", vec![json!({ "returnAll": true })], 1)
//!         .await?;
//!     println!("{} accounts", accounts.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Node Registry                           │
//! │   describe() → NodeDescription    run(resource, op, items)      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────┬─────────────┬────────────┐
//! │ Credentials  │        HTTP           │ Pagination  │  Fields    │
//! ├──────────────┼───────────────────────┼─────────────┼────────────┤
//! │ Webex OAuth2 │ GET/POST/PUT/DELETE   │ Page flag   │ Addresses  │
//! │ Zoho OAuth2  │ Retry + backoff       │ Body URI    │ Timezones  │
//! │ Tributech CC │ Rate limit            │ Link header │ Query      │
//! └──────────────┴───────────────────────┴─────────────┴────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication implementations
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Paginated listing fetcher
pub mod pagination;

/// Credential types and resolution
pub mod credentials;

/// Runtime configuration
pub mod config;

/// Payload field adjusters
pub mod fields;

/// Timezone-aware timestamp formatting
pub mod timezone;

/// Integration nodes
pub mod nodes;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::RuntimeConfig;
pub use nodes::{IntegrationNode, NodeContext, NodeDescription, NodeRegistry, NodeRunner};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
