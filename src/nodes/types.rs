//! Node trait, descriptions and execution context

use crate::config::RuntimeConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::JsonValue;
use async_trait::async_trait;
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

// ============================================================================
// Descriptions
// ============================================================================

/// Declarative description of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    /// Unique node name (e.g. `zoho`)
    pub name: &'static str,
    /// Label shown to the user
    pub display_name: &'static str,
    /// Credential type the node authenticates with
    pub credential: &'static str,
    /// Resources and their operations
    pub resources: Vec<ResourceDescription>,
}

impl NodeDescription {
    /// Find a resource by name
    pub fn resource(&self, name: &str) -> Option<&ResourceDescription> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Whether the node supports `(resource, operation)`
    pub fn supports(&self, resource: &str, operation: &str) -> bool {
        self.resource(resource)
            .is_some_and(|r| r.operations.iter().any(|o| o.name == operation))
    }
}

/// A resource a node operates on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescription {
    /// Resource name (e.g. `message`)
    pub name: &'static str,
    /// Label shown to the user
    pub display_name: &'static str,
    /// Supported operations
    pub operations: Vec<OperationDescription>,
}

impl ResourceDescription {
    /// Create a resource description
    pub fn new(
        name: &'static str,
        display_name: &'static str,
        operations: Vec<OperationDescription>,
    ) -> Self {
        Self {
            name,
            display_name,
            operations,
        }
    }
}

/// One operation on a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationDescription {
    /// Operation name (e.g. `getAll`)
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
}

impl OperationDescription {
    /// Create an operation description
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description }
    }
}

/// A selectable value produced by a load-options helper
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionValue {
    /// Label
    pub name: String,
    /// Value passed back as a parameter
    pub value: String,
}

// ============================================================================
// Context
// ============================================================================

/// Everything an operation needs besides its parameters
#[derive(Debug)]
pub struct NodeContext {
    /// Authenticated client rooted at the node's API
    pub client: HttpClient,
    /// Timezone timestamps are converted to
    pub timezone: Tz,
}

impl NodeContext {
    /// Create a context
    pub fn new(client: HttpClient, timezone: Tz) -> Self {
        Self { client, timezone }
    }

    /// Build a context for `credential` from the runtime config
    pub fn from_config(config: &RuntimeConfig, credential: &str) -> Result<Self> {
        let resolved = config.resolve_credential(credential)?;
        let client = resolved.http_client(config.http_client_config())?;
        Ok(Self::new(client, config.tz()?))
    }
}

// ============================================================================
// Node Trait
// ============================================================================

/// An integration node: a set of typed operations against one vendor API
#[async_trait]
pub trait IntegrationNode: Send + Sync {
    /// The node's resolved `(resource, operation)` pair
    type Operation: Copy + Debug + Send + Sync;

    /// Describe the node
    fn description(&self) -> NodeDescription;

    /// Resolve a `(resource, operation)` pair, once per batch
    fn resolve(&self, resource: &str, operation: &str) -> Result<Self::Operation>;

    /// Run the operation for one item
    async fn execute(
        &self,
        ctx: &NodeContext,
        operation: Self::Operation,
        params: JsonValue,
    ) -> Result<JsonValue>;

    /// Produce selectable values for a parameter
    async fn load_options(&self, _ctx: &NodeContext, method: &str) -> Result<Vec<OptionValue>> {
        Err(Error::invalid_parameter(
            "method",
            format!("node '{}' has no options method '{method}'", self.description().name),
        ))
    }
}

/// Deserialize an item's parameters into an operation's typed struct
pub fn parse_params<T: DeserializeOwned>(params: JsonValue) -> Result<T> {
    let params = if params.is_null() {
        JsonValue::Object(serde_json::Map::new())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| Error::invalid_parameter("parameters", e.to_string()))
}

/// Fail with `MissingParameter` unless `value` holds a non-empty string
pub fn require(value: Option<String>, name: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::missing_parameter(name))
}

/// Default record limit when `returnAll` is off
pub fn default_limit() -> usize {
    50
}
