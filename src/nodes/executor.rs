//! Batch execution and the node registry

use super::types::{IntegrationNode, NodeContext, NodeDescription, OptionValue};
use super::{TributechNode, WebexNode, ZohoNode};
use crate::error::{Error, Result};
use crate::types::{into_items, JsonValue};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Run `operation` once per item, up to `concurrency` items at a time.
///
/// Outputs keep input order; array responses are spread into separate
/// items. The first failing item aborts the batch.
pub async fn execute_batch<N>(
    node: &N,
    ctx: &NodeContext,
    operation: N::Operation,
    items: Vec<JsonValue>,
    concurrency: usize,
) -> Result<Vec<JsonValue>>
where
    N: IntegrationNode + ?Sized,
{
    let count = items.len();
    info!(node = node.description().name, ?operation, items = count, "Executing operation");

    let outputs: Vec<JsonValue> = stream::iter(items.into_iter().enumerate())
        .map(|(index, params)| async move {
            debug!(index, "Executing item");
            node.execute(ctx, operation, params).await.inspect_err(|e| {
                warn!(index, error = %e, retryable = e.is_retryable(), "Item failed");
            })
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    Ok(outputs.into_iter().flat_map(into_items).collect())
}

// ============================================================================
// Type-erased nodes
// ============================================================================

/// Object-safe view of an [`IntegrationNode`], resolving operations by name
#[async_trait]
pub trait NodeRunner: Send + Sync {
    /// Describe the node
    fn describe(&self) -> NodeDescription;

    /// Resolve `(resource, operation)` once and run it over every item
    async fn run(
        &self,
        ctx: &NodeContext,
        resource: &str,
        operation: &str,
        items: Vec<JsonValue>,
        concurrency: usize,
    ) -> Result<Vec<JsonValue>>;

    /// Produce selectable values for a parameter
    async fn options(&self, ctx: &NodeContext, method: &str) -> Result<Vec<OptionValue>>;
}

#[async_trait]
impl<N> NodeRunner for N
where
    N: IntegrationNode,
{
    fn describe(&self) -> NodeDescription {
        self.description()
    }

    async fn run(
        &self,
        ctx: &NodeContext,
        resource: &str,
        operation: &str,
        items: Vec<JsonValue>,
        concurrency: usize,
    ) -> Result<Vec<JsonValue>> {
        let operation = self.resolve(resource, operation)?;
        execute_batch(self, ctx, operation, items, concurrency).await
    }

    async fn options(&self, ctx: &NodeContext, method: &str) -> Result<Vec<OptionValue>> {
        self.load_options(ctx, method).await
    }
}

/// Registry of available nodes
#[derive(Clone)]
pub struct NodeRegistry {
    nodes: BTreeMap<&'static str, Arc<dyn NodeRunner>>,
}

impl NodeRegistry {
    /// Create a registry with every built-in node
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(WebexNode::new()));
        registry.register(Arc::new(ZohoNode::new()));
        registry.register(Arc::new(TributechNode::new()));
        registry
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// Register a node
    pub fn register(&mut self, node: Arc<dyn NodeRunner>) {
        self.nodes.insert(node.describe().name, node);
    }

    /// Get a node by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn NodeRunner>> {
        self.nodes.get(name).cloned().ok_or_else(|| {
            Error::invalid_parameter(
                "node",
                format!(
                    "unknown node '{name}', available: {}",
                    self.names().join(", ")
                ),
            )
        })
    }

    /// Names of all registered nodes
    pub fn names(&self) -> Vec<&'static str> {
        self.nodes.keys().copied().collect()
    }

    /// Descriptions of all registered nodes
    pub fn descriptions(&self) -> Vec<NodeDescription> {
        self.nodes.values().map(|n| n.describe()).collect()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("nodes", &self.names())
            .finish()
    }
}
