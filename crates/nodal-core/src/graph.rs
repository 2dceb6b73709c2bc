//! Graph store contract

use crate::edge::{Direction, Edge, NewEdge};
use crate::error::Result;
use crate::node::{NewNode, Node, NodeId};
use crate::query::{Neighbor, NodeFilter};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Record counts of a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: u64,
    pub edge_count: u64,
}

/// Operations a graph store exposes to its callers
///
/// Each operation is atomic with respect to every other operation on the
/// same store. Returned values are owned copies; nothing a caller holds can
/// change store state.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create a node and return it with its assigned id
    async fn create_node(&self, data: NewNode) -> Result<Node>;

    /// Look up a node. `None` when no node has this id.
    async fn get_node(&self, id: &NodeId) -> Result<Option<Node>>;

    /// Look up a node from a caller-supplied string, which may not be an id
    /// at all
    async fn get_node_by_str(&self, id: &str) -> Result<Option<Node>> {
        match NodeId::from_string(id) {
            Ok(id) => self.get_node(&id).await,
            Err(_) => Ok(None),
        }
    }

    /// All nodes matching the filter, in ascending id order
    async fn query_nodes(&self, filter: &NodeFilter) -> Result<Vec<Node>>;

    /// Create an edge between two existing nodes
    ///
    /// Fails with [`Error::Reference`](crate::Error::Reference) and writes
    /// nothing when either endpoint is missing.
    async fn create_edge(&self, data: NewEdge) -> Result<Edge>;

    /// One entry per edge incident to `id` in the given direction
    ///
    /// Outgoing entries come first, then incoming, each in ascending edge id
    /// order. A self-loop appears once per matching direction. An unknown
    /// node has no neighbors.
    async fn get_neighbors(&self, id: &NodeId, direction: Direction) -> Result<Vec<Neighbor>>;

    /// Node and edge counts
    async fn stats(&self) -> Result<GraphStats>;
}
