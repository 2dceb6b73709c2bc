//! Storage backend trait definitions

use crate::error::StorageResult;
use async_trait::async_trait;
use nodal_core::{Direction, Edge, EdgeId, GraphStats, Neighbor, Node, NodeId};

/// Trait for storage backend implementations
///
/// Every method is atomic: a write is either fully applied or not at all,
/// and a read observes a single consistent state.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn initialize(&self) -> StorageResult<()>;

    /// Close the storage connection
    async fn close(&self) -> StorageResult<()>;

    /// Health check
    async fn health_check(&self) -> StorageResult<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Node Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a node and index it by type. Fails on an id already in use.
    async fn insert_node(&self, node: &Node) -> StorageResult<()>;

    /// Get a node by id
    async fn get_node(&self, id: &NodeId) -> StorageResult<Option<Node>>;

    /// Get all nodes, in ascending id order
    async fn get_all_nodes(&self) -> StorageResult<Vec<Node>>;

    /// Get all nodes of one type, in ascending id order
    async fn get_nodes_by_type(&self, node_type: &str) -> StorageResult<Vec<Node>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Edge Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert an edge and index it under both endpoints
    ///
    /// Both endpoints are checked in the same atomic step as the insert;
    /// a missing one fails with `StorageError::MissingEndpoint` and nothing
    /// is written.
    async fn insert_edge(&self, edge: &Edge) -> StorageResult<()>;

    /// Get an edge by id
    async fn get_edge(&self, id: &EdgeId) -> StorageResult<Option<Edge>>;

    /// Edges incident to a node, each paired with the node at the other end
    ///
    /// Outgoing entries first, then incoming, each by ascending edge id.
    async fn get_neighbors(&self, id: &NodeId, direction: Direction)
        -> StorageResult<Vec<Neighbor>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Bulk Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Count nodes and edges
    async fn stats(&self) -> StorageResult<GraphStats>;
}
