//! Graph store engine

use crate::config::{BackendKind, StoreConfig};
use crate::error::{StorageError, StorageResult};
use crate::memory::MemoryStorage;
use crate::traits::StorageBackend;
use async_trait::async_trait;
use nodal_core::limits::{validate_new_edge, validate_new_node};
use nodal_core::{
    Direction, Edge, GraphStats, GraphStore, Neighbor, NewEdge, NewNode, Node, NodeFilter,
    NodeId, Result,
};
use std::sync::Arc;

/// Graph store over a storage backend
///
/// Validates input, assigns identities and delegates persistence and
/// indexing to the backend. Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn StorageBackend>,
}

impl Store {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// A fresh, empty store that persists nothing
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Open the store described by `config`
    pub async fn open(config: &StoreConfig) -> StorageResult<Self> {
        let kind = config.effective_backend();
        let backend: Arc<dyn StorageBackend> = match (kind, &config.storage_path) {
            (BackendKind::Memory, path) => {
                if path.is_some() {
                    tracing::warn!("Memory backend ignores storage path {:?}", path);
                }
                Arc::new(MemoryStorage::new())
            }
            #[cfg(feature = "redb")]
            (BackendKind::Redb, Some(path)) => {
                tracing::debug!("Opening redb store at {:?}", path);
                Arc::new(crate::redb::RedbStorage::open(path)?)
            }
            #[cfg(feature = "sqlite")]
            (BackendKind::Sqlite, Some(path)) => {
                tracing::debug!("Opening sqlite store at {:?}", path);
                Arc::new(crate::sqlite::SqliteStorage::open(path)?)
            }
            (kind, _) => {
                return Err(StorageError::Config(format!(
                    "backend '{}' is not available in this build",
                    kind
                )))
            }
        };

        backend.initialize().await?;
        tracing::info!("Opened {} store", kind);
        Ok(Self::new(backend))
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    pub async fn health_check(&self) -> StorageResult<bool> {
        self.backend.health_check().await
    }

    pub async fn close(&self) -> StorageResult<()> {
        self.backend.close().await
    }
}

#[async_trait]
impl GraphStore for Store {
    async fn create_node(&self, data: NewNode) -> Result<Node> {
        validate_new_node(&data)?;

        let node = Node::new(data);
        self.backend.insert_node(&node).await?;
        tracing::info!("Created node {} ({}: {})", node.id, node.node_type, node.label);
        Ok(node)
    }

    async fn get_node(&self, id: &NodeId) -> Result<Option<Node>> {
        tracing::debug!("Get node {}", id);
        Ok(self.backend.get_node(id).await?)
    }

    async fn query_nodes(&self, filter: &NodeFilter) -> Result<Vec<Node>> {
        tracing::debug!("Query nodes: {:?}", filter);
        let candidates = match &filter.node_type {
            Some(node_type) => self.backend.get_nodes_by_type(node_type).await?,
            None => self.backend.get_all_nodes().await?,
        };
        Ok(candidates.into_iter().filter(|n| filter.matches(n)).collect())
    }

    async fn create_edge(&self, data: NewEdge) -> Result<Edge> {
        validate_new_edge(&data)?;

        let edge = Edge::new(data);
        if let Err(e) = self.backend.insert_edge(&edge).await {
            tracing::debug!(
                "Rejected edge {} -[{}]-> {}: {}",
                edge.source_id,
                edge.edge_type,
                edge.target_id,
                e
            );
            return Err(e.into());
        }
        tracing::info!(
            "Created edge {}: {} -[{}]-> {}",
            edge.id,
            edge.source_id,
            edge.edge_type,
            edge.target_id
        );
        Ok(edge)
    }

    async fn get_neighbors(&self, id: &NodeId, direction: Direction) -> Result<Vec<Neighbor>> {
        tracing::debug!("Get neighbors of {} ({})", id, direction);
        Ok(self.backend.get_neighbors(id, direction).await?)
    }

    async fn stats(&self) -> Result<GraphStats> {
        Ok(self.backend.stats().await?)
    }
}
