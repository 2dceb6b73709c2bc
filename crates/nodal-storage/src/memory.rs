//! In-memory storage backend

use crate::error::{StorageError, StorageResult};
use crate::traits::StorageBackend;
use async_trait::async_trait;
use nodal_core::{Direction, Edge, EdgeId, Endpoint, GraphStats, Neighbor, Node, NodeId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

#[derive(Default)]
struct State {
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
    nodes_by_type: HashMap<String, BTreeSet<NodeId>>,
    outgoing: HashMap<NodeId, BTreeSet<EdgeId>>,
    incoming: HashMap<NodeId, BTreeSet<EdgeId>>,
}

impl State {
    fn collect(
        &self,
        index: &HashMap<NodeId, BTreeSet<EdgeId>>,
        id: &NodeId,
        direction: Direction,
        out: &mut Vec<Neighbor>,
    ) {
        let Some(edge_ids) = index.get(id) else {
            return;
        };
        for edge_id in edge_ids {
            let Some(edge) = self.edges.get(edge_id) else {
                tracing::warn!("Adjacency entry for {} points at missing edge {}", id, edge_id);
                continue;
            };
            let other = match direction {
                Direction::In => &edge.source_id,
                _ => &edge.target_id,
            };
            match self.nodes.get(other) {
                Some(node) => out.push(Neighbor {
                    node: node.clone(),
                    edge: edge.clone(),
                    direction,
                }),
                None => tracing::warn!("Edge {} points at missing node {}", edge_id, other),
            }
        }
    }
}

/// In-memory storage backend
///
/// The whole graph sits behind one lock, which makes every operation
/// atomic. Useful for testing and for stores without a storage path.
pub struct MemoryStorage {
    state: RwLock<State>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(!self.state.is_poisoned())
    }

    // Node operations

    async fn insert_node(&self, node: &Node) -> StorageResult<()> {
        let mut state = self.state.write().map_err(StorageError::lock)?;
        if state.nodes.contains_key(&node.id) {
            return Err(StorageError::DuplicateId(node.id.to_string()));
        }
        state
            .nodes_by_type
            .entry(node.node_type.clone())
            .or_default()
            .insert(node.id.clone());
        state.nodes.insert(node.id.clone(), node.clone());
        Ok(())
    }

    async fn get_node(&self, id: &NodeId) -> StorageResult<Option<Node>> {
        let state = self.state.read().map_err(StorageError::lock)?;
        Ok(state.nodes.get(id).cloned())
    }

    async fn get_all_nodes(&self) -> StorageResult<Vec<Node>> {
        let state = self.state.read().map_err(StorageError::lock)?;
        Ok(state.nodes.values().cloned().collect())
    }

    async fn get_nodes_by_type(&self, node_type: &str) -> StorageResult<Vec<Node>> {
        let state = self.state.read().map_err(StorageError::lock)?;
        Ok(state
            .nodes_by_type
            .get(node_type)
            .into_iter()
            .flatten()
            .filter_map(|id| state.nodes.get(id).cloned())
            .collect())
    }

    // Edge operations

    async fn insert_edge(&self, edge: &Edge) -> StorageResult<()> {
        let mut state = self.state.write().map_err(StorageError::lock)?;

        if !state.nodes.contains_key(&edge.source_id) {
            return Err(StorageError::MissingEndpoint {
                endpoint: Endpoint::Source,
                id: edge.source_id.clone(),
            });
        }
        if !state.nodes.contains_key(&edge.target_id) {
            return Err(StorageError::MissingEndpoint {
                endpoint: Endpoint::Target,
                id: edge.target_id.clone(),
            });
        }
        if state.edges.contains_key(&edge.id) {
            return Err(StorageError::DuplicateId(edge.id.to_string()));
        }

        state
            .outgoing
            .entry(edge.source_id.clone())
            .or_default()
            .insert(edge.id.clone());
        state
            .incoming
            .entry(edge.target_id.clone())
            .or_default()
            .insert(edge.id.clone());
        state.edges.insert(edge.id.clone(), edge.clone());
        Ok(())
    }

    async fn get_edge(&self, id: &EdgeId) -> StorageResult<Option<Edge>> {
        let state = self.state.read().map_err(StorageError::lock)?;
        Ok(state.edges.get(id).cloned())
    }

    async fn get_neighbors(
        &self,
        id: &NodeId,
        direction: Direction,
    ) -> StorageResult<Vec<Neighbor>> {
        let state = self.state.read().map_err(StorageError::lock)?;
        let mut neighbors = Vec::new();
        if direction.includes_out() {
            state.collect(&state.outgoing, id, Direction::Out, &mut neighbors);
        }
        if direction.includes_in() {
            state.collect(&state.incoming, id, Direction::In, &mut neighbors);
        }
        Ok(neighbors)
    }

    async fn stats(&self) -> StorageResult<GraphStats> {
        let state = self.state.read().map_err(StorageError::lock)?;
        Ok(GraphStats {
            node_count: state.nodes.len() as u64,
            edge_count: state.edges.len() as u64,
        })
    }
}
