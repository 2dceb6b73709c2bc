//! ReDB storage backend
//!
//! Records are stored as JSON under their id. Three index tables hold
//! composite string keys whose value is the referenced id:
//!
//! - `nodes_by_type`: `"{type}\0{node_id}"`
//! - `edges_out`: `"{source_id}:{edge_id}"`
//! - `edges_in`: `"{target_id}:{edge_id}"`
//!
//! Ids are fixed-width ULID strings, so a range over a key prefix yields
//! entries in ascending id order.

use crate::error::{StorageError, StorageResult};
use crate::migration::Migratable;
use crate::traits::StorageBackend;
use async_trait::async_trait;
use nodal_core::{Direction, Edge, EdgeId, Endpoint, GraphStats, Neighbor, Node, NodeId};
use redb::{
    Database, ReadableTable, ReadableTableMetadata, TableDefinition, WriteTransaction,
};
use serde::de::DeserializeOwned;
use std::path::Path;

// Table definitions
const NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("nodes");
const EDGES: TableDefinition<&str, &[u8]> = TableDefinition::new("edges");
const NODES_BY_TYPE: TableDefinition<&str, &str> = TableDefinition::new("nodes_by_type");
const EDGES_OUT: TableDefinition<&str, &str> = TableDefinition::new("edges_out");
const EDGES_IN: TableDefinition<&str, &str> = TableDefinition::new("edges_in");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const SCHEMA_VERSION_KEY: &str = "schema_version";

/// ReDB storage backend
pub struct RedbStorage {
    db: Database,
}

impl RedbStorage {
    /// Open or create a ReDB database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db };
        storage.migrate_to_latest()?;
        Ok(storage)
    }

    fn type_key(node_type: &str, id: &NodeId) -> String {
        format!("{}\0{}", node_type, id)
    }

    /// Key range covering every entry of `node_type`
    fn type_range(node_type: &str) -> (String, String) {
        (format!("{}\0", node_type), format!("{}\u{1}", node_type))
    }

    fn adjacency_key(node: &NodeId, edge: &EdgeId) -> String {
        format!("{}:{}", node, edge)
    }

    /// Key range covering every adjacency entry of `node`
    fn adjacency_range(node: &NodeId) -> (String, String) {
        // ';' sorts directly after ':'
        (format!("{}:", node), format!("{};", node))
    }

    fn create_tables(txn: &WriteTransaction) -> StorageResult<()> {
        txn.open_table(NODES)?;
        txn.open_table(EDGES)?;
        txn.open_table(NODES_BY_TYPE)?;
        txn.open_table(EDGES_OUT)?;
        txn.open_table(EDGES_IN)?;
        txn.open_table(META)?;
        Ok(())
    }
}

fn read_json<T, Tbl>(table: &Tbl, key: &str) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    Tbl: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(key)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

fn contains<Tbl>(table: &Tbl, key: &str) -> StorageResult<bool>
where
    Tbl: ReadableTable<&'static str, &'static [u8]>,
{
    Ok(table.get(key)?.is_some())
}

/// Resolve the adjacency entries of `node` into neighbors
fn collect_neighbors<Adj, Rec>(
    adjacency: &Adj,
    edges: &Rec,
    nodes: &Rec,
    node: &NodeId,
    direction: Direction,
    out: &mut Vec<Neighbor>,
) -> StorageResult<()>
where
    Adj: ReadableTable<&'static str, &'static str>,
    Rec: ReadableTable<&'static str, &'static [u8]>,
{
    let (start, end) = RedbStorage::adjacency_range(node);
    for entry in adjacency.range(start.as_str()..end.as_str())? {
        let (key, value) = entry?;
        let edge_id = value.value();
        let edge: Edge = read_json(edges, edge_id)?.ok_or_else(|| StorageError::Corrupt {
            key: key.value().to_string(),
            reason: format!("edge {} has no record", edge_id),
        })?;
        let other = match direction {
            Direction::In => &edge.source_id,
            _ => &edge.target_id,
        };
        match read_json::<Node, _>(nodes, &other.to_string())? {
            Some(neighbor) => out.push(Neighbor {
                node: neighbor,
                edge,
                direction,
            }),
            None => tracing::warn!("Edge {} points at missing node {}", edge_id, other),
        }
    }
    Ok(())
}

impl Migratable for RedbStorage {
    fn get_schema_version(&self) -> StorageResult<u32> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(META) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let version = table.get(SCHEMA_VERSION_KEY)?.map(|v| v.value()).unwrap_or(0);
        u32::try_from(version).map_err(|_| StorageError::Corrupt {
            key: SCHEMA_VERSION_KEY.to_string(),
            reason: format!("version {} out of range", version),
        })
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(META)?;
            table.insert(SCHEMA_VERSION_KEY, u64::from(version))?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn run_migration(&self, version: u32) -> StorageResult<()> {
        match version {
            1 => {
                let write_txn = self.db.begin_write()?;
                Self::create_tables(&write_txn)?;
                write_txn.commit()?;
                Ok(())
            }
            other => Err(StorageError::Migration(format!(
                "no migration defined for version {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl StorageBackend for RedbStorage {
    async fn initialize(&self) -> StorageResult<()> {
        self.migrate_to_latest()
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        read_txn.open_table(NODES)?;
        Ok(true)
    }

    async fn insert_node(&self, node: &Node) -> StorageResult<()> {
        let key = node.id.to_string();
        let value = serde_json::to_vec(node)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut nodes = write_txn.open_table(NODES)?;
            if contains(&nodes, &key)? {
                return Err(StorageError::DuplicateId(key));
            }
            nodes.insert(key.as_str(), value.as_slice())?;

            let mut by_type = write_txn.open_table(NODES_BY_TYPE)?;
            let type_key = Self::type_key(&node.node_type, &node.id);
            by_type.insert(type_key.as_str(), key.as_str())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    async fn get_node(&self, id: &NodeId) -> StorageResult<Option<Node>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NODES)?;
        read_json(&table, &id.to_string())
    }

    async fn get_all_nodes(&self) -> StorageResult<Vec<Node>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NODES)?;

        let mut nodes = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let node: Node = serde_json::from_slice(value.value())?;
            nodes.push(node);
        }

        Ok(nodes)
    }

    async fn get_nodes_by_type(&self, node_type: &str) -> StorageResult<Vec<Node>> {
        let read_txn = self.db.begin_read()?;
        let by_type = read_txn.open_table(NODES_BY_TYPE)?;
        let table = read_txn.open_table(NODES)?;

        let (start, end) = Self::type_range(node_type);
        let mut nodes = Vec::new();
        for entry in by_type.range(start.as_str()..end.as_str())? {
            let (key, value) = entry?;
            let node = read_json(&table, value.value())?.ok_or_else(|| StorageError::Corrupt {
                key: key.value().to_string(),
                reason: format!("node {} has no record", value.value()),
            })?;
            nodes.push(node);
        }

        Ok(nodes)
    }

    async fn insert_edge(&self, edge: &Edge) -> StorageResult<()> {
        let key = edge.id.to_string();
        let value = serde_json::to_vec(edge)?;

        let write_txn = self.db.begin_write()?;
        {
            let nodes = write_txn.open_table(NODES)?;
            if !contains(&nodes, &edge.source_id.to_string())? {
                return Err(StorageError::MissingEndpoint {
                    endpoint: Endpoint::Source,
                    id: edge.source_id.clone(),
                });
            }
            if !contains(&nodes, &edge.target_id.to_string())? {
                return Err(StorageError::MissingEndpoint {
                    endpoint: Endpoint::Target,
                    id: edge.target_id.clone(),
                });
            }

            let mut edges = write_txn.open_table(EDGES)?;
            if contains(&edges, &key)? {
                return Err(StorageError::DuplicateId(key));
            }
            edges.insert(key.as_str(), value.as_slice())?;

            let mut out = write_txn.open_table(EDGES_OUT)?;
            out.insert(Self::adjacency_key(&edge.source_id, &edge.id).as_str(), key.as_str())?;

            let mut incoming = write_txn.open_table(EDGES_IN)?;
            incoming.insert(Self::adjacency_key(&edge.target_id, &edge.id).as_str(), key.as_str())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    async fn get_edge(&self, id: &EdgeId) -> StorageResult<Option<Edge>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EDGES)?;
        read_json(&table, &id.to_string())
    }

    async fn get_neighbors(
        &self,
        id: &NodeId,
        direction: Direction,
    ) -> StorageResult<Vec<Neighbor>> {
        let read_txn = self.db.begin_read()?;
        let nodes = read_txn.open_table(NODES)?;
        let edges = read_txn.open_table(EDGES)?;

        let mut neighbors = Vec::new();
        if direction.includes_out() {
            let out = read_txn.open_table(EDGES_OUT)?;
            collect_neighbors(&out, &edges, &nodes, id, Direction::Out, &mut neighbors)?;
        }
        if direction.includes_in() {
            let incoming = read_txn.open_table(EDGES_IN)?;
            collect_neighbors(&incoming, &edges, &nodes, id, Direction::In, &mut neighbors)?;
        }

        Ok(neighbors)
    }

    async fn stats(&self) -> StorageResult<GraphStats> {
        let read_txn = self.db.begin_read()?;
        let nodes = read_txn.open_table(NODES)?;
        let edges = read_txn.open_table(EDGES)?;
        Ok(GraphStats {
            node_count: nodes.len()?,
            edge_count: edges.len()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodal_core::{NewEdge, NewNode};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_redb_storage() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        let storage = RedbStorage::open(&db_path).unwrap();
        storage.initialize().await.unwrap();
        assert!(storage.health_check().await.unwrap());

        let node = Node::new(NewNode::new("Technology", "React").with_property("year", 2013i64));
        storage.insert_node(&node).await.unwrap();

        let retrieved = storage.get_node(&node.id).await.unwrap();
        assert_eq!(retrieved, Some(node));
        assert!(storage.get_node(&NodeId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("graph.redb");

        let a = Node::new(NewNode::new("Technology", "React"));
        let b = Node::new(NewNode::new("Language", "JavaScript"));
        let edge = Edge::new(NewEdge::new(a.id.clone(), b.id.clone(), "uses").with_weight(0.9));
        {
            let storage = RedbStorage::open(&db_path).unwrap();
            storage.insert_node(&a).await.unwrap();
            storage.insert_node(&b).await.unwrap();
            storage.insert_edge(&edge).await.unwrap();
        }

        let storage = RedbStorage::open(&db_path).unwrap();
        assert_eq!(storage.get_schema_version().unwrap(), crate::CURRENT_VERSION);
        assert_eq!(
            storage.stats().await.unwrap(),
            GraphStats {
                node_count: 2,
                edge_count: 1
            }
        );
        let out = storage.get_neighbors(&a.id, Direction::Out).await.unwrap();
        assert_eq!(out, vec![Neighbor::outgoing(b, edge)]);
    }

    #[tokio::test]
    async fn test_type_index_does_not_match_prefixes() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("types.redb")).unwrap();

        let lang = Node::new(NewNode::new("Lang", "Go"));
        let language = Node::new(NewNode::new("Language", "Rust"));
        storage.insert_node(&lang).await.unwrap();
        storage.insert_node(&language).await.unwrap();

        assert_eq!(storage.get_nodes_by_type("Lang").await.unwrap(), vec![lang]);
        assert_eq!(storage.get_nodes_by_type("Language").await.unwrap(), vec![language]);
        assert!(storage.get_nodes_by_type("La").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dangling_edge_writes_nothing() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("dangling.redb")).unwrap();

        let a = Node::new(NewNode::new("Technology", "React"));
        storage.insert_node(&a).await.unwrap();

        let edge = Edge::new(NewEdge::new(a.id.clone(), NodeId::new(), "uses"));
        let err = storage.insert_edge(&edge).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::MissingEndpoint {
                endpoint: Endpoint::Target,
                ..
            }
        ));
        assert_eq!(storage.stats().await.unwrap().edge_count, 0);
        assert!(storage.get_edge(&edge.id).await.unwrap().is_none());
        assert!(storage
            .get_neighbors(&a.id, Direction::Both)
            .await
            .unwrap()
            .is_empty());
    }
}
