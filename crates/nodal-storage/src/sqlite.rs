//! SQLite storage backend

use crate::error::{StorageError, StorageResult};
use crate::migration::Migratable;
use crate::traits::StorageBackend;
use async_trait::async_trait;
use nodal_core::{Direction, Edge, EdgeId, Endpoint, GraphStats, Neighbor, Node, NodeId};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA_V1: &str = r#"
    CREATE TABLE IF NOT EXISTS nodes (
        id TEXT PRIMARY KEY,
        node_type TEXT NOT NULL,
        data TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS edges (
        id TEXT PRIMARY KEY,
        source_id TEXT NOT NULL REFERENCES nodes(id),
        target_id TEXT NOT NULL REFERENCES nodes(id),
        data TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_nodes_type ON nodes(node_type, id);
    CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source_id, id);
    CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_id, id);
"#;

const NEIGHBORS_OUT: &str = "SELECT e.data, n.data FROM edges e \
     JOIN nodes n ON n.id = e.target_id \
     WHERE e.source_id = ?1 ORDER BY e.id";

const NEIGHBORS_IN: &str = "SELECT e.data, n.data FROM edges e \
     JOIN nodes n ON n.id = e.source_id \
     WHERE e.target_id = ?1 ORDER BY e.id";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open or create a SQLite database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Create an in-memory SQLite database (for testing)
    pub fn in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.migrate_to_latest()?;
        Ok(storage)
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(StorageError::lock)
    }

    fn node_exists(conn: &Connection, id: &NodeId) -> StorageResult<bool> {
        let found = conn
            .query_row(
                "SELECT 1 FROM nodes WHERE id = ?1",
                params![id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn query_nodes(conn: &Connection, sql: &str, param: Option<&str>) -> StorageResult<Vec<Node>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(param.iter()), |row| {
            row.get::<_, String>(0)
        })?;

        let mut nodes = Vec::new();
        for row in rows {
            let data = row?;
            nodes.push(serde_json::from_str(&data)?);
        }
        Ok(nodes)
    }

    fn collect_neighbors(
        conn: &Connection,
        sql: &str,
        id: &NodeId,
        direction: Direction,
        out: &mut Vec<Neighbor>,
    ) -> StorageResult<()> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![id.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (edge_data, node_data) = row?;
            out.push(Neighbor {
                node: serde_json::from_str(&node_data)?,
                edge: serde_json::from_str(&edge_data)?,
                direction,
            });
        }
        Ok(())
    }
}

impl Migratable for SqliteStorage {
    fn get_schema_version(&self) -> StorageResult<u32> {
        let conn = self.conn()?;
        let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
        Ok(version)
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.pragma_update(None, "user_version", version)?;
        Ok(())
    }

    fn run_migration(&self, version: u32) -> StorageResult<()> {
        match version {
            1 => {
                let conn = self.conn()?;
                conn.execute_batch(SCHEMA_V1)?;
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
impl StorageBackend for SqliteStorage {
    async fn initialize(&self) -> StorageResult<()> {
        self.migrate_to_latest()
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(true)
    }

    async fn insert_node(&self, node: &Node) -> StorageResult<()> {
        let data = serde_json::to_string(node)?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        if Self::node_exists(&tx, &node.id)? {
            return Err(StorageError::DuplicateId(node.id.to_string()));
        }
        tx.execute(
            "INSERT INTO nodes (id, node_type, data) VALUES (?1, ?2, ?3)",
            params![node.id.to_string(), node.node_type, data],
        )?;
        tx.commit()?;

        Ok(())
    }

    async fn get_node(&self, id: &NodeId) -> StorageResult<Option<Node>> {
        let conn = self.conn()?;
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM nodes WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn get_all_nodes(&self) -> StorageResult<Vec<Node>> {
        let conn = self.conn()?;
        Self::query_nodes(&conn, "SELECT data FROM nodes ORDER BY id", None)
    }

    async fn get_nodes_by_type(&self, node_type: &str) -> StorageResult<Vec<Node>> {
        let conn = self.conn()?;
        Self::query_nodes(
            &conn,
            "SELECT data FROM nodes WHERE node_type = ?1 ORDER BY id",
            Some(node_type),
        )
    }

    async fn insert_edge(&self, edge: &Edge) -> StorageResult<()> {
        let data = serde_json::to_string(edge)?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        if !Self::node_exists(&tx, &edge.source_id)? {
            return Err(StorageError::MissingEndpoint {
                endpoint: Endpoint::Source,
                id: edge.source_id.clone(),
            });
        }
        if !Self::node_exists(&tx, &edge.target_id)? {
            return Err(StorageError::MissingEndpoint {
                endpoint: Endpoint::Target,
                id: edge.target_id.clone(),
            });
        }
        let duplicate = tx
            .query_row(
                "SELECT 1 FROM edges WHERE id = ?1",
                params![edge.id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        if duplicate.is_some() {
            return Err(StorageError::DuplicateId(edge.id.to_string()));
        }

        tx.execute(
            "INSERT INTO edges (id, source_id, target_id, data) VALUES (?1, ?2, ?3, ?4)",
            params![
                edge.id.to_string(),
                edge.source_id.to_string(),
                edge.target_id.to_string(),
                data
            ],
        )?;
        tx.commit()?;

        Ok(())
    }

    async fn get_edge(&self, id: &EdgeId) -> StorageResult<Option<Edge>> {
        let conn = self.conn()?;
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM edges WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn get_neighbors(
        &self,
        id: &NodeId,
        direction: Direction,
    ) -> StorageResult<Vec<Neighbor>> {
        let conn = self.conn()?;
        let mut neighbors = Vec::new();
        if direction.includes_out() {
            Self::collect_neighbors(&conn, NEIGHBORS_OUT, id, Direction::Out, &mut neighbors)?;
        }
        if direction.includes_in() {
            Self::collect_neighbors(&conn, NEIGHBORS_IN, id, Direction::In, &mut neighbors)?;
        }
        Ok(neighbors)
    }

    async fn stats(&self) -> StorageResult<GraphStats> {
        let conn = self.conn()?;
        let (node_count, edge_count): (i64, i64) = conn.query_row(
            "SELECT (SELECT COUNT(*) FROM nodes), (SELECT COUNT(*) FROM edges)",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(GraphStats {
            node_count: node_count as u64,
            edge_count: edge_count as u64,
        })
    }
}
