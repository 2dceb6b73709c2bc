//! MCP tool handlers

use std::sync::Arc;

use nodal_core::{
    Direction, Endpoint, Error, GraphStore, NewEdge, NewNode, NodeFilter, NodeId,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// MCP tool call response
#[derive(Debug, Serialize)]
pub struct ToolCallResponse {
    pub content: Vec<ContentBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "isError")]
    pub is_error: Option<bool>,
}

/// Content block for responses
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolCallResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }

    pub fn json<T: Serialize>(data: &T) -> Self {
        match serde_json::to_string_pretty(data) {
            Ok(json) => Self::text(json),
            Err(e) => Self::error(format!("JSON serialization error: {}", e)),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text {
                text: message.into(),
            }],
            is_error: Some(true),
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Text of the first content block
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|block| match block {
            ContentBlock::Text { text } => text.as_str(),
        })
    }
}

impl From<Error> for ToolCallResponse {
    fn from(err: Error) -> Self {
        Self::error(err.to_string())
    }
}

fn parse_args<T: DeserializeOwned>(args: serde_json::Value) -> Result<T, ToolCallResponse> {
    // Tools without required fields accept a missing arguments object
    let args = if args.is_null() {
        serde_json::json!({})
    } else {
        args
    };
    serde_json::from_value(args)
        .map_err(|e| ToolCallResponse::error(format!("Invalid arguments: {}", e)))
}

fn parse_endpoint(endpoint: Endpoint, raw: &str) -> Result<NodeId, Error> {
    NodeId::from_string(raw).map_err(|_| Error::reference(endpoint, raw))
}

/// Tool outcome; the error side is already a response flagged `isError`
type ToolResult = Result<ToolCallResponse, ToolCallResponse>;

/// Tool handler that processes tool calls against a graph store
pub struct ToolHandler<G: GraphStore> {
    store: Arc<G>,
}

impl<G: GraphStore + 'static> ToolHandler<G> {
    pub fn new(store: Arc<G>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, name: &str, args: serde_json::Value) -> ToolCallResponse {
        tracing::debug!("Handling tool call: {}", name);

        let result = match name {
            "create_node" => self.create_node(args).await,
            "get_node" => self.get_node(args).await,
            "query_nodes" => self.query_nodes(args).await,
            "create_edge" => self.create_edge(args).await,
            "get_neighbors" => self.get_neighbors(args).await,
            "graph_stats" => self.graph_stats().await,
            _ => Err(ToolCallResponse::error(format!("Unknown tool: {}", name))),
        };

        result.unwrap_or_else(|response| response)
    }

    async fn create_node(&self, args: serde_json::Value) -> ToolResult {
        let data: NewNode = parse_args(args)?;
        let node = self.store.create_node(data).await?;
        tracing::info!("Created node {} ({})", node.id, node.node_type);
        Ok(ToolCallResponse::json(&node))
    }

    async fn get_node(&self, args: serde_json::Value) -> ToolResult {
        #[derive(Deserialize)]
        struct Args {
            id: String,
        }

        let args: Args = parse_args(args)?;
        let node = self.store.get_node_by_str(&args.id).await?;
        Ok(ToolCallResponse::json(&serde_json::json!({ "node": node })))
    }

    async fn query_nodes(&self, args: serde_json::Value) -> ToolResult {
        let filter: NodeFilter = parse_args(args)?;
        let nodes = self.store.query_nodes(&filter).await?;
        Ok(ToolCallResponse::json(&serde_json::json!({
            "nodes": nodes,
            "count": nodes.len(),
        })))
    }

    async fn create_edge(&self, args: serde_json::Value) -> ToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            source_id: String,
            target_id: String,
            #[serde(rename = "type")]
            edge_type: String,
            weight: Option<f64>,
        }

        let args: Args = parse_args(args)?;
        let source_id = parse_endpoint(Endpoint::Source, &args.source_id)?;
        let target_id = parse_endpoint(Endpoint::Target, &args.target_id)?;

        let mut data = NewEdge::new(source_id, target_id, args.edge_type);
        data.weight = args.weight;

        let edge = self.store.create_edge(data).await?;
        tracing::info!("Created edge {} ({} -> {})", edge.id, edge.source_id, edge.target_id);
        Ok(ToolCallResponse::json(&edge))
    }

    async fn get_neighbors(&self, args: serde_json::Value) -> ToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            node_id: String,
            #[serde(default)]
            direction: Option<String>,
        }

        let args: Args = parse_args(args)?;
        let direction = match args.direction.as_deref() {
            Some(raw) => raw
                .parse::<Direction>()
                .map_err(|e| ToolCallResponse::error(format!("Invalid arguments: {}", e)))?,
            None => Direction::default(),
        };

        // An id that cannot name a node has no neighbors
        let neighbors = match NodeId::from_string(&args.node_id) {
            Ok(id) => self.store.get_neighbors(&id, direction).await?,
            Err(_) => Vec::new(),
        };

        Ok(ToolCallResponse::json(&serde_json::json!({
            "neighbors": neighbors,
            "count": neighbors.len(),
        })))
    }

    async fn graph_stats(&self) -> ToolResult {
        let stats = self.store.stats().await?;
        Ok(ToolCallResponse::json(&stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodal_storage::Store;
    use serde_json::{json, Value};

    fn handler() -> ToolHandler<Store> {
        ToolHandler::new(Arc::new(Store::in_memory()))
    }

    fn body(response: &ToolCallResponse) -> Value {
        assert!(!response.is_error(), "{:?}", response.first_text());
        serde_json::from_str(response.first_text().unwrap()).unwrap()
    }

    async fn create(handler: &ToolHandler<Store>, node_type: &str, label: &str) -> String {
        let response = handler
            .handle("create_node", json!({"type": node_type, "label": label}))
            .await;
        body(&response)["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_create_and_get_node() {
        let handler = handler();
        let response = handler
            .handle(
                "create_node",
                json!({"type": "Technology", "label": "React", "properties": {"version": "18.2"}}),
            )
            .await;
        let created = body(&response);
        assert_eq!(created["type"], "Technology");
        assert_eq!(created["properties"]["version"], "18.2");

        let id = created["id"].as_str().unwrap();
        let fetched = body(&handler.handle("get_node", json!({"id": id})).await);
        assert_eq!(fetched["node"], created);
    }

    #[tokio::test]
    async fn test_get_unknown_node_is_null() {
        let handler = handler();
        let missing = NodeId::new().to_string();
        let fetched = body(&handler.handle("get_node", json!({ "id": missing })).await);
        assert!(fetched["node"].is_null());

        let fetched = body(&handler.handle("get_node", json!({"id": "not-an-id"})).await);
        assert!(fetched["node"].is_null());
    }

    #[tokio::test]
    async fn test_query_nodes_by_type() {
        let handler = handler();
        create(&handler, "Technology", "React").await;
        create(&handler, "Language", "TypeScript").await;
        create(&handler, "Technology", "Vue").await;

        let result = body(&handler.handle("query_nodes", json!({"type": "Technology"})).await);
        assert_eq!(result["count"], 2);

        let result = body(&handler.handle("query_nodes", Value::Null).await);
        assert_eq!(result["count"], 3);
    }

    #[tokio::test]
    async fn test_create_edge_and_neighbors() {
        let handler = handler();
        let react = create(&handler, "Technology", "React").await;
        let ts = create(&handler, "Language", "TypeScript").await;

        let edge = body(
            &handler
                .handle(
                    "create_edge",
                    json!({"sourceId": react, "targetId": ts, "type": "uses", "weight": 0.9}),
                )
                .await,
        );
        assert_eq!(edge["weight"], 0.9);

        let out = body(
            &handler
                .handle("get_neighbors", json!({"nodeId": react, "direction": "out"}))
                .await,
        );
        assert_eq!(out["count"], 1);
        assert_eq!(out["neighbors"][0]["node"]["label"], "TypeScript");
        assert_eq!(out["neighbors"][0]["direction"], "out");

        let both = body(&handler.handle("get_neighbors", json!({"nodeId": ts})).await);
        assert_eq!(both["count"], 1);
        assert_eq!(both["neighbors"][0]["direction"], "in");
        assert_eq!(both["neighbors"][0]["node"]["label"], "React");
    }

    #[tokio::test]
    async fn test_dangling_edge_is_tool_error() {
        let handler = handler();
        let react = create(&handler, "Technology", "React").await;

        let response = handler
            .handle(
                "create_edge",
                json!({"sourceId": react, "targetId": NodeId::new().to_string(), "type": "uses"}),
            )
            .await;
        assert!(response.is_error());
        assert!(response.first_text().unwrap().contains("target"));

        let response = handler
            .handle(
                "create_edge",
                json!({"sourceId": "bogus", "targetId": react, "type": "uses"}),
            )
            .await;
        assert!(response.is_error());
        assert!(response.first_text().unwrap().contains("source"));

        let stats = body(&handler.handle("graph_stats", json!({})).await);
        assert_eq!(stats["edgeCount"], 0);
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let handler = handler();
        let response = handler.handle("create_node", json!({"label": "React"})).await;
        assert!(response.is_error());
        assert!(response.first_text().unwrap().starts_with("Invalid arguments"));

        let response = handler
            .handle("get_neighbors", json!({"nodeId": "x", "direction": "sideways"}))
            .await;
        assert!(response.is_error());
    }

    #[tokio::test]
    async fn test_validation_error_is_tool_error() {
        let handler = handler();
        let response = handler
            .handle("create_node", json!({"type": "  ", "label": "React"}))
            .await;
        assert!(response.is_error());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let response = handler().handle("delete_everything", json!({})).await;
        assert!(response.is_error());
        assert_eq!(response.first_text(), Some("Unknown tool: delete_everything"));
    }

    #[tokio::test]
    async fn test_unknown_node_has_no_neighbors() {
        let handler = handler();
        let result = body(
            &handler
                .handle("get_neighbors", json!({"nodeId": NodeId::new().to_string()}))
                .await,
        );
        assert_eq!(result["count"], 0);
        assert_eq!(result["neighbors"], json!([]));
    }
}
