//! MCP tool definitions

use serde::Serialize;

/// MCP tool definition
#[derive(Debug, Serialize)]
pub struct Tool {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Get all available tools
pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "create_node",
            description: "Create a node. Returns the stored node including its assigned id. Nodes are never deduplicated: two calls with the same type and label create two nodes.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["type", "label"],
                "properties": {
                    "type": {"type": "string", "description": "Node classification (e.g. Technology, Language)"},
                    "label": {"type": "string", "description": "Human-readable name, need not be unique"},
                    "properties": {"type": "object", "description": "Optional extra data: strings, numbers, booleans, null, arrays and objects"}
                }
            }),
        },
        Tool {
            name: "get_node",
            description: "Fetch a node by id. Returns {\"node\": null} when no node has that id.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": {"type": "string", "description": "Node id as returned by create_node"}
                }
            }),
        },
        Tool {
            name: "query_nodes",
            description: "List nodes matching every supplied filter field. An empty filter lists all nodes.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "type": {"type": "string", "description": "Exact node type"},
                    "label": {"type": "string", "description": "Exact label"},
                    "properties": {"type": "object", "description": "Properties that must be present with equal values"}
                }
            }),
        },
        Tool {
            name: "create_edge",
            description: "Create a directed edge from sourceId to targetId. Both nodes must exist; otherwise nothing is written and an error is returned.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["sourceId", "targetId", "type"],
                "properties": {
                    "sourceId": {"type": "string", "description": "Id of the source node"},
                    "targetId": {"type": "string", "description": "Id of the target node"},
                    "type": {"type": "string", "description": "Relationship type (e.g. uses, depends-on)"},
                    "weight": {"type": "number", "description": "Optional strength or confidence of the relationship"}
                }
            }),
        },
        Tool {
            name: "get_neighbors",
            description: "List the edges touching a node together with the node at the other end. One entry per edge; each entry says whether it was reached as an outgoing or incoming edge.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["nodeId"],
                "properties": {
                    "nodeId": {"type": "string", "description": "Id of the node to start from"},
                    "direction": {"type": "string", "enum": ["out", "in", "both"], "description": "Which edges to follow (default: 'both')", "default": "both"}
                }
            }),
        },
        Tool {
            name: "graph_stats",
            description: "Count the nodes and edges in the store.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tool_names_are_unique() {
        let tools = get_tools();
        let names: HashSet<_> = tools.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), tools.len());
    }

    #[test]
    fn test_schemas_are_objects() {
        for tool in get_tools() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
        }
    }
}
