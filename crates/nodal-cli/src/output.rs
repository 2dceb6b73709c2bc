//! Output formatting utilities

use std::fmt;
use std::str::FromStr;

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use nodal_core::{Edge, GraphStats, Neighbor, Node};
use serde::{Deserialize, Serialize};

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{}', expected one of: table, json", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => f.write_str("table"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Pretty JSON for machine consumption
pub fn to_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Table with the shared preset and a header row
fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(headers.to_vec());
    table
}

fn properties_cell(node: &Node) -> String {
    match &node.properties {
        Some(props) if !props.is_empty() => serde_json::to_string(props).unwrap_or_default(),
        _ => String::new(),
    }
}

fn weight_cell(edge: &Edge) -> String {
    edge.weight.map(|w| w.to_string()).unwrap_or_default()
}

/// One row per node
pub fn node_table(nodes: &[Node]) -> String {
    let mut table = table(&["ID", "TYPE", "LABEL", "PROPERTIES"]);
    for node in nodes {
        table.add_row(vec![
            node.id.to_string(),
            node.node_type.clone(),
            node.label.clone(),
            properties_cell(node),
        ]);
    }
    format!("{table}\n")
}

/// Field-per-line view of a single node
pub fn node_detail(node: &Node) -> String {
    let mut out = format!(
        "Node: {}\n  Type: {}\n  Label: {}\n  Created: {}\n",
        node.id, node.node_type, node.label, node.created_at
    );
    if let Some(props) = node.properties.as_ref().filter(|p| !p.is_empty()) {
        out.push_str("  Properties:\n");
        for (key, value) in props {
            let value = serde_json::to_string(value).unwrap_or_default();
            out.push_str(&format!("    {} = {}\n", key, value));
        }
    }
    out
}

pub fn edge_detail(edge: &Edge) -> String {
    let mut out = format!(
        "Edge: {}\n  {} -[{}]-> {}\n",
        edge.id, edge.source_id, edge.edge_type, edge.target_id
    );
    if let Some(weight) = edge.weight {
        out.push_str(&format!("  Weight: {}\n", weight));
    }
    out.push_str(&format!("  Created: {}\n", edge.created_at));
    out
}

/// One row per incident edge
pub fn neighbor_table(neighbors: &[Neighbor]) -> String {
    let mut table = table(&["DIR", "EDGE TYPE", "WEIGHT", "NODE", "TYPE", "LABEL"]);
    for neighbor in neighbors {
        table.add_row(vec![
            neighbor.direction.as_str().to_string(),
            neighbor.edge.edge_type.clone(),
            weight_cell(&neighbor.edge),
            neighbor.node.id.to_string(),
            neighbor.node.node_type.clone(),
            neighbor.node.label.clone(),
        ]);
    }
    format!("{table}\n")
}

pub fn stats_detail(stats: &GraphStats) -> String {
    format!("Nodes: {}\nEdges: {}\n", stats.node_count, stats.edge_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodal_core::{NewEdge, NewNode};

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_node_table_rows() {
        let nodes = vec![
            Node::new(NewNode::new("Technology", "React").with_property("version", "18.2")),
            Node::new(NewNode::new("Language", "TypeScript")),
        ];
        let rendered = node_table(&nodes);

        assert!(rendered.contains("PROPERTIES"));
        assert!(rendered.contains("{\"version\":\"18.2\"}"));
        let ts_id = nodes[1].id.to_string();
        let rows: Vec<&str> = rendered.lines().filter(|l| l.contains(&ts_id)).collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("TypeScript"));

        // Every line spans the same width for ASCII content
        let widths: Vec<usize> = rendered.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{rendered}");
    }

    #[test]
    fn test_empty_table_has_header() {
        let rendered = neighbor_table(&[]);
        assert!(rendered.contains("EDGE TYPE"));
        assert!(rendered.contains("LABEL"));
    }

    #[test]
    fn test_edge_detail_weight() {
        let a = Node::new(NewNode::new("Technology", "React"));
        let b = Node::new(NewNode::new("Language", "TypeScript"));
        let edge = Edge::new(NewEdge::new(a.id.clone(), b.id.clone(), "uses").with_weight(0.5));

        let rendered = edge_detail(&edge);
        assert!(rendered.contains("-[uses]->"));
        assert!(rendered.contains("Weight: 0.5"));

        let edge = Edge::new(NewEdge::new(a.id, b.id, "uses"));
        assert!(!edge_detail(&edge).contains("Weight"));
    }
}
