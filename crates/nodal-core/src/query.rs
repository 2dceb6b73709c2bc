//! Query types for reading the graph

use crate::edge::{Direction, Edge};
use crate::node::Node;
use crate::property::{Properties, PropertyValue};
use serde::{Deserialize, Serialize};

/// Filter for [`GraphStore::query_nodes`](crate::GraphStore::query_nodes)
///
/// Every supplied field must match (conjunction). The empty filter matches
/// every node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeFilter {
    /// Exact node type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    /// Exact label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Properties that must be present with an equal value
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl NodeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on node type
    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// Filter on label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Require a property value
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.node_type.is_none() && self.label.is_none() && self.properties.is_empty()
    }

    /// Check a node against every supplied field
    pub fn matches(&self, node: &Node) -> bool {
        if let Some(t) = &self.node_type {
            if node.node_type != *t {
                return false;
            }
        }
        if let Some(label) = &self.label {
            if node.label != *label {
                return false;
            }
        }
        self.properties
            .iter()
            .all(|(key, expected)| node.property(key) == Some(expected))
    }
}

/// One edge incident to a node, paired with the node at its other end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Target for outgoing edges, source for incoming ones
    pub node: Node,

    pub edge: Edge,

    /// Side the edge was reached from: `Out` or `In`
    pub direction: Direction,
}

impl Neighbor {
    pub fn outgoing(node: Node, edge: Edge) -> Self {
        Self {
            node,
            edge,
            direction: Direction::Out,
        }
    }

    pub fn incoming(node: Node, edge: Edge) -> Self {
        Self {
            node,
            edge,
            direction: Direction::In,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NewNode;
    use serde_json::json;

    fn react() -> Node {
        Node::new(
            NewNode::new("Technology", "React")
                .with_property("license", "MIT")
                .with_property("year", 2013i64),
        )
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = NodeFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&react()));
        assert!(filter.matches(&Node::new(NewNode::new("Language", "Go"))));
    }

    #[test]
    fn test_filter_is_a_conjunction() {
        let node = react();

        assert!(NodeFilter::new().with_type("Technology").matches(&node));
        assert!(!NodeFilter::new().with_type("technology").matches(&node));
        assert!(NodeFilter::new()
            .with_type("Technology")
            .with_label("React")
            .matches(&node));
        assert!(!NodeFilter::new()
            .with_type("Technology")
            .with_label("Vue")
            .matches(&node));
    }

    #[test]
    fn test_property_filters() {
        let node = react();

        assert!(NodeFilter::new().with_property("year", 2013i64).matches(&node));
        assert!(!NodeFilter::new().with_property("year", 2014i64).matches(&node));
        assert!(!NodeFilter::new().with_property("owner", "Meta").matches(&node));
        assert!(!NodeFilter::new()
            .with_property("year", 2013i64)
            .matches(&Node::new(NewNode::new("Technology", "Bare"))));
    }

    #[test]
    fn test_filter_wire_shape() {
        let filter: NodeFilter =
            serde_json::from_value(json!({"type": "Technology", "properties": {"year": 2013}}))
                .unwrap();
        assert_eq!(filter.node_type.as_deref(), Some("Technology"));
        assert_eq!(filter.properties["year"], PropertyValue::Int(2013));

        let filter: NodeFilter = serde_json::from_value(json!({})).unwrap();
        assert!(filter.is_empty());
    }
}
