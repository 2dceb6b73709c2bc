//! Edge types

use crate::node::NodeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ulid::Ulid;

/// Unique identifier for an edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub Ulid);

impl EdgeId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for EdgeId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction for neighbor lookup
///
/// Also used to tag each neighbor with the side it was reached from, in
/// which case it is always `Out` or `In`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Edges whose source is the node
    Out,
    /// Edges whose target is the node
    In,
    #[default]
    Both,
}

impl Direction {
    pub fn includes_out(self) -> bool {
        matches!(self, Self::Out | Self::Both)
    }

    pub fn includes_in(self) -> bool {
        matches!(self, Self::In | Self::Both)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Out => "out",
            Self::In => "in",
            Self::Both => "both",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "out" | "outgoing" => Ok(Self::Out),
            "in" | "incoming" => Ok(Self::In),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "unknown direction '{}', expected one of: out, in, both",
                other
            )),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed edge between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Store-assigned identifier
    pub id: EdgeId,

    pub source_id: NodeId,

    pub target_id: NodeId,

    /// Relationship type, e.g. "depends-on"
    #[serde(rename = "type")]
    pub edge_type: String,

    /// Optional strength of the relationship. `None` is not zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    pub created_at: DateTime<Utc>,
}

impl Edge {
    /// Materialize a new edge with a fresh identifier
    pub fn new(data: NewEdge) -> Self {
        Self {
            id: EdgeId::new(),
            source_id: data.source_id,
            target_id: data.target_id,
            edge_type: data.edge_type,
            weight: data.weight,
            created_at: Utc::now(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.target_id
    }
}

/// Data for creating a new edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEdge {
    pub source_id: NodeId,
    pub target_id: NodeId,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl NewEdge {
    pub fn new(source_id: NodeId, target_id: NodeId, edge_type: impl Into<String>) -> Self {
        Self {
            source_id,
            target_id,
            edge_type: edge_type.into(),
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edge_creation() {
        let (source, target) = (NodeId::new(), NodeId::new());
        let edge = Edge::new(NewEdge::new(source.clone(), target.clone(), "uses"));

        assert_eq!(edge.source_id, source);
        assert_eq!(edge.target_id, target);
        assert_eq!(edge.edge_type, "uses");
        assert!(edge.weight.is_none());
        assert!(!edge.is_self_loop());
    }

    #[test]
    fn test_zero_weight_is_not_absent() {
        let (a, b) = (NodeId::new(), NodeId::new());
        let zero = Edge::new(NewEdge::new(a.clone(), b.clone(), "uses").with_weight(0.0));
        let none = Edge::new(NewEdge::new(a, b, "uses"));

        let zero_json = serde_json::to_value(&zero).unwrap();
        let none_json = serde_json::to_value(&none).unwrap();
        assert_eq!(zero_json["weight"], json!(0.0));
        assert!(none_json.get("weight").is_none());

        let back: Edge = serde_json::from_value(zero_json).unwrap();
        assert_eq!(back.weight, Some(0.0));
        let back: Edge = serde_json::from_value(none_json).unwrap();
        assert_eq!(back.weight, None);
    }

    #[test]
    fn test_new_edge_from_wire() {
        let (a, b) = (NodeId::new(), NodeId::new());
        let edge: NewEdge = serde_json::from_value(json!({
            "sourceId": a.to_string(),
            "targetId": b.to_string(),
            "type": "depends-on",
            "weight": 0.9
        }))
        .unwrap();

        assert_eq!(edge.source_id, a);
        assert_eq!(edge.target_id, b);
        assert_eq!(edge.edge_type, "depends-on");
        assert_eq!(edge.weight, Some(0.9));
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("out".parse::<Direction>().unwrap(), Direction::Out);
        assert_eq!("Incoming".parse::<Direction>().unwrap(), Direction::In);
        assert_eq!("both".parse::<Direction>().unwrap(), Direction::Both);
        assert!("sideways".parse::<Direction>().is_err());
        assert_eq!(serde_json::to_value(Direction::In).unwrap(), json!("in"));
        assert!(Direction::Both.includes_out() && Direction::Both.includes_in());
        assert!(!Direction::Out.includes_in());
    }
}
