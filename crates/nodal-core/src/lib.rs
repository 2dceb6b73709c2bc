//! Nodal Core - Graph model and store contract
//!
//! This crate provides the node and edge types, property values, query
//! filters and the [`GraphStore`] trait that storage engines implement.

pub mod edge;
pub mod error;
pub mod graph;
pub mod limits;
pub mod node;
pub mod property;
pub mod query;

pub use edge::{Direction, Edge, EdgeId, NewEdge};
pub use error::{Endpoint, Error, Result};
pub use graph::{GraphStats, GraphStore};
pub use limits::ValidationError;
pub use node::{NewNode, Node, NodeId};
pub use property::{Properties, PropertyValue};
pub use query::{Neighbor, NodeFilter};
