//! CLI command implementations

pub mod completions;
pub mod config;
pub mod edge;
pub mod neighbors;
pub mod node;
pub mod stats;
