//! Nodal MCP - Model Context Protocol server
//!
//! Exposes the graph store operations as MCP tools over a line-delimited
//! JSON-RPC transport.

pub mod handlers;
pub mod server;
pub mod tools;
pub mod transport;

pub use handlers::{ToolCallResponse, ToolHandler};
pub use server::McpServer;
pub use transport::{JsonRpcRequest, JsonRpcResponse, LineTransport};
