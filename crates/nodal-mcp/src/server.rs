//! MCP server implementation

use std::sync::Arc;

use nodal_core::GraphStore;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::handlers::ToolHandler;
use crate::tools::get_tools;
use crate::transport::{
    JsonRpcRequest, JsonRpcResponse, LineTransport, INTERNAL_ERROR, INVALID_PARAMS,
    METHOD_NOT_FOUND, PARSE_ERROR,
};

const SERVER_NAME: &str = "nodal";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP server for a graph store
pub struct McpServer<G: GraphStore> {
    handler: ToolHandler<G>,
}

impl<G: GraphStore + 'static> McpServer<G> {
    pub fn new(store: Arc<G>) -> Self {
        Self {
            handler: ToolHandler::new(store),
        }
    }

    /// Start the MCP server on stdio
    pub async fn run_stdio(&self) -> anyhow::Result<()> {
        tracing::info!("Starting MCP server on stdio");
        self.run(&mut LineTransport::stdio()).await
    }

    /// Serve requests until the reader reaches EOF
    pub async fn run<R, W>(&self, transport: &mut LineTransport<R, W>) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        loop {
            let line = match transport.read_message().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    tracing::info!("EOF on input, shutting down");
                    break;
                }
                Err(e) => {
                    tracing::error!("Failed to read request: {}", e);
                    return Err(e.into());
                }
            };

            let response = match serde_json::from_str::<JsonRpcRequest>(line) {
                Ok(request) => {
                    tracing::debug!("Received request: {}", request.method);
                    self.handle_request(request).await
                }
                Err(e) => {
                    tracing::warn!("Unparseable request: {}", e);
                    Some(JsonRpcResponse::error(
                        serde_json::Value::Null,
                        PARSE_ERROR,
                        format!("Parse error: {}", e),
                    ))
                }
            };

            if let Some(response) = response {
                if let Err(e) = transport.write_response(&response).await {
                    tracing::error!("Failed to write response: {}", e);
                    return Err(e.into());
                }
            }
        }

        Ok(())
    }

    /// Handle one request; notifications get no response
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            tracing::debug!("Notification: {}", request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "tools/list" => {
                JsonRpcResponse::success(id, serde_json::json!({ "tools": get_tools() }))
            }
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: serde_json::Value) -> JsonRpcResponse {
        let result = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            }
        });
        JsonRpcResponse::success(id, result)
    }

    async fn handle_tools_call(
        &self,
        id: serde_json::Value,
        params: serde_json::Value,
    ) -> JsonRpcResponse {
        #[derive(Deserialize)]
        struct ToolCallParams {
            name: String,
            #[serde(default)]
            arguments: serde_json::Value,
        }

        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e))
            }
        };

        tracing::debug!("Tool call: {} with args: {:?}", params.name, params.arguments);

        let response = self.handler.handle(&params.name, params.arguments).await;
        match serde_json::to_value(response) {
            Ok(val) => JsonRpcResponse::success(id, val),
            Err(e) => {
                JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Serialization error: {}", e))
            }
        }
    }
}
