//! MCP server exposing the crypto news tool
//!
//! [`NewsToolServer`] is what the `mcp-server` subcommand runs: a JSON-RPC
//! service over stdin/stdout with a single `fetch_crypto_news` tool. Logging
//! must go to stderr while this server runs.

use crate::error::{McpError, McpResult};
use dapplink_core::NewsItem;
use dapplink_tools::{FetchCryptoNewsTool, FetchNewsArgs, NewsFeed};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler, ServiceExt};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Identity the server reports during the initialize handshake
#[derive(Debug, Clone)]
pub struct ServerIdentity {
    pub name: String,
    pub version: String,
    pub instructions: String,
}

impl Default for ServerIdentity {
    fn default() -> Self {
        Self {
            name: "dapplink-news".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: "Fetches the latest crypto news headlines for the DappLink assistant"
                .to_string(),
        }
    }
}

/// MCP server wrapping [`FetchCryptoNewsTool`]
#[derive(Clone)]
pub struct NewsToolServer {
    tool: Arc<FetchCryptoNewsTool>,
    identity: ServerIdentity,
}

impl NewsToolServer {
    /// Create a server backed by the given feed
    pub fn new(feed: NewsFeed) -> Self {
        Self {
            tool: Arc::new(FetchCryptoNewsTool::new(feed)),
            identity: ServerIdentity::default(),
        }
    }

    /// Replace the reported server identity
    pub fn with_identity(mut self, identity: ServerIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn identity(&self) -> &ServerIdentity {
        &self.identity
    }

    /// The one tool this server declares
    pub fn tool_definition(&self) -> Tool {
        Tool::new(
            self.tool.name(),
            self.tool.description(),
            self.tool.input_schema(),
        )
    }

    /// Execute a tool call by name.
    ///
    /// An unknown name is the only protocol-level error. Feed failures are
    /// absorbed by the tool, so a known name always yields a result envelope.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<&JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        if name != self.tool.name() {
            warn!(tool = %name, "Rejecting call to unknown tool");
            return Err(ErrorData::invalid_params(
                format!("Unknown tool: {name}"),
                None,
            ));
        }

        let args = FetchNewsArgs::from_arguments(arguments);
        debug!(tool = %name, filter = %args.filter, limit = args.limit, "Calling tool");

        let items = self.tool.run(&args).await;
        debug!(tool = %name, items = items.len(), "Tool execution completed");
        Ok(news_envelope(&items))
    }

    /// Serve via stdio until the client disconnects
    pub async fn serve_stdio(self) -> McpResult<()> {
        info!(
            server = %self.identity.name,
            version = %self.identity.version,
            tool = %self.tool.name(),
            "Starting MCP server on stdio"
        );

        let service = self
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| McpError::ServerError(format!("initialize failed: {e}")))?;

        let reason = service
            .waiting()
            .await
            .map_err(|e| McpError::ServerError(e.to_string()))?;

        info!(reason = ?reason, "MCP server stopped");
        Ok(())
    }
}

/// Wrap news items in a tool result.
///
/// The payload is a JSON array in a single text content. If it cannot be
/// serialised the envelope is flagged as an error and carries
/// `{error, message}` instead.
pub fn news_envelope(items: &[NewsItem]) -> CallToolResult {
    match serde_json::to_string_pretty(items) {
        Ok(payload) => CallToolResult::success(vec![Content::text(payload)]),
        Err(e) => {
            warn!(error = %e, "Failed to serialise news items");
            let body = json!({
                "error": "Failed to fetch crypto news",
                "message": e.to_string(),
            });
            CallToolResult::error(vec![Content::text(body.to_string())])
        }
    }
}

impl ServerHandler for NewsToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.identity.name.clone(),
                version: self.identity.version.clone(),
                ..Default::default()
            },
            instructions: Some(self.identity.instructions.clone()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(vec![self.tool_definition()]))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.dispatch(&request.name, request.arguments.as_ref()).await
    }
}
