//! MCP server implementation with the cat facts tools.

mod requests;

pub use requests::*;

use crate::client::CatFactsClient;
use crate::config::ServerConfig;
use crate::rate_limit::RateLimiter;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use std::sync::Arc;
use tracing::debug;

/// MCP server wrapping the catfact.ninja API.
///
/// One instance per session: each owns its own client, sharing only the
/// process-wide rate limiter.
pub struct CatFactsServer {
    client: CatFactsClient,
    tool_router: ToolRouter<CatFactsServer>,
}

#[tool_router]
impl CatFactsServer {
    pub fn new(config: Arc<ServerConfig>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            client: CatFactsClient::new(config, limiter),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Get a random cat fact from catfact.ninja API. \
        Optionally constrain the fact to max_length characters (1-500).")]
    async fn get_cat_fact(
        &self,
        Parameters(req): Parameters<GetCatFactRequest>,
    ) -> Result<CallToolResult, McpError> {
        debug!("Tool call: get_cat_fact");
        if let Err(e) = self.client.validate_args(req.max_length) {
            return Ok(e.to_tool_result());
        }
        match self.client.get_single_fact(req.max_length).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => Ok(e.to_tool_result()),
        }
    }

    #[tool(description = "Get multiple random cat facts from catfact.ninja API. \
        limit (1-100, default 5) selects how many; out-of-range values are clamped. \
        max_length (1-500) optionally caps the length of each fact.")]
    async fn get_cat_facts(
        &self,
        Parameters(req): Parameters<GetCatFactsRequest>,
    ) -> Result<CallToolResult, McpError> {
        debug!("Tool call: get_cat_facts");
        if let Err(e) = self.client.validate_args(req.max_length) {
            return Ok(e.to_tool_result());
        }
        match self
            .client
            .get_multiple_facts(req.limit, req.max_length)
            .await
        {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => Ok(e.to_tool_result()),
        }
    }
}

#[tool_handler]
impl ServerHandler for CatFactsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Cat facts server wrapping catfact.ninja. \
                 Use get_cat_fact for a single random fact, get_cat_facts for \
                 several at once (limit 1-100). Both accept an optional \
                 max_length (1-500) to cap fact length."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}
