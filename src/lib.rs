//! Cat Facts MCP Server
//!
//! This library exposes the catfact.ninja REST API as an MCP (Model Context
//! Protocol) tool server with two transport bindings:
//!
//! - **stdio**: one implicit session over stdin/stdout, for local clients.
//! - **streamable HTTP**: per-session server instances keyed by the
//!   `Mcp-Session-Id` header, plus a `/health` liveness probe.
//!
//! # Architecture
//!
//! - **CatFactsClient**: upstream HTTP calls, argument validation, result
//!   formatting. Shares one process-wide [`RateLimiter`] across sessions.
//! - **CatFactsServer**: the MCP tool catalog (`get_cat_fact`,
//!   `get_cat_facts`) built on the `rmcp` tool router.
//! - **SessionManager**: the session table for the HTTP transport; creates
//!   one isolated server+transport pair per session and routes follow-up
//!   requests by identifier.
//!
//! # Tools
//!
//! - `get_cat_fact`: one random fact, optional `max_length` (1-500)
//! - `get_cat_facts`: several facts, optional `limit` (1-100, default 5) and
//!   `max_length` (1-500)

pub mod client;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod server;
pub mod session;

pub use client::CatFactsClient;
pub use config::{RateLimitConfig, ServerConfig};
pub use error::{SessionError, ToolError};
pub use rate_limit::RateLimiter;
pub use server::CatFactsServer;
pub use session::{McpService, SessionManager, SESSION_ID_HEADER};
