//! Session management for the streamable HTTP transport.
//!
//! A *session* is one client's conversation with its own server instance,
//! identified by the opaque token in the `Mcp-Session-Id` header.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                 HTTP Session Layer                     │
//! │                                                        │
//! │  POST /mcp ──▶  McpService                             │
//! │  (Mcp-Session-Id)  ├─ create / forward / close         │
//! │  GET /health       └─ liveness + catch-all 404         │
//! │                                                        │
//! │                 SessionManager                         │
//! │                 └─ sessions: HashMap<String, Session>  │
//! └────────────────────────────────────────────────────────┘
//!                           │ duplex pipe (ndjson)
//!         ┌─────────────────┼─────────────────┐
//!         ▼                 ▼                 ▼
//! ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//! │ CatFactsServer│ │ CatFactsServer│ │ CatFactsServer│
//! │ + client      │ │ + client      │ │ + client      │
//! └──────────────┘  └──────────────┘  └──────────────┘
//!          (shared: one process-wide RateLimiter)
//! ```

mod manager;
mod service;
mod types;

pub use manager::SessionManager;
pub use service::{McpService, DEFAULT_MCP_PATH, HEALTH_PATH, SESSION_ID_HEADER};
pub use types::Session;
