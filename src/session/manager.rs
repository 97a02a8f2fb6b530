//! Session manager for the streamable HTTP transport.
//!
//! Each session pairs a fresh `CatFactsServer` with its own transport: a
//! duplex pipe whose server half is driven by a spawned rmcp service task and
//! whose client half is held in the session table. The table is the only
//! shared mutable state; entries are removed when the client terminates the
//! session or when the transport closes, never by time or count.

use super::types::Session;
use crate::config::ServerConfig;
use crate::error::SessionError;
use crate::rate_limit::RateLimiter;
use crate::server::CatFactsServer;
use rmcp::ServiceExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Capacity of the in-memory pipe between the HTTP layer and a session's
/// server instance. Messages are small JSON lines.
const SESSION_PIPE_CAPACITY: usize = 64 * 1024;

type SessionTable = Arc<RwLock<HashMap<String, Arc<Session>>>>;

/// Manager for per-client MCP sessions.
pub struct SessionManager {
    sessions: SessionTable,
    config: Arc<ServerConfig>,
    limiter: Arc<RateLimiter>,
}

impl SessionManager {
    pub fn new(config: Arc<ServerConfig>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
            limiter,
        }
    }

    /// Create a new session for an `initialize` request. The identifier is
    /// registered only after the server instance has answered the handshake;
    /// a failed handshake leaves no table entry behind.
    pub async fn create_session(
        &self,
        initialize: Value,
    ) -> Result<(String, Value), SessionError> {
        let session_id = Uuid::new_v4().to_string();

        let (server_io, client_io) = tokio::io::duplex(SESSION_PIPE_CAPACITY);
        let (server_read, server_write) = tokio::io::split(server_io);
        let (client_read, client_write) = tokio::io::split(client_io);

        // One isolated catalog+client pair per session; only the rate
        // limiter is shared across sessions.
        let server = CatFactsServer::new(self.config.clone(), self.limiter.clone());

        let sessions = self.sessions.clone();
        let task_id = session_id.clone();
        tokio::spawn(async move {
            match server.serve((server_read, server_write)).await {
                Ok(running) => {
                    let _ = running.waiting().await;
                }
                Err(e) => {
                    warn!(session_id = %task_id, error = %e, "Session handshake failed");
                }
            }
            // Transport closed: drop the table entry if the client has not
            // already terminated the session.
            if sessions.write().await.remove(&task_id).is_some() {
                debug!(session_id = %task_id, "Session removed after transport close");
            }
        });

        let session = Arc::new(Session::new(session_id.clone(), client_read, client_write));
        let response = session
            .round_trip(&initialize)
            .await
            .map_err(|e| SessionError::Handshake(e.to_string()))?
            .ok_or_else(|| SessionError::Handshake("initialize must be a request".to_string()))?;

        self.sessions
            .write()
            .await
            .insert(session.id().to_string(), session);
        info!(session_id = %session_id, "Session created");

        Ok((session_id, response))
    }

    /// Forward a message to an existing session. Unknown identifiers fail
    /// with `SessionNotFound` and have no side effects.
    pub async fn forward(&self, id: &str, message: Value) -> Result<Option<Value>, SessionError> {
        let session = self
            .sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::SessionNotFound(id.to_string()))?;

        match session.round_trip(&message).await {
            Err(SessionError::SessionClosed(_)) => {
                // The server side went away underneath us; purge the entry.
                self.sessions.write().await.remove(id);
                Err(SessionError::SessionClosed(id.to_string()))
            }
            other => other,
        }
    }

    /// Terminate a session. Dropping the client half of the pipe closes the
    /// transport, which ends the session's serve task.
    pub async fn close_session(&self, id: &str) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|session| {
                info!(session_id = %session.id(), created_at = %session.created_at(), "Session closed");
            })
            .ok_or_else(|| SessionError::SessionNotFound(id.to_string()))
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop every session; used on process shutdown.
    pub async fn shutdown_all(&self) {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        sessions.clear();
        if count > 0 {
            info!(count, "Closed all sessions on shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use serde_json::json;

    fn manager() -> SessionManager {
        let config = Arc::new(ServerConfig::default());
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig::default()));
        SessionManager::new(config, limiter)
    }

    fn initialize_request() -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "0.0.0"}
            }
        })
    }

    async fn initialized_session(manager: &SessionManager) -> String {
        let (id, response) = manager
            .create_session(initialize_request())
            .await
            .expect("session should be created");
        assert!(response.get("result").is_some(), "handshake response: {response}");
        let ack = manager
            .forward(&id, json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await
            .expect("notification should be accepted");
        assert!(ack.is_none());
        id
    }

    #[tokio::test]
    async fn create_session_registers_unique_ids() {
        let manager = manager();
        let id_a = initialized_session(&manager).await;
        let id_b = initialized_session(&manager).await;
        assert_ne!(id_a, id_b);
        assert_eq!(manager.session_count().await, 2);
    }

    #[tokio::test]
    async fn follow_up_requests_reach_the_same_server() {
        let manager = manager();
        let id = initialized_session(&manager).await;

        let list = json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list", "params": {}});
        let first = manager
            .forward(&id, list.clone())
            .await
            .expect("forward should succeed")
            .expect("tools/list is a request");
        let tools = first["result"]["tools"].as_array().expect("tools array");
        assert_eq!(tools.len(), 2);

        // Repeated catalog queries return unchanged descriptors.
        let relist = json!({"jsonrpc": "2.0", "id": 3, "method": "tools/list", "params": {}});
        let second = manager.forward(&id, relist).await.unwrap().unwrap();
        assert_eq!(first["result"]["tools"], second["result"]["tools"]);
    }

    #[tokio::test]
    async fn unknown_identifier_has_no_side_effects() {
        let manager = manager();
        let err = manager
            .forward("no-such-session", json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::SessionNotFound(_)));
        assert_eq!(manager.session_count().await, 0);
    }

    #[tokio::test]
    async fn closed_session_yields_not_found() {
        let manager = manager();
        let id = initialized_session(&manager).await;
        manager.close_session(&id).await.expect("close should succeed");
        assert_eq!(manager.session_count().await, 0);

        let err = manager
            .forward(&id, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list", "params": {}}))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::SessionNotFound(_)));

        let err = manager.close_session(&id).await.unwrap_err();
        assert!(matches!(err, SessionError::SessionNotFound(_)));
    }
}
