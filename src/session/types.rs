//! Session type for the streamable HTTP transport.

use crate::error::SessionError;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};
use tokio::sync::Mutex;

struct SessionPipe {
    writer: WriteHalf<DuplexStream>,
    reader: BufReader<ReadHalf<DuplexStream>>,
}

/// One client session: the client-side half of the duplex pipe feeding a
/// dedicated server instance. Owned exclusively by the session table; the
/// pipe mutex serializes requests so they reach the server in arrival order.
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    pipe: Mutex<SessionPipe>,
}

impl Session {
    pub fn new(
        id: String,
        reader: ReadHalf<DuplexStream>,
        writer: WriteHalf<DuplexStream>,
    ) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            pipe: Mutex::new(SessionPipe {
                writer,
                reader: BufReader::new(reader),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Send one JSON-RPC message to the session's server. Requests (messages
    /// carrying an `id`) yield the server's response; notifications yield
    /// `None`. The server never initiates messages of its own, so the next
    /// line after a request is always its response.
    pub async fn round_trip(&self, message: &Value) -> Result<Option<Value>, SessionError> {
        let expects_response = message.get("id").is_some();
        let mut line = serde_json::to_string(message)
            .map_err(|e| SessionError::Malformed(e.to_string()))?;
        line.push('\n');

        let mut pipe = self.pipe.lock().await;
        pipe.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|_| SessionError::SessionClosed(self.id.clone()))?;
        pipe.writer
            .flush()
            .await
            .map_err(|_| SessionError::SessionClosed(self.id.clone()))?;

        if !expects_response {
            return Ok(None);
        }

        let mut response = String::new();
        let n = pipe
            .reader
            .read_line(&mut response)
            .await
            .map_err(|_| SessionError::SessionClosed(self.id.clone()))?;
        if n == 0 {
            return Err(SessionError::SessionClosed(self.id.clone()));
        }

        serde_json::from_str(&response)
            .map(Some)
            .map_err(|e| SessionError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn closed_pipe_reports_the_session_id() {
        let (server_io, client_io) = tokio::io::duplex(1024);
        let (read, write) = tokio::io::split(client_io);
        let session = Session::new("s-1".to_string(), read, write);
        drop(server_io);

        let err = session
            .round_trip(&json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}))
            .await
            .unwrap_err();
        match err {
            SessionError::SessionClosed(id) => assert_eq!(id, session.id()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
