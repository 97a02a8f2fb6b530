//! HTTP surface for the session manager.
//!
//! A hand-rolled `tower_service::Service` routes requests to the session
//! table: `POST {mcp_path}` creates or forwards to sessions keyed by the
//! `Mcp-Session-Id` header, `DELETE {mcp_path}` tears a session down,
//! `GET /health` reports liveness, and everything else is a 404.

use super::manager::SessionManager;
use crate::error::SessionError;
use bytes::Bytes;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::http::{header::CONTENT_TYPE, Method, Request, Response, StatusCode};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

/// Header carrying the opaque session identifier.
pub const SESSION_ID_HEADER: &str = "mcp-session-id";
/// Default MCP endpoint path.
pub const DEFAULT_MCP_PATH: &str = "/mcp";
/// Liveness probe path.
pub const HEALTH_PATH: &str = "/health";

/// Routing service over a shared [`SessionManager`].
#[derive(Clone)]
pub struct McpService {
    manager: Arc<SessionManager>,
    mcp_path: &'static str,
}

impl McpService {
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self {
            manager,
            mcp_path: DEFAULT_MCP_PATH,
        }
    }
}

impl<B> tower_service::Service<Request<B>> for McpService
where
    B: http_body::Body + Send + 'static,
    B::Data: Send,
    B::Error: std::fmt::Display,
{
    type Response = Response<BoxBody<Bytes, Infallible>>;
    type Error = Infallible;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let manager = self.manager.clone();
        let mcp_path = self.mcp_path;
        Box::pin(async move { Ok(route(manager, mcp_path, req).await) })
    }
}

async fn route<B>(
    manager: Arc<SessionManager>,
    mcp_path: &str,
    req: Request<B>,
) -> Response<BoxBody<Bytes, Infallible>>
where
    B: http_body::Body + Send + 'static,
    B::Data: Send,
    B::Error: std::fmt::Display,
{
    let path = req.uri().path().to_string();
    let method = req.method().clone();
    if method == Method::GET && path == HEALTH_PATH {
        return health();
    }
    if path == mcp_path {
        return handle_mcp(manager, method, req).await;
    }
    text_response(StatusCode::NOT_FOUND, "Not Found")
}

async fn handle_mcp<B>(
    manager: Arc<SessionManager>,
    method: Method,
    req: Request<B>,
) -> Response<BoxBody<Bytes, Infallible>>
where
    B: http_body::Body + Send + 'static,
    B::Data: Send,
    B::Error: std::fmt::Display,
{
    let session_id = req
        .headers()
        .get(SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    match (method, session_id) {
        (Method::POST, Some(id)) => {
            let message = match read_json_body(req).await {
                Ok(v) => v,
                Err(resp) => return *resp,
            };
            match manager.forward(&id, message).await {
                Ok(Some(response)) => json_response(StatusCode::OK, &response),
                Ok(None) => empty_response(StatusCode::ACCEPTED),
                Err(SessionError::SessionNotFound(_)) | Err(SessionError::SessionClosed(_)) => {
                    text_response(StatusCode::NOT_FOUND, "Session not found")
                }
                Err(SessionError::Malformed(e)) => text_response(StatusCode::BAD_REQUEST, &e),
                Err(e) => text_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
            }
        }
        (Method::POST, None) => {
            let message = match read_json_body(req).await {
                Ok(v) => v,
                Err(resp) => return *resp,
            };
            if message.get("method").and_then(Value::as_str) != Some("initialize") {
                return text_response(
                    StatusCode::BAD_REQUEST,
                    "Expected initialize request to create a session",
                );
            }
            match manager.create_session(message).await {
                Ok((id, response)) => {
                    debug!(session_id = %id, "Handshake complete");
                    let mut resp = json_response(StatusCode::OK, &response);
                    if let Ok(value) = id.parse() {
                        resp.headers_mut().insert(SESSION_ID_HEADER, value);
                    }
                    resp
                }
                Err(e) => text_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
            }
        }
        (Method::DELETE, Some(id)) => match manager.close_session(&id).await {
            Ok(()) => empty_response(StatusCode::OK),
            Err(_) => text_response(StatusCode::NOT_FOUND, "Session not found"),
        },
        (Method::DELETE, None) => {
            text_response(StatusCode::BAD_REQUEST, "Missing Mcp-Session-Id header")
        }
        _ => text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
    }
}

async fn read_json_body<B>(
    req: Request<B>,
) -> Result<Value, Box<Response<BoxBody<Bytes, Infallible>>>>
where
    B: http_body::Body + Send + 'static,
    B::Data: Send,
    B::Error: std::fmt::Display,
{
    let bytes = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return Err(Box::new(text_response(
                StatusCode::BAD_REQUEST,
                &format!("Failed to read body: {e}"),
            )))
        }
    };
    serde_json::from_slice(&bytes).map_err(|e| {
        Box::new(text_response(
            StatusCode::BAD_REQUEST,
            &format!("Invalid JSON: {e}"),
        ))
    })
}

fn health() -> Response<BoxBody<Bytes, Infallible>> {
    let body = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    json_response(StatusCode::OK, &body)
}

fn json_response(status: StatusCode, value: &Value) -> Response<BoxBody<Bytes, Infallible>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(value.to_string())).boxed())
        .expect("valid response")
}

fn text_response(status: StatusCode, message: &str) -> Response<BoxBody<Bytes, Infallible>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from(message.to_string())).boxed())
        .expect("valid response")
}

fn empty_response(status: StatusCode) -> Response<BoxBody<Bytes, Infallible>> {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::new()).boxed())
        .expect("valid response")
}
