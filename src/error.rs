//! Error types for the cat facts MCP server.
//!
//! Tool execution errors are returned with `is_error: true` in CallToolResult,
//! while protocol errors (invalid tool name, malformed args) are handled by rmcp.
//! Session-layer errors surface as HTTP status codes in the session service.

use rmcp::model::{CallToolResult, Content};
use thiserror::Error;

/// Tool execution errors - returned with is_error: true in CallToolResult
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    Validation(String),

    #[error("Rate limit exceeded. Try again later.")]
    RateLimitExceeded,

    #[error("Upstream API error: HTTP {0}")]
    Upstream(reqwest::StatusCode),

    #[error("Upstream response could not be decoded: {0}")]
    UpstreamDecode(String),

    #[error("Upstream request failed: {0}")]
    Http(String),
}

impl ToolError {
    /// Convert to MCP CallToolResult with is_error: true
    pub fn to_tool_result(&self) -> CallToolResult {
        CallToolResult {
            content: vec![Content::text(format!("Error: {self}"))],
            is_error: Some(true),
            meta: None,
            structured_content: None,
        }
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ToolError::UpstreamDecode(e.to_string())
        } else {
            ToolError::Http(e.to_string())
        }
    }
}

/// Errors from the HTTP session layer. These never reach tool callers; the
/// session service maps them to status codes.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session closed: {0}")]
    SessionClosed(String),

    #[error("Session handshake failed: {0}")]
    Handshake(String),

    #[error("Malformed message: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_error_result_carries_error_flag() {
        let result = ToolError::RateLimitExceeded.to_tool_result();
        assert_eq!(result.is_error, Some(true));
        let text = result.content[0]
            .as_text()
            .expect("text content")
            .text
            .clone();
        assert!(text.starts_with("Error: "));
        assert!(text.contains("Rate limit exceeded"));
    }

    #[test]
    fn validation_message_is_preserved() {
        let err = ToolError::Validation("max_length must be between 1 and 500".into());
        assert!(err
            .to_string()
            .contains("max_length must be between 1 and 500"));
    }
}
