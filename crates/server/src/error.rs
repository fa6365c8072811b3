//! Structured errors for the pwacache host tools.
//!
//! Engine and registry failures carry their own codes through
//! `pwacache_core::Error`; these cover argument handling in the shim.

use pwacache_client::fetch::UrlError;
use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Structured errors for the host tools.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid input parameters (e.g., empty version tag).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Request target could not be resolved against the origin.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(#[from] UrlError),

    /// Tool output could not be encoded.
    #[error("ENCODE_FAILED: {0}")]
    EncodeFailed(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let code = match &err {
            ToolError::InvalidInput(_) | ToolError::InvalidUrl(_) => -32602,
            ToolError::EncodeFailed(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_code() {
        let err: McpError = ToolError::InvalidInput("static_version must not be empty".into()).into();
        assert_eq!(err.code.0, -32602);
        assert!(err.message.starts_with("INVALID_INPUT"));
    }

    #[test]
    fn test_invalid_url_code() {
        let err: McpError = ToolError::from(UrlError::Empty).into();
        assert_eq!(err.code.0, -32602);
        assert_eq!(err.message, "INVALID_URL: empty URL");
    }

    #[test]
    fn test_encode_failed_code() {
        let err: McpError = ToolError::EncodeFailed("boom".into()).into();
        assert_eq!(err.code.0, -32603);
    }
}
