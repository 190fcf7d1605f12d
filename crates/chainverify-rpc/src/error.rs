//! Failures of one JSON-RPC exchange.

use thiserror::Error;

use crate::request::JsonRpcError;

#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failure or a non-success HTTP status.
    #[error("endpoint unreachable: {0}")]
    Http(String),

    /// The node answered with a JSON-RPC error object.
    #[error("node rejected request ({}): {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    #[error("no answer within {ms} ms")]
    Timeout { ms: u64 },

    /// The body is not a JSON-RPC response, or `result` has another shape.
    #[error("malformed response: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("cannot build HTTP client: {0}")]
    Setup(String),
}

impl TransportError {
    /// Transient failures worth another attempt. A node-side error is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_failures_are_retried() {
        assert!(TransportError::Http("HTTP 503".into()).is_retryable());
        assert!(TransportError::Timeout { ms: 15_000 }.is_retryable());

        let reverted = TransportError::Rpc(JsonRpcError { code: 3, message: "execution reverted".into(), data: None });
        assert!(!reverted.is_retryable());

        let garbage = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        assert!(!TransportError::from(garbage).is_retryable());
    }

    #[test]
    fn node_error_message_names_code() {
        let e = TransportError::Rpc(JsonRpcError { code: -32000, message: "missing trie node".into(), data: None });
        assert_eq!(e.to_string(), "node rejected request (-32000): missing trie node");
    }
}
