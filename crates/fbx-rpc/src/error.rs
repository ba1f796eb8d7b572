//! Error types for node RPC calls.

/// Errors that can occur when talking to a node over JSON-RPC.
///
/// Remote diagnostics (the node's `error` object, a non-2xx body) are kept
/// verbatim so callers can show exactly what the node said.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response (connect, TLS, timeout, body read).
    #[error("{method}: transport error: {source}")]
    Transport {
        /// The RPC method being called.
        method: String,
        /// The underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    /// The node answered with a non-null JSON-RPC `error` object.
    #[error("{method}: node error {code}: {message}")]
    Node {
        /// The RPC method being called.
        method: String,
        /// The `error.code` field, or 0 if absent.
        code: i64,
        /// The `error.message` field, or the raw object if absent.
        message: String,
        /// The raw `error` value.
        payload: serde_json::Value,
    },

    /// The endpoint answered with a non-2xx status and no JSON-RPC error.
    #[error("{method}: HTTP {status}: {body}")]
    HttpStatus {
        /// The RPC method being called.
        method: String,
        /// The HTTP status code.
        status: u16,
        /// The raw response body.
        body: String,
    },

    /// The response was not an envelope, or `result` had the wrong shape.
    #[error("{method}: malformed result: {reason}")]
    MalformedResult {
        /// The RPC method being called.
        method: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Failed to serialize request parameters.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RpcError {
    /// The RPC method the error belongs to, if any.
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Transport { method, .. }
            | Self::Node { method, .. }
            | Self::HttpStatus { method, .. }
            | Self::MalformedResult { method, .. } => Some(method),
            Self::Client(_) | Self::Serialization(_) => None,
        }
    }

    pub(crate) fn malformed(method: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResult {
            method: method.to_string(),
            reason: reason.into(),
        }
    }
}
