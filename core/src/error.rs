//! Error types for the reading-list client.
//!
//! # Design
//! Only transport-level failures surface on the normal path. A non-2xx
//! response is still a successful call whose body is handed back to the
//! caller; `Status` exists solely for the opt-in
//! [`HttpResponse::error_for_status`](crate::http::HttpResponse::error_for_status)
//! helper.

use serde_json::Value;
use thiserror::Error;

/// Errors produced while dispatching a call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network, DNS, TLS or protocol failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A header name or value could not be encoded on the wire.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A payload or typed result could not be converted to or from JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: Value },

    /// Callback style was used outside a tokio runtime.
    #[error("no tokio runtime available to drive the call")]
    NoRuntime,
}

impl ApiError {
    /// True when the transport could not reach the server at all.
    pub fn is_connect(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_connect())
    }

    /// Status code carried by a `Status` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;
