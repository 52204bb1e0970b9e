//! Error types for the processing-service client.
//!
//! # Design
//! Every call site sees the same small taxonomy. Transport failures stay
//! opaque. A non-success response with a usable `{"detail": ...}` body becomes
//! `Http`; one whose body cannot be read that way is reported separately as
//! `MalformedErrorBody` rather than being folded into a generic parse error.

use thiserror::Error;

use crate::http::TransportError;

/// Errors returned by `ApiClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The exchange could not complete (DNS, refused connection, abort).
    #[error("transport failed: {0}")]
    Transport(#[source] TransportError),

    /// The server answered with a non-2xx status and a `detail` message.
    #[error("HTTP Error: {status} {detail}")]
    Http { status: u16, detail: String },

    /// The server answered with a non-2xx status and a body that is not JSON
    /// or carries no `detail`.
    #[error("HTTP {status} with unreadable error body: {reason}")]
    MalformedErrorBody { status: u16, reason: String },

    /// Query parameters could not be expressed as a query string.
    #[error("invalid query parameters: {0}")]
    InvalidParams(String),

    /// The request parameters or body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The success body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } | ApiError::MalformedErrorBody { status, .. } => Some(*status),
            _ => None,
        }
    }
}
