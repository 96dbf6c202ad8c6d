//! Error taxonomy for the access layer.
//!
//! Every failure the executor can produce is a value of [`ApiError`]; the
//! executor never panics for network-shaped failures. The only unrecoverable
//! fault is a malformed operation definition, surfaced as
//! [`ApiError::InvalidOperation`] when the table is built at startup.

use thiserror::Error;

use crate::executor::operation::OperationError;

/// Errors surfaced by the resilient request path.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No candidate backend responded.
    #[error("no backend reachable: {0}")]
    NetworkUnreachable(String),

    /// A single request exceeded its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Every variant of the operation answered 404/405.
    #[error("no endpoint variant of '{operation}' exists on the backend")]
    NotFound { operation: String },

    /// Fatal 4xx other than 404/405. Retrying would reproduce it identically.
    #[error("client error {status}: {message}")]
    Client { status: u16, message: String },

    /// 5xx from the backend.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// A non-idempotent write failed without a response; the effect may
    /// already be applied server-side. Never retried implicitly.
    #[error("'{operation}' may already have been applied server-side: {reason}")]
    Ambiguous { operation: String, reason: String },

    /// Malformed operation definition (programmer error).
    #[error(transparent)]
    InvalidOperation(#[from] OperationError),
}

impl ApiError {
    /// True when the backend rejected the presented credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Client { status: 401, .. })
    }
}

/// Result type for access-layer operations.
pub type ApiResult<T> = Result<T, ApiError>;
