//! Attempt outcome classification.
//!
//! # Classification
//! ```text
//! 2xx                      → Success (body decoded as JSON, null if empty)
//! 404 / 405                → NotFoundLike (wrong endpoint guess, advance)
//! other 4xx                → FatalClient (stop, would reproduce identically)
//! 5xx                      → Transient carrying the server status
//! timeout / connect error  → Transient at transport level
//! ```
//!
//! A transport-level Transient against a non-idempotent operation is
//! reclassified as Ambiguous: the write may already have been applied and
//! must never be retried implicitly.

use serde_json::Value;

/// The classified result of a single request attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(Value),
    NotFoundLike {
        status: u16,
    },
    /// Failed but safe to retry on an idempotent operation. `server_status`
    /// is set for 5xx responses and `None` for transport-level failures;
    /// `timed_out` distinguishes deadline expiry from connect errors.
    Transient {
        reason: String,
        server_status: Option<u16>,
        timed_out: bool,
    },
    FatalClient {
        status: u16,
        message: String,
    },
    Ambiguous {
        reason: String,
    },
}

impl AttemptOutcome {
    /// Apply the idempotency rule: a transport failure with no response is
    /// ambiguous for a non-idempotent operation.
    pub fn for_idempotency(self, idempotent: bool) -> Self {
        match self {
            AttemptOutcome::Transient {
                reason,
                server_status: None,
                ..
            } if !idempotent => AttemptOutcome::Ambiguous { reason },
            other => other,
        }
    }

    /// Short label for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Success(_) => "success",
            AttemptOutcome::NotFoundLike { .. } => "not_found",
            AttemptOutcome::Transient { .. } => "transient",
            AttemptOutcome::FatalClient { .. } => "fatal_client",
            AttemptOutcome::Ambiguous { .. } => "ambiguous",
        }
    }
}

/// Classify a response the backend actually produced.
pub async fn classify_response(response: reqwest::Response) -> AttemptOutcome {
    let status = response.status();

    if status.is_success() {
        return match response.bytes().await {
            Ok(body) if body.is_empty() => AttemptOutcome::Success(Value::Null),
            Ok(body) => match serde_json::from_slice(&body) {
                Ok(value) => AttemptOutcome::Success(value),
                // Non-JSON 2xx bodies are still a success; keep the text.
                Err(_) => AttemptOutcome::Success(Value::String(
                    String::from_utf8_lossy(&body).into_owned(),
                )),
            },
            Err(e) => AttemptOutcome::Transient {
                reason: format!("response body read failed: {}", e),
                server_status: None,
                timed_out: false,
            },
        };
    }

    let code = status.as_u16();
    if code == 404 || code == 405 {
        return AttemptOutcome::NotFoundLike { status: code };
    }

    let message = body_snippet(response).await;
    if status.is_client_error() {
        AttemptOutcome::FatalClient {
            status: code,
            message,
        }
    } else {
        AttemptOutcome::Transient {
            reason: format!("server error {}: {}", code, message),
            server_status: Some(code),
            timed_out: false,
        }
    }
}

/// Classify a transport-level failure (no response received).
pub fn classify_transport(error: &reqwest::Error, timeout: std::time::Duration) -> AttemptOutcome {
    let reason = if error.is_timeout() {
        format!("request timed out after {:?}", timeout)
    } else {
        error.to_string()
    };
    AttemptOutcome::Transient {
        reason,
        server_status: None,
        timed_out: error.is_timeout(),
    }
}

async fn body_snippet(response: reqwest::Response) -> String {
    const MAX: usize = 256;
    match response.text().await {
        Ok(text) if text.len() > MAX => {
            let mut end = MAX;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &text[..end])
        }
        Ok(text) => text,
        Err(_) => String::new(),
    }
}
