//! Error taxonomy for the shipment backend client.

use thiserror::Error;

/// Client-side view of a failed API call. `Backend` displays the
/// server's own message verbatim so screens can toast it unchanged.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Could not reach the shipment service at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Unexpected response shape: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Build the error for a non-2xx response. The backend sends
    /// `{"message": ...}` (sometimes `{"error": ...}`); when neither is
    /// there, fall back to a generic status line.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = backend_message(body)
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        ApiError::Backend { status, message }
    }

    /// True for errors worth re-issuing the same request over, which is
    /// a caller decision; the client itself never retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Connection(_) | ApiError::Timeout(_))
    }
}

/// Pull the human-readable message out of an error body, if present.
fn backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for key in ["message", "error"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}
