use serde::Deserialize;
use thiserror::Error;

use super::transport::TransportError;

/// Code for failures that never reached the server.
pub const NETWORK_ERROR: &str = "network_error";

/// Code for responses whose body could not be decoded.
pub const INVALID_RESPONSE: &str = "invalid_response";

/// Message shown when the server could not be reached at all.
pub const UNREACHABLE_MESSAGE: &str =
    "Unable to connect to server. Check your internet connection.";

/// Message shown when a response body could not be decoded.
pub const MALFORMED_MESSAGE: &str = "Received an unreadable response from the server";

/// Maximum length for response bodies echoed into logs
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error payload returned by the remote side, or synthesized locally when the
/// remote side could not provide one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Lenient shape of a failure body: servers do not always send both fields.
#[derive(Debug, Deserialize)]
struct FailureBody {
    code: Option<String>,
    message: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The request never produced a response.
    pub fn transport(error: &TransportError) -> Self {
        tracing::warn!(error = %error, "Transport failure");
        Self::new(NETWORK_ERROR, UNREACHABLE_MESSAGE)
    }

    /// A response arrived but its body did not decode.
    pub fn malformed() -> Self {
        Self::new(INVALID_RESPONSE, MALFORMED_MESSAGE)
    }

    /// Build an error from a non-success response.
    ///
    /// The body's `message` is used when present; otherwise `fallback` is. The
    /// body's `code` is used when present; otherwise `http_<status>`.
    pub fn from_status(status: u16, body: &[u8], fallback: &str) -> Self {
        let status_code = format!("http_{}", status);
        match serde_json::from_slice::<FailureBody>(body) {
            Ok(FailureBody {
                code,
                message: Some(message),
            }) if !message.trim().is_empty() => Self {
                code: code.unwrap_or(status_code),
                message,
            },
            Ok(FailureBody { code, .. }) => Self::new(code.unwrap_or(status_code), fallback),
            Err(e) => {
                tracing::debug!(
                    status,
                    error = %e,
                    body = %Self::truncate_body(&String::from_utf8_lossy(body)),
                    "Failure body is not an error payload"
                );
                Self::new(status_code, fallback)
            }
        }
    }

    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total bytes)", cut, body.len())
        }
    }
}
