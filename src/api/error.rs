//! API error types for the dashboard backend

use thiserror::Error;

/// Errors that can occur when talking to the dashboard backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401 - session cookie missing or expired
    #[error("Unauthorized (401) - please sign in again")]
    Unauthorized,

    /// 402 - the account needs a payment method for this action
    #[error("Payment required (402) - {message}")]
    PaymentRequired { message: String },

    /// 403 - the account lacks permissions (e.g. non-admin on admin routes)
    #[error("Forbidden (403) - insufficient permissions")]
    Forbidden,

    /// Any other non-success status
    #[error("HTTP {status} - {message}")]
    Backend { status: u16, message: String },

    /// Connection refused, DNS failure, TLS error, ...
    #[error("Network error - {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("Unexpected response - {0}")]
    Decode(String),

    /// No backend host configured
    #[error("Backend not configured (set DOCDASH_API__BASE_URL)")]
    NotConfigured,

    /// A local file could not be attached to a request
    #[error("{path}: {message}")]
    File { path: String, message: String },
}

impl ApiError {
    /// Map a non-success HTTP status plus body to an error
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = backend_message(body);
        match status {
            401 => ApiError::Unauthorized,
            402 => ApiError::PaymentRequired { message },
            403 => ApiError::Forbidden,
            _ => ApiError::Backend { status, message },
        }
    }

    /// Text shown to the user in an error toast.
    ///
    /// Backend-provided messages are passed through as-is.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Backend { message, .. } | ApiError::PaymentRequired { message }
                if !message.is_empty() =>
            {
                message.clone()
            }
            other => other.to_string(),
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::Forbidden)
    }

    pub fn is_payment_required(&self) -> bool {
        matches!(self, ApiError::PaymentRequired { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Pull the human-readable message out of an error body.
///
/// The backend answers with `{"message": ..}` or `{"error": ..}`; anything
/// else is returned trimmed.
fn backend_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.trim().to_string()
}
