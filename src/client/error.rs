//! Admin client error types

use thiserror::Error;

/// Errors returned by the admin client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP 401; the stored token has already been cleared
    #[error("Not authenticated")]
    Unauthorized,

    /// Any other non-2xx response
    #[error("{message} (HTTP {status})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Client-side check failed before anything was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request scope was cancelled or dropped
    #[error("Request cancelled")]
    Cancelled,

    /// Connection, timeout or body decoding failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Server status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized => Some(401),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message shown to the admin in a blocking alert
    pub fn alert_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
