//! Error types for the HTTP client

use thiserror::Error;

/// Errors that can occur during a backend round trip
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection refused, DNS failure, timeout, or a body that could not be read
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status
    #[error("Backend error (HTTP {status}): {detail}")]
    Backend { status: u16, detail: String },

    /// A 2xx response whose body did not match the expected shape
    #[error("Response parse error: {0}")]
    Parse(String),
}

impl HttpError {
    /// HTTP status for backend errors
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}
