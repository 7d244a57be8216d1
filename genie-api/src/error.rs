use http_client::HttpError;
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors for backend API operations
///
/// Transport details are folded into three kinds a caller can act on:
/// the backend was unreachable, it refused the request, or it answered with
/// something that does not decode.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure or timeout
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Non-2xx reply, with the backend's `detail` message
    #[error("Backend error (HTTP {status}): {detail}")]
    BackendError { status: u16, detail: String },

    /// A 2xx reply whose body could not be decoded or failed validation
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A request parameter was rejected before anything was sent
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] ValidationError),
}

impl ApiError {
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::NetworkError(_))
    }

    pub fn is_backend(&self) -> bool {
        matches!(self, ApiError::BackendError { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::BackendError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Network(msg) => ApiError::NetworkError(msg),
            HttpError::Backend { status, detail } => ApiError::BackendError { status, detail },
            HttpError::Parse(msg) => ApiError::ParseError(msg),
        }
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
