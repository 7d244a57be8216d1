//! Error types for the simulated backend

use genie_api::{DeviceId, ValidationError};
use thiserror::Error;
use warp::http::StatusCode;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Device {0} not found")]
    UnknownDevice(DeviceId),

    #[error("Unknown scene: {0}")]
    UnknownScene(String),

    #[error("Unknown mood '{name}'. Available moods: {available}")]
    UnknownMood { name: String, available: String },

    /// A preview of a mood that does not exist
    #[error("Unknown mood '{0}'")]
    MoodNotFound(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl BackendError {
    pub fn status(&self) -> StatusCode {
        match self {
            BackendError::UnknownDevice(_) | BackendError::MoodNotFound(_) => StatusCode::NOT_FOUND,
            BackendError::UnknownScene(_)
            | BackendError::UnknownMood { .. }
            | BackendError::Invalid(_)
            | BackendError::EmptyMessage
            | BackendError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Errors starting or running the HTTP server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            BackendError::UnknownDevice("fridge".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BackendError::UnknownScene("Party".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BackendError::MoodNotFound("Party".to_string()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            BackendError::UnknownDevice("fridge".into()).to_string(),
            "Device fridge not found"
        );
        assert_eq!(
            BackendError::UnknownScene("Party".to_string()).to_string(),
            "Unknown scene: Party"
        );
    }
}
