use genie_api::DeviceId;
use thiserror::Error;

use crate::audio::MediaError;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("State management error: {0}")]
    StateError(#[from] genie_state::StateError),

    #[error("API error: {0}")]
    ApiError(#[from] genie_api::ApiError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("A message is already being sent")]
    RequestInFlight,

    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Unknown mood: {0}")]
    UnknownMood(String),

    #[error("Device {device_id} does not support {capability}")]
    Unsupported {
        device_id: DeviceId,
        capability: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to start background task: {0}")]
    Spawn(#[from] std::io::Error),
}

impl SdkError {
    /// True for failures of the backend round trip itself
    pub fn is_network(&self) -> bool {
        matches!(self, SdkError::ApiError(e) if e.is_network())
    }

    /// Text shown to the user when an action fails
    pub(crate) fn user_message(&self) -> String {
        match self {
            SdkError::ApiError(e) if e.is_network() => {
                "Sorry, I'm having trouble connecting right now. Please try again later.".to_string()
            }
            SdkError::ApiError(genie_api::ApiError::BackendError { detail, .. }) => {
                format!("Sorry, something went wrong: {}", detail)
            }
            other => format!("Sorry, something went wrong: {}", other),
        }
    }
}
