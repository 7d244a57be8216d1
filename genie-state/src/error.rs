//! Error types for genie-state

use std::fmt;

use genie_api::{DeviceId, ValidationError};

/// Result type for genie-state operations
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors that can occur while applying state
#[derive(Debug)]
pub enum StateError {
    /// A device in an incoming delta or snapshot is out of range
    Validation {
        device_id: DeviceId,
        source: ValidationError,
    },

    /// A device id the table has never seen
    UnknownDevice(DeviceId),

    /// A mood name outside the available set
    UnknownMood(String),

    /// Lock poisoned (internal mutex error)
    LockPoisoned,
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Validation { device_id, source } => {
                write!(f, "Invalid state for device {}: {}", device_id, source)
            }
            StateError::UnknownDevice(id) => write!(f, "Device not found: {}", id),
            StateError::UnknownMood(name) => write!(f, "Unknown mood: {}", name),
            StateError::LockPoisoned => write!(f, "Internal lock poisoned"),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Validation { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<device_table::TableError> for StateError {
    fn from(err: device_table::TableError) -> Self {
        match err {
            device_table::TableError::LockPoisoned => StateError::LockPoisoned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_validation_error_has_source() {
        let err = StateError::Validation {
            device_id: DeviceId::new("light_kitchen"),
            source: ValidationError::range_error("brightness", 1, 100, 0),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Invalid state for device light_kitchen"));
    }

    #[test]
    fn test_table_error_conversion() {
        let err: StateError = device_table::TableError::LockPoisoned.into();
        assert!(matches!(err, StateError::LockPoisoned));
    }
}
