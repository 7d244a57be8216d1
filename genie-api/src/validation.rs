//! Range validation for device fields
//!
//! The same limits guard outgoing updates and incoming snapshots, so a value
//! outside them never reaches the device table from either direction.

use std::fmt::Display;
use std::ops::RangeInclusive;

/// Light brightness, percent
pub const BRIGHTNESS: RangeInclusive<u32> = 1..=100;

/// AC set point, degrees Celsius
pub const TEMPERATURE: RangeInclusive<i32> = 16..=30;

/// Music volume, percent
pub const VOLUME: RangeInclusive<u32> = 0..=100;

/// Blinds position, percent open
pub const POSITION: RangeInclusive<u32> = 0..=100;

/// Validation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Parameter '{parameter}' value '{value}' is out of range ({min}..={max})")]
    RangeError {
        parameter: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("Parameter '{parameter}' value '{value}' is invalid: {reason}")]
    InvalidValue {
        parameter: String,
        value: String,
        reason: String,
    },
}

impl ValidationError {
    pub fn range_error(
        parameter: &str,
        min: impl Display,
        max: impl Display,
        value: impl Display,
    ) -> Self {
        Self::RangeError {
            parameter: parameter.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    pub fn invalid_value(parameter: &str, value: impl Display, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field
    pub fn parameter(&self) -> &str {
        match self {
            Self::RangeError { parameter, .. } | Self::InvalidValue { parameter, .. } => parameter,
        }
    }
}

/// Types whose fields must sit inside the device limits
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Check `value` against `range`, naming `parameter` in the error
pub fn check_range<T>(parameter: &str, value: T, range: &RangeInclusive<T>) -> Result<(), ValidationError>
where
    T: PartialOrd + Display + Copy,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::range_error(
            parameter,
            range.start(),
            range.end(),
            value,
        ))
    }
}
