//! Partial device updates

use serde::{Deserialize, Serialize};

use crate::validation::{self, check_range, Validate, ValidationError};

/// A partial device: only the fields that are `Some` are sent and merged
///
/// The field set is the union of every device kind. `mode` is shared by the
/// AC (`cool`, `heat`, ...) and the security system (`home`, `night`, `off`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist: Option<String>,
}

impl DeviceUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn on(mut self, on: bool) -> Self {
        self.on = Some(on);
        self
    }

    pub fn brightness(mut self, brightness: u32) -> Self {
        self.brightness = Some(brightness);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn temperature(mut self, temperature: i32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn fan_speed(mut self, fan_speed: impl Into<String>) -> Self {
        self.fan_speed = Some(fan_speed.into());
        self
    }

    pub fn open(mut self, open: bool) -> Self {
        self.open = Some(open);
        self
    }

    pub fn position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn armed(mut self, armed: bool) -> Self {
        self.armed = Some(armed);
        self
    }

    pub fn playing(mut self, playing: bool) -> Self {
        self.playing = Some(playing);
        self
    }

    pub fn track(mut self, track: impl Into<String>) -> Self {
        self.track = Some(track.into());
        self
    }

    pub fn volume(mut self, volume: u32) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn playlist(mut self, playlist: impl Into<String>) -> Self {
        self.playlist = Some(playlist.into());
        self
    }
}

impl Validate for DeviceUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(brightness) = self.brightness {
            check_range("brightness", brightness, &validation::BRIGHTNESS)?;
        }
        if let Some(temperature) = self.temperature {
            check_range("temperature", temperature, &validation::TEMPERATURE)?;
        }
        if let Some(volume) = self.volume {
            check_range("volume", volume, &validation::VOLUME)?;
        }
        if let Some(position) = self.position {
            check_range("position", position, &validation::POSITION)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_are_not_serialized() {
        let update = DeviceUpdate::new().on(true).brightness(20);
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"on":true,"brightness":20}"#);
    }

    #[test]
    fn test_empty_update() {
        assert!(DeviceUpdate::new().is_empty());
        assert!(!DeviceUpdate::new().locked(true).is_empty());
    }

    #[test]
    fn test_validate_rejects_first_bad_field() {
        let err = DeviceUpdate::new()
            .temperature(31)
            .volume(50)
            .validate()
            .unwrap_err();
        assert_eq!(err.parameter(), "temperature");
    }
}
