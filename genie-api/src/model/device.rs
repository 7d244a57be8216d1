//! Device identity and per-kind device state

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::update::DeviceUpdate;
use crate::validation::{self, check_range, Validate, ValidationError};

/// Stable backend identifier for a device, e.g. `light_living_room`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Every device the backend reports, keyed by id
pub type DeviceMap = BTreeMap<DeviceId, Device>;

/// The kind tag carried in a device's `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Light,
    Ac,
    Blinds,
    Door,
    Music,
    Security,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Light => "light",
            DeviceKind::Ac => "ac",
            DeviceKind::Blinds => "blinds",
            DeviceKind::Door => "door",
            DeviceKind::Music => "music",
            DeviceKind::Security => "security",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Light {
    pub name: String,
    pub on: bool,
    pub brightness: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ac {
    pub name: String,
    pub on: bool,
    pub temperature: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_speed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blinds {
    pub name: String,
    pub open: bool,
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub name: String,
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Music {
    pub name: String,
    pub playing: bool,
    pub track: String,
    pub volume: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Security {
    pub name: String,
    pub armed: bool,
    pub mode: String,
}

/// A device as the backend reports it, tagged by `type`
///
/// Fields the model does not know about are ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Device {
    Light(Light),
    Ac(Ac),
    Blinds(Blinds),
    Door(Door),
    Music(Music),
    Security(Security),
}

impl Device {
    pub fn kind(&self) -> DeviceKind {
        match self {
            Device::Light(_) => DeviceKind::Light,
            Device::Ac(_) => DeviceKind::Ac,
            Device::Blinds(_) => DeviceKind::Blinds,
            Device::Door(_) => DeviceKind::Door,
            Device::Music(_) => DeviceKind::Music,
            Device::Security(_) => DeviceKind::Security,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Device::Light(d) => &d.name,
            Device::Ac(d) => &d.name,
            Device::Blinds(d) => &d.name,
            Device::Door(d) => &d.name,
            Device::Music(d) => &d.name,
            Device::Security(d) => &d.name,
        }
    }

    pub fn as_music(&self) -> Option<&Music> {
        match self {
            Device::Music(music) => Some(music),
            _ => None,
        }
    }

    /// A copy of this device with `update` merged in
    ///
    /// Only fields that belong to this kind are taken from the update. The
    /// rest are ignored, so a shared update (e.g. `{on: false}`) can be
    /// merged into any device.
    pub fn merged(&self, update: &DeviceUpdate) -> Device {
        let mut next = self.clone();
        match &mut next {
            Device::Light(light) => {
                merge(&mut light.on, &update.on);
                merge(&mut light.brightness, &update.brightness);
                merge(&mut light.color, &update.color);
            }
            Device::Ac(ac) => {
                merge(&mut ac.on, &update.on);
                merge(&mut ac.temperature, &update.temperature);
                if update.mode.is_some() {
                    ac.mode = update.mode.clone();
                }
                if update.fan_speed.is_some() {
                    ac.fan_speed = update.fan_speed.clone();
                }
            }
            Device::Blinds(blinds) => {
                merge(&mut blinds.open, &update.open);
                merge(&mut blinds.position, &update.position);
            }
            Device::Door(door) => {
                merge(&mut door.locked, &update.locked);
            }
            Device::Music(music) => {
                merge(&mut music.playing, &update.playing);
                merge(&mut music.track, &update.track);
                merge(&mut music.volume, &update.volume);
                if update.playlist.is_some() {
                    music.playlist = update.playlist.clone();
                }
            }
            Device::Security(security) => {
                merge(&mut security.armed, &update.armed);
                merge(&mut security.mode, &update.mode);
            }
        }
        next
    }
}

fn merge<T: Clone>(field: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *field = value.clone();
    }
}

impl Validate for Device {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Device::Light(light) => {
                check_range("brightness", light.brightness, &validation::BRIGHTNESS)
            }
            Device::Ac(ac) => check_range("temperature", ac.temperature, &validation::TEMPERATURE),
            Device::Blinds(blinds) => {
                check_range("position", blinds.position, &validation::POSITION)
            }
            Device::Music(music) => check_range("volume", music.volume, &validation::VOLUME),
            Device::Door(_) | Device::Security(_) => Ok(()),
        }
    }
}
