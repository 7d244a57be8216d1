//! In-memory device simulator

use genie_api::{
    Ac, Blinds, Device, DeviceId, DeviceMap, DeviceUpdate, Door, Light, Music, Security, Validate,
};

use crate::error::BackendError;
use crate::scenes;

/// The devices a fresh simulator starts with
pub fn default_devices() -> DeviceMap {
    let light = |name: &str, brightness: u32, color: &str| {
        Device::Light(Light {
            name: name.to_string(),
            on: false,
            brightness,
            color: color.to_string(),
        })
    };

    let mut devices = DeviceMap::new();
    devices.insert(
        "light_living_room".into(),
        light("Living Room Light", 70, "#FFD700"),
    );
    devices.insert("light_kitchen".into(), light("Kitchen Light", 80, "#FFFFFF"));
    devices.insert("light_bedroom".into(), light("Bedroom Light", 60, "#FFF8DC"));
    devices.insert(
        "ac_main".into(),
        Device::Ac(Ac {
            name: "Main AC".to_string(),
            on: false,
            temperature: 22,
            mode: Some("cool".to_string()),
            fan_speed: Some("medium".to_string()),
        }),
    );
    devices.insert(
        "blinds_living_room".into(),
        Device::Blinds(Blinds {
            name: "Living Room Blinds".to_string(),
            open: false,
            position: 0,
        }),
    );
    devices.insert(
        "door_front".into(),
        Device::Door(Door {
            name: "Front Door".to_string(),
            locked: true,
        }),
    );
    devices.insert(
        "music_player".into(),
        Device::Music(Music {
            name: "Music Player".to_string(),
            playing: false,
            track: "None".to_string(),
            volume: 50,
            playlist: Some("Chill Vibes".to_string()),
        }),
    );
    devices.insert(
        "security_system".into(),
        Device::Security(Security {
            name: "Security System".to_string(),
            armed: true,
            mode: "home".to_string(),
        }),
    );
    devices
}

/// Holds the authoritative device table
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSimulator {
    devices: DeviceMap,
}

impl Default for DeviceSimulator {
    fn default() -> Self {
        Self::with_devices(default_devices())
    }
}

impl DeviceSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_devices(devices: DeviceMap) -> Self {
        Self { devices }
    }

    pub fn devices(&self) -> &DeviceMap {
        &self.devices
    }

    pub fn get(&self, device_id: &DeviceId) -> Result<&Device, BackendError> {
        self.devices
            .get(device_id)
            .ok_or_else(|| BackendError::UnknownDevice(device_id.clone()))
    }

    /// Merge `update` into one device and return its full new state
    ///
    /// The update is checked against the device limits first; a rejected
    /// update changes nothing.
    pub fn update(&mut self, device_id: &DeviceId, update: &DeviceUpdate) -> Result<Device, BackendError> {
        update.validate()?;
        let device = self
            .devices
            .get_mut(device_id)
            .ok_or_else(|| BackendError::UnknownDevice(device_id.clone()))?;
        *device = device.merged(update);
        tracing::debug!("Updated {}: {:?}", device_id, update);
        Ok(device.clone())
    }

    /// Apply a named scene and return the whole table afterwards
    pub fn apply_scene(&mut self, scene_name: &str) -> Result<DeviceMap, BackendError> {
        let changes = scenes::scene(scene_name)
            .ok_or_else(|| BackendError::UnknownScene(scene_name.to_string()))?;

        for (device_id, update) in changes {
            let device_id = DeviceId::from(device_id);
            match self.devices.get_mut(&device_id) {
                Some(device) => *device = device.merged(&update),
                None => tracing::warn!("Scene {} names missing device {}", scene_name, device_id),
            }
        }
        tracing::info!("Applied scene {}", scene_name);
        Ok(self.devices.clone())
    }
}
