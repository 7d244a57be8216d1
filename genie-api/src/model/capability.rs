//! Capability traits over device kinds
//!
//! Callers ask a [`Device`] for a capability instead of matching on its kind.
//! Each accessor is an exhaustive match, so a new variant fails to compile
//! until it states which capabilities it has.

use super::device::{Ac, Blinds, Device, Door, Light, Music, Security};
use super::update::DeviceUpdate;
use crate::validation::{self, check_range, ValidationError};

/// A device with one primary on/off style switch
pub trait Toggleable {
    /// Name of the field the switch lives in (`on`, `playing`, `locked`, ...)
    fn switch_field(&self) -> &'static str;

    fn is_active(&self) -> bool;

    /// Update that sets the switch to `active`
    fn set_active(&self, active: bool) -> DeviceUpdate;

    /// Update that flips the switch
    fn toggle(&self) -> DeviceUpdate {
        self.set_active(!self.is_active())
    }
}

pub trait Dimmable {
    fn brightness(&self) -> u32;

    fn set_brightness(&self, brightness: u32) -> Result<DeviceUpdate, ValidationError> {
        check_range("brightness", brightness, &validation::BRIGHTNESS)?;
        Ok(DeviceUpdate::new().brightness(brightness))
    }
}

pub trait TemperatureControllable {
    fn temperature(&self) -> i32;

    fn set_temperature(&self, temperature: i32) -> Result<DeviceUpdate, ValidationError> {
        check_range("temperature", temperature, &validation::TEMPERATURE)?;
        Ok(DeviceUpdate::new().temperature(temperature))
    }
}

pub trait VolumeControllable {
    fn volume(&self) -> u32;

    /// Output gain in `0.0..=1.0`, linear in volume
    fn gain(&self) -> f32 {
        self.volume().min(100) as f32 / 100.0
    }

    fn set_volume(&self, volume: u32) -> Result<DeviceUpdate, ValidationError> {
        check_range("volume", volume, &validation::VOLUME)?;
        Ok(DeviceUpdate::new().volume(volume))
    }
}

impl Toggleable for Light {
    fn switch_field(&self) -> &'static str {
        "on"
    }
    fn is_active(&self) -> bool {
        self.on
    }
    fn set_active(&self, active: bool) -> DeviceUpdate {
        DeviceUpdate::new().on(active)
    }
}

impl Toggleable for Ac {
    fn switch_field(&self) -> &'static str {
        "on"
    }
    fn is_active(&self) -> bool {
        self.on
    }
    fn set_active(&self, active: bool) -> DeviceUpdate {
        DeviceUpdate::new().on(active)
    }
}

impl Toggleable for Blinds {
    fn switch_field(&self) -> &'static str {
        "open"
    }
    fn is_active(&self) -> bool {
        self.open
    }
    /// Opening raises the blinds fully, closing lowers them fully
    fn set_active(&self, active: bool) -> DeviceUpdate {
        DeviceUpdate::new()
            .open(active)
            .position(if active { 100 } else { 0 })
    }
}

impl Toggleable for Door {
    fn switch_field(&self) -> &'static str {
        "locked"
    }
    fn is_active(&self) -> bool {
        self.locked
    }
    fn set_active(&self, active: bool) -> DeviceUpdate {
        DeviceUpdate::new().locked(active)
    }
}

impl Toggleable for Music {
    fn switch_field(&self) -> &'static str {
        "playing"
    }
    fn is_active(&self) -> bool {
        self.playing
    }
    fn set_active(&self, active: bool) -> DeviceUpdate {
        DeviceUpdate::new().playing(active)
    }
}

impl Toggleable for Security {
    fn switch_field(&self) -> &'static str {
        "armed"
    }
    fn is_active(&self) -> bool {
        self.armed
    }
    fn set_active(&self, active: bool) -> DeviceUpdate {
        DeviceUpdate::new()
            .armed(active)
            .mode(if active { "home" } else { "off" })
    }
}

impl Dimmable for Light {
    fn brightness(&self) -> u32 {
        self.brightness
    }
}

impl TemperatureControllable for Ac {
    fn temperature(&self) -> i32 {
        self.temperature
    }
}

impl VolumeControllable for Music {
    fn volume(&self) -> u32 {
        self.volume
    }
}

impl Device {
    /// Every device kind has a primary switch
    pub fn as_toggleable(&self) -> &dyn Toggleable {
        match self {
            Device::Light(d) => d,
            Device::Ac(d) => d,
            Device::Blinds(d) => d,
            Device::Door(d) => d,
            Device::Music(d) => d,
            Device::Security(d) => d,
        }
    }

    pub fn as_dimmable(&self) -> Option<&dyn Dimmable> {
        match self {
            Device::Light(d) => Some(d as &dyn Dimmable),
            Device::Ac(_)
            | Device::Blinds(_)
            | Device::Door(_)
            | Device::Music(_)
            | Device::Security(_) => None,
        }
    }

    pub fn as_temperature_controllable(&self) -> Option<&dyn TemperatureControllable> {
        match self {
            Device::Ac(d) => Some(d as &dyn TemperatureControllable),
            Device::Light(_)
            | Device::Blinds(_)
            | Device::Door(_)
            | Device::Music(_)
            | Device::Security(_) => None,
        }
    }

    pub fn as_volume_controllable(&self) -> Option<&dyn VolumeControllable> {
        match self {
            Device::Music(d) => Some(d as &dyn VolumeControllable),
            Device::Light(_)
            | Device::Ac(_)
            | Device::Blinds(_)
            | Device::Door(_)
            | Device::Security(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn light(brightness: u32) -> Device {
        Device::Light(Light {
            name: "Kitchen Light".to_string(),
            on: false,
            brightness,
            color: "#FFFFFF".to_string(),
        })
    }

    fn music(volume: u32) -> Device {
        Device::Music(Music {
            name: "Music Player".to_string(),
            playing: true,
            track: "Lo-fi Beats".to_string(),
            volume,
            playlist: None,
        })
    }

    #[test]
    fn test_toggle_flips_primary_switch() {
        let device = light(80);
        let toggle = device.as_toggleable();
        assert_eq!(toggle.switch_field(), "on");
        assert_eq!(toggle.toggle(), DeviceUpdate::new().on(true));
    }

    #[test]
    fn test_blinds_toggle_moves_position() {
        let blinds = Device::Blinds(Blinds {
            name: "Blinds".to_string(),
            open: false,
            position: 0,
        });
        assert_eq!(
            blinds.as_toggleable().toggle(),
            DeviceUpdate::new().open(true).position(100)
        );
    }

    #[test]
    fn test_capabilities_by_kind() {
        assert!(light(50).as_dimmable().is_some());
        assert!(light(50).as_volume_controllable().is_none());
        assert!(music(50).as_volume_controllable().is_some());
        assert!(music(50).as_temperature_controllable().is_none());
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(100, true)]
    #[case(101, false)]
    fn test_set_brightness_bounds(#[case] level: u32, #[case] ok: bool) {
        let device = light(50);
        let dimmable = device.as_dimmable().unwrap();
        assert_eq!(dimmable.set_brightness(level).is_ok(), ok);
    }

    #[rstest]
    #[case(0, 0.0)]
    #[case(50, 0.5)]
    #[case(100, 1.0)]
    fn test_gain_is_linear(#[case] volume: u32, #[case] gain: f32) {
        let device = music(volume);
        let controllable = device.as_volume_controllable().unwrap();
        assert!((controllable.gain() - gain).abs() < f32::EPSILON);
    }

    #[test]
    fn test_volume_out_of_range_rejected() {
        let device = music(50);
        let controllable = device.as_volume_controllable().unwrap();
        assert!(controllable.set_volume(101).is_err());
    }
}
