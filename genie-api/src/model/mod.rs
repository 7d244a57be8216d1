//! Typed device and theme model

pub mod capability;
pub mod device;
pub mod theme;
pub mod update;

pub use capability::{Dimmable, TemperatureControllable, Toggleable, VolumeControllable};
pub use device::{Ac, Blinds, Device, DeviceId, DeviceKind, DeviceMap, Door, Light, Music, Security};
pub use theme::Theme;
pub use update::DeviceUpdate;
