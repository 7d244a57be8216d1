//! Typed API for the genie-home backend
//!
//! This crate provides the device and theme model shared by every layer and a
//! blocking client for the backend's JSON interface. It uses the private
//! `http-client` crate for transport.
//!
//! # Model
//!
//! [`Device`] is a sum type over the six device kinds. Callers reach kind
//! specific behaviour through capability accessors rather than matching on a
//! type string:
//!
//! ```rust
//! use genie_api::{Device, Light};
//!
//! let lamp = Device::Light(Light {
//!     name: "Desk Lamp".to_string(),
//!     on: false,
//!     brightness: 40,
//!     color: "#FFFFFF".to_string(),
//! });
//!
//! let update = lamp.as_dimmable().unwrap().set_brightness(80).unwrap();
//! assert_eq!(update.brightness, Some(80));
//! assert!(lamp.as_dimmable().unwrap().set_brightness(0).is_err());
//! ```
//!
//! # Endpoints
//!
//! Every route is an [`Endpoint`] with typed request and response bodies.
//! [`GenieClient`] offers one method per route and a generic
//! [`GenieClient::execute`].

pub mod client;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod validation;
pub mod wire;

pub use client::{GenieClient, DEFAULT_BASE_URL};
pub use endpoint::{Endpoint, Method, NoParams};
pub use error::{ApiError, Result};
pub use model::{
    Ac, Blinds, Device, DeviceId, DeviceKind, DeviceMap, DeviceUpdate, Dimmable, Door, Light,
    Music, Security, TemperatureControllable, Theme, Toggleable, VolumeControllable,
};
pub use validation::{Validate, ValidationError};
pub use wire::{DeviceChanges, MoodChange};
