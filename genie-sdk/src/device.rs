//! Device handle with capability-aware setters
//!
//! Provides the same `get()` / `fetch()` / `watch()` pattern for every device:
//!
//! ```rust,ignore
//! let lamp = home.device(&"light_bedroom".into());
//!
//! let cached = lamp.get();            // table value, no network
//! let fresh = lamp.fetch()?;          // GET /device/{id}, merged into the table
//! lamp.set_brightness(30)?;           // validated locally, then POST /device/update
//! lamp.watch();                       // changes appear on home.changes()
//! ```

use std::sync::Arc;

use genie_api::{Device, DeviceId, DeviceUpdate};
use genie_state::Revision;

use crate::context::HomeContext;
use crate::SdkError;

/// Handle onto one device in the table
///
/// Handles are cheap to clone and never hold device state themselves.
#[derive(Clone)]
pub struct DeviceHandle {
    id: DeviceId,
    context: Arc<HomeContext>,
}

impl DeviceHandle {
    pub(crate) fn new(id: DeviceId, context: Arc<HomeContext>) -> Self {
        Self { id, context }
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Current table value
    pub fn get(&self) -> Option<Arc<Device>> {
        self.context.engine.get(&self.id)
    }

    /// Revision at which the table last replaced this device
    pub fn revision(&self) -> Option<Revision> {
        self.context.engine.revision_of(&self.id)
    }

    /// Read the device from the backend and merge it into the table
    pub fn fetch(&self) -> Result<Arc<Device>, SdkError> {
        self.context.refresh_device(&self.id)
    }

    /// Send a partial update; the backend's full reply replaces the table entry
    pub fn update(&self, update: &DeviceUpdate) -> Result<Arc<Device>, SdkError> {
        self.context.update_device(&self.id, update)
    }

    /// Flip the device's primary switch
    pub fn toggle(&self) -> Result<Arc<Device>, SdkError> {
        let device = self.current()?;
        let update = device.as_toggleable().toggle();
        self.update(&update)
    }

    pub fn set_active(&self, active: bool) -> Result<Arc<Device>, SdkError> {
        let device = self.current()?;
        let update = device.as_toggleable().set_active(active);
        self.update(&update)
    }

    pub fn set_brightness(&self, brightness: u32) -> Result<Arc<Device>, SdkError> {
        let device = self.current()?;
        let update = device
            .as_dimmable()
            .ok_or_else(|| self.unsupported("brightness"))?
            .set_brightness(brightness)
            .map_err(genie_api::ApiError::from)?;
        self.update(&update)
    }

    pub fn set_temperature(&self, temperature: i32) -> Result<Arc<Device>, SdkError> {
        let device = self.current()?;
        let update = device
            .as_temperature_controllable()
            .ok_or_else(|| self.unsupported("temperature"))?
            .set_temperature(temperature)
            .map_err(genie_api::ApiError::from)?;
        self.update(&update)
    }

    pub fn set_volume(&self, volume: u32) -> Result<Arc<Device>, SdkError> {
        let device = self.current()?;
        let update = device
            .as_volume_controllable()
            .ok_or_else(|| self.unsupported("volume"))?
            .set_volume(volume)
            .map_err(genie_api::ApiError::from)?;
        self.update(&update)
    }

    /// Report changes to this device on the home's change iterator
    pub fn watch(&self) {
        self.context.engine.watch(self.id.clone());
    }

    pub fn unwatch(&self) {
        self.context.engine.unwatch(&self.id);
    }

    fn current(&self) -> Result<Arc<Device>, SdkError> {
        Ok(self.context.engine.require(&self.id)?)
    }

    fn unsupported(&self, capability: &'static str) -> SdkError {
        SdkError::Unsupported {
            device_id: self.id.clone(),
            capability,
        }
    }
}

impl std::fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceHandle").field("id", &self.id).finish()
    }
}
