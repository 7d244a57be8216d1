//! Binding between a music device in the table and a playback controller

use std::ops::ControlFlow;
use std::sync::Arc;

use genie_api::{DeviceId, DeviceUpdate};
use parking_lot::Mutex;
use rand::rngs::StdRng;

use super::catalog::{Track, TrackCatalog};
use super::controller::{AudioPlaybackController, PlaybackOutcome, PlaybackState, Progress};
use super::sink::AudioSink;
use crate::context::HomeContext;
use crate::poller::Poller;
use crate::SdkError;

#[derive(Clone)]
struct CardBinding {
    device_id: DeviceId,
    context: Arc<HomeContext>,
    controller: Arc<Mutex<AudioPlaybackController<StdRng>>>,
}

impl CardBinding {
    fn tick(&self) -> PlaybackOutcome {
        let outcome = {
            let mut controller = self.controller.lock();
            let synced = match self.context.engine.get(&self.device_id) {
                Some(device) => controller.sync(&device),
                None => PlaybackOutcome::Unchanged,
            };
            let events = controller.handle_events();
            if synced.is_rejected() || events == PlaybackOutcome::Unchanged {
                synced
            } else {
                events
            }
        };

        if outcome.is_rejected() {
            // Bring the backend's desired state in line with the sink
            let update = DeviceUpdate::new().playing(false);
            if let Err(e) = self.context.update_device(&self.device_id, &update) {
                tracing::warn!(
                    "Failed to report stopped playback for {}: {}",
                    self.device_id,
                    e
                );
            }
        }
        outcome
    }
}

/// A mounted music card
///
/// While mounted, a background poller keeps the sink in step with the device
/// and samples progress every configured interval. Dropping the card stops
/// the poller before pausing the sink, so no tick can run afterwards.
pub struct MusicCard {
    binding: CardBinding,
    poller: Option<Poller>,
}

impl MusicCard {
    pub(crate) fn mount(
        context: Arc<HomeContext>,
        device_id: DeviceId,
        sink: Box<dyn AudioSink>,
        catalog: TrackCatalog,
        rng: StdRng,
    ) -> Result<Self, SdkError> {
        let device = context.engine.require(&device_id)?;
        if device.as_music().is_none() {
            return Err(SdkError::Unsupported {
                device_id,
                capability: "playback",
            });
        }

        let interval = context.config.progress_interval;
        let controller = AudioPlaybackController::with_rng(device_id.clone(), sink, catalog, rng);
        let binding = CardBinding {
            device_id: device_id.clone(),
            context,
            controller: Arc::new(Mutex::new(controller)),
        };

        let ticker = binding.clone();
        let poller = Poller::spawn(format!("music-card-{}", device_id), interval, move || {
            ticker.tick();
            ControlFlow::Continue(())
        })?;

        tracing::debug!("Mounted music card for {}", device_id);
        Ok(Self {
            binding,
            poller: Some(poller),
        })
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.binding.device_id
    }

    /// Reconcile now instead of waiting for the next poll
    pub fn tick(&self) -> PlaybackOutcome {
        self.binding.tick()
    }

    pub fn state(&self) -> PlaybackState {
        self.binding.controller.lock().state()
    }

    pub fn desired_playing(&self) -> bool {
        self.binding.controller.lock().desired_playing()
    }

    pub fn track(&self) -> Option<Track> {
        self.binding.controller.lock().track().cloned()
    }

    pub fn progress(&self) -> Progress {
        self.binding.controller.lock().progress()
    }
}

impl Drop for MusicCard {
    fn drop(&mut self) {
        // Joins the poller thread
        drop(self.poller.take());
        self.binding.controller.lock().shutdown();
        tracing::debug!("Unmounted music card for {}", self.binding.device_id);
    }
}

impl std::fmt::Debug for MusicCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MusicCard")
            .field("device_id", &self.binding.device_id)
            .field("controller", &*self.binding.controller.lock())
            .finish()
    }
}
