//! Shared context behind every handle
//!
//! [`GenieHome`](crate::GenieHome), device handles, the mood applier, the
//! chat orchestrator and music cards all hold one `Arc<HomeContext>`. It owns
//! the API client and the state stores, and is the only place that turns a
//! backend reply into a table write.

use std::sync::Arc;

use genie_api::{Device, DeviceId, DeviceMap, DeviceUpdate, GenieClient};
use genie_state::{DeviceSyncEngine, MoodState, SyncReport, ThemeStore, Transcript};

use crate::{GenieConfig, SdkError};

pub(crate) struct HomeContext {
    pub(crate) client: GenieClient,
    pub(crate) engine: DeviceSyncEngine,
    pub(crate) themes: ThemeStore,
    pub(crate) moods: MoodState,
    pub(crate) transcript: Transcript,
    pub(crate) config: GenieConfig,
}

impl HomeContext {
    pub(crate) fn new(config: GenieConfig) -> Arc<Self> {
        let client = GenieClient::with_timeouts(
            config.base_url.clone(),
            config.connect_timeout,
            config.read_timeout,
        );
        Arc::new(Self {
            client,
            engine: DeviceSyncEngine::new(),
            themes: ThemeStore::new(),
            moods: MoodState::new(),
            transcript: Transcript::new(),
            config,
        })
    }

    /// Send one device update and merge the returned state
    ///
    /// The sequence is taken before the request goes out, so a reply that
    /// arrives after a newer request's reply is dropped for that device.
    pub(crate) fn update_device(
        &self,
        device_id: &DeviceId,
        update: &DeviceUpdate,
    ) -> Result<Arc<Device>, SdkError> {
        let result = self.send_update(device_id, update);
        if let Err(e) = &result {
            tracing::warn!("Failed to update {}: {}", device_id, e);
        }
        result
    }

    fn send_update(
        &self,
        device_id: &DeviceId,
        update: &DeviceUpdate,
    ) -> Result<Arc<Device>, SdkError> {
        let sequence = self.engine.issue_sequence();
        let reply = self.client.update_device(device_id, update)?;

        let mut delta = DeviceMap::new();
        delta.insert(device_id.clone(), reply.state);
        self.engine.apply_update_sequenced(sequence, delta)?;

        Ok(self.engine.require(device_id)?)
    }

    /// Ask the backend for a scene and replace the table with its result
    pub(crate) fn apply_scene(&self, scene_name: &str) -> Result<SyncReport, SdkError> {
        let result = self.request_scene(scene_name);
        match &result {
            Ok(_) => tracing::info!("Scene {} applied", scene_name),
            Err(e) => tracing::warn!("Failed to apply scene {}: {}", scene_name, e),
        }
        result
    }

    fn request_scene(&self, scene_name: &str) -> Result<SyncReport, SdkError> {
        let sequence = self.engine.issue_sequence();
        let reply = self.client.apply_scene(scene_name)?;
        Ok(self.engine.apply_scene_sequenced(sequence, reply.devices)?)
    }

    /// Re-read one device from the backend
    pub(crate) fn refresh_device(&self, device_id: &DeviceId) -> Result<Arc<Device>, SdkError> {
        let sequence = self.engine.issue_sequence();
        let reply = self.client.device(device_id)?;

        let mut delta = DeviceMap::new();
        delta.insert(device_id.clone(), reply.state);
        self.engine.apply_update_sequenced(sequence, delta)?;

        Ok(self.engine.require(device_id)?)
    }
}

impl std::fmt::Debug for HomeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeContext")
            .field("base_url", &self.client.base_url())
            .field("devices", &self.engine.len())
            .field("mood", &self.moods.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::net::TcpListener;
    use std::time::Duration;

    use parking_lot::Mutex;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// A context whose backend refuses every connection
    fn unreachable_context() -> Arc<HomeContext> {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        HomeContext::new(
            GenieConfig::new(format!("http://127.0.0.1:{}/api", port))
                .with_connect_timeout(Duration::from_secs(1)),
        )
    }

    fn capture_warnings(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        buffer.contents()
    }

    #[test]
    fn test_failed_update_is_logged() {
        let context = unreachable_context();
        let kitchen = DeviceId::from("light_kitchen");

        let logs = capture_warnings(|| {
            let err = context
                .update_device(&kitchen, &DeviceUpdate::new().on(true))
                .unwrap_err();
            assert!(err.is_network());
        });

        assert!(logs.contains("WARN"), "{}", logs);
        assert!(logs.contains("Failed to update light_kitchen"), "{}", logs);
        assert!(context.engine.is_empty());
    }

    #[test]
    fn test_failed_scene_is_logged() {
        let context = unreachable_context();

        let logs = capture_warnings(|| {
            assert!(context.apply_scene("Sleep").is_err());
        });

        assert!(logs.contains("Failed to apply scene Sleep"), "{}", logs);
    }
}
