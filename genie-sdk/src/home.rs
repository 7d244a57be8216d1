//! GenieHome - Main entry point for the SDK
//!
//! Bootstraps client state from the backend and hands out handles onto it.

use std::sync::Arc;

use genie_api::wire::{ActionPattern, HealthResponse, Insights};
use genie_api::{DeviceId, DeviceKind, Theme};
use genie_state::{
    ChangeIterator, DeviceSyncEngine, MoodState, StyleTarget, SyncReport, TableSnapshot,
    ThemeStore, Transcript,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audio::{AudioSink, MusicCard, TrackCatalog};
use crate::context::HomeContext;
use crate::insights::InsightsFeed;
use crate::{ChatOrchestrator, DeviceHandle, GenieConfig, MoodOutcome, MoodThemeApplier, SdkError};

/// A connected dashboard
///
/// `GenieHome` is fully synchronous. Every call that talks to the backend
/// blocks until the reply has been applied to local state.
///
/// # Example
///
/// ```rust,no_run
/// use genie_sdk::{GenieConfig, GenieHome};
///
/// fn main() -> Result<(), genie_sdk::SdkError> {
///     let home = GenieHome::connect(GenieConfig::default())?;
///
///     // Devices
///     let lamp = home.device(&"light_living_room".into());
///     lamp.set_brightness(60)?;
///
///     // Moods change the theme and the device table together
///     home.set_mood("Sleep")?;
///     println!("{:?}", home.themes().var("accentColor"));
///
///     // Chat
///     let turn = home.chat().send("Turn on all lights")?;
///     println!("{}", turn.reply);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct GenieHome {
    context: Arc<HomeContext>,
    moods: MoodThemeApplier,
    chat: ChatOrchestrator,
}

impl GenieHome {
    /// Connect and load the initial state
    ///
    /// This will:
    /// 1. Fetch the mood list and the current mood's theme
    /// 2. Fetch the full device table
    /// 3. Validate everything, then apply theme and table together
    ///
    /// Nothing is applied if any step fails.
    pub fn connect(config: GenieConfig) -> Result<Self, SdkError> {
        config.validate()?;
        let context = HomeContext::new(config);

        let moods = context.client.moods()?;
        let current = context.client.current_mood()?;
        let sequence = context.engine.issue_sequence();
        let devices = context.client.devices()?;

        DeviceSyncEngine::validate_delta(&devices.devices)?;
        let current_mood = current.current_mood.unwrap_or(moods.current_mood);
        context.moods.reset(moods.moods, &current_mood)?;
        context.themes.set(current.theme_vars);
        context
            .engine
            .apply_scene_sequenced(sequence, devices.devices)?;

        tracing::info!(
            "Connected to {} with {} devices, mood {}",
            context.client.base_url(),
            context.engine.len(),
            current_mood
        );

        let moods = MoodThemeApplier::new(Arc::clone(&context));
        let chat = ChatOrchestrator::new(Arc::clone(&context), moods.clone());
        Ok(Self {
            context,
            moods,
            chat,
        })
    }

    // ========================================================================
    // Devices
    // ========================================================================

    /// Handle onto a device; the id need not exist yet
    pub fn device(&self, device_id: &DeviceId) -> DeviceHandle {
        DeviceHandle::new(device_id.clone(), Arc::clone(&self.context))
    }

    /// Handles for every device of `kind`, sorted by id
    pub fn devices_of_kind(&self, kind: DeviceKind) -> Vec<DeviceHandle> {
        self.context
            .engine
            .ids_of_kind(kind)
            .into_iter()
            .map(|id| self.device(&id))
            .collect()
    }

    /// Point-in-time copy of the whole table
    pub fn devices(&self) -> Result<TableSnapshot, SdkError> {
        Ok(self.context.engine.snapshot()?)
    }

    /// Replace the table with the backend's full device list
    pub fn refresh_devices(&self) -> Result<SyncReport, SdkError> {
        let sequence = self.context.engine.issue_sequence();
        let reply = self.context.client.devices()?;
        Ok(self
            .context
            .engine
            .apply_scene_sequenced(sequence, reply.devices)?)
    }

    pub fn update_device(
        &self,
        device_id: &DeviceId,
        update: &genie_api::DeviceUpdate,
    ) -> Result<Arc<genie_api::Device>, SdkError> {
        self.context.update_device(device_id, update)
    }

    /// Blocking iterator over changes to watched devices
    pub fn changes(&self) -> ChangeIterator<DeviceId> {
        self.context.engine.changes()
    }

    // ========================================================================
    // Scenes and moods
    // ========================================================================

    pub fn scenes(&self) -> Result<Vec<String>, SdkError> {
        Ok(self.context.client.scenes()?.scenes)
    }

    /// Apply a named scene; the backend returns the full table
    pub fn apply_scene(&self, scene_name: &str) -> Result<SyncReport, SdkError> {
        self.context.apply_scene(scene_name)
    }

    pub fn set_mood(&self, mood_name: &str) -> Result<MoodOutcome, SdkError> {
        self.moods.set_mood(mood_name)
    }

    pub fn preview_mood(&self, mood_name: &str) -> Result<Theme, SdkError> {
        self.moods.preview(mood_name)
    }

    pub fn mood_applier(&self) -> &MoodThemeApplier {
        &self.moods
    }

    // ========================================================================
    // Chat
    // ========================================================================

    pub fn chat(&self) -> &ChatOrchestrator {
        &self.chat
    }

    pub fn transcript(&self) -> &Transcript {
        &self.context.transcript
    }

    // ========================================================================
    // State stores
    // ========================================================================

    pub fn engine(&self) -> &DeviceSyncEngine {
        &self.context.engine
    }

    pub fn themes(&self) -> &ThemeStore {
        &self.context.themes
    }

    pub fn moods(&self) -> &MoodState {
        &self.context.moods
    }

    /// Render the current theme, and every later one, into `target`
    pub fn attach_style(&self, target: Arc<dyn StyleTarget>) {
        self.context.themes.attach(target);
    }

    // ========================================================================
    // Audio
    // ========================================================================

    /// Mount a music card for `device_id` playing through `sink`
    pub fn music_card(
        &self,
        device_id: &DeviceId,
        sink: Box<dyn AudioSink>,
    ) -> Result<MusicCard, SdkError> {
        self.music_card_with(device_id, sink, TrackCatalog::bundled(), StdRng::from_entropy())
    }

    /// Like [`music_card`](Self::music_card) with an explicit catalog and RNG
    pub fn music_card_with(
        &self,
        device_id: &DeviceId,
        sink: Box<dyn AudioSink>,
        catalog: TrackCatalog,
        rng: StdRng,
    ) -> Result<MusicCard, SdkError> {
        MusicCard::mount(
            Arc::clone(&self.context),
            device_id.clone(),
            sink,
            catalog,
            rng,
        )
    }

    // ========================================================================
    // Insights
    // ========================================================================

    /// Busiest devices and hours, fetched once
    pub fn insights(&self) -> Result<Insights, SdkError> {
        Ok(self.context.client.insights()?.insights)
    }

    /// Recently logged actions, newest first
    pub fn action_patterns(&self) -> Result<Vec<ActionPattern>, SdkError> {
        Ok(self.context.client.action_patterns()?.patterns)
    }

    /// Start refetching insights every configured interval until dropped
    pub fn insights_feed(&self) -> Result<InsightsFeed, SdkError> {
        InsightsFeed::start(Arc::clone(&self.context))
    }

    // ========================================================================
    // Backend
    // ========================================================================

    pub fn health(&self) -> Result<HealthResponse, SdkError> {
        Ok(self.context.client.health()?)
    }

    pub fn config(&self) -> &GenieConfig {
        &self.context.config
    }
}
