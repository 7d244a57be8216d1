//! Mood selection: theme plus device scene in one step

use std::sync::Arc;

use genie_api::{DeviceMap, Theme};
use genie_state::{Sequence, SyncReport};

use crate::context::HomeContext;
use crate::SdkError;

/// What a successful mood change applied
#[derive(Debug, Clone)]
pub struct MoodOutcome {
    pub mood_name: String,
    pub theme: Arc<Theme>,
    /// Present when the mood carried a device scene
    pub report: Option<SyncReport>,
}

/// Applies moods to the theme store and the device table
///
/// A mood is all or nothing: the scene is validated before either half is
/// written, and on failure neither the theme nor the table changes.
#[derive(Clone)]
pub struct MoodThemeApplier {
    context: Arc<HomeContext>,
}

impl MoodThemeApplier {
    pub(crate) fn new(context: Arc<HomeContext>) -> Self {
        Self { context }
    }

    /// Ask the backend to switch moods, then apply its theme and scene
    ///
    /// Failures are also reported to the transcript as a Genie message.
    pub fn set_mood(&self, name: &str) -> Result<MoodOutcome, SdkError> {
        let result = self.request(name);
        if let Err(e) = &result {
            tracing::warn!("Failed to set mood {}: {}", name, e);
            self.context.transcript.push_genie(e.user_message());
        }
        result
    }

    fn request(&self, name: &str) -> Result<MoodOutcome, SdkError> {
        if !self.context.moods.is_available(name) {
            return Err(SdkError::UnknownMood(name.to_string()));
        }

        let sequence = self.context.engine.issue_sequence();
        let reply = self.context.client.set_mood(name)?;
        let mood_name = reply.mood_name.unwrap_or_else(|| name.to_string());

        self.apply_sequenced(sequence, &mood_name, reply.theme_vars, Some(reply.device_states))
    }

    /// Apply a mood the backend already decided on
    ///
    /// Used for moods chosen server-side (e.g. by a chat reply). `devices`
    /// is a full table when present.
    pub fn apply(
        &self,
        name: &str,
        theme: Theme,
        devices: Option<DeviceMap>,
    ) -> Result<MoodOutcome, SdkError> {
        let sequence = self.context.engine.issue_sequence();
        self.apply_sequenced(sequence, name, theme, devices)
    }

    pub(crate) fn apply_sequenced(
        &self,
        sequence: Sequence,
        name: &str,
        theme: Theme,
        devices: Option<DeviceMap>,
    ) -> Result<MoodOutcome, SdkError> {
        if !self.context.moods.is_available(name) {
            tracing::warn!("Mood {} is not in the mood list, leaving theme unchanged", name);
            return Err(SdkError::UnknownMood(name.to_string()));
        }

        let report = match devices {
            Some(devices) => Some(
                self.context
                    .engine
                    .apply_scene_sequenced(sequence, devices)?,
            ),
            None => None,
        };

        self.context.moods.select(name)?;
        self.context.themes.set(theme);
        tracing::info!("Mood set to {}", name);

        Ok(MoodOutcome {
            mood_name: name.to_string(),
            theme: self.context.themes.current(),
            report,
        })
    }

    /// Theme of a mood, without applying it
    pub fn preview(&self, name: &str) -> Result<Theme, SdkError> {
        Ok(self.context.client.preview_mood(name)?.theme_vars)
    }

    pub fn current(&self) -> Option<String> {
        self.context.moods.current()
    }

    pub fn available(&self) -> Vec<String> {
        self.context.moods.available()
    }
}

impl std::fmt::Debug for MoodThemeApplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoodThemeApplier")
            .field("current", &self.context.moods.current())
            .finish()
    }
}
