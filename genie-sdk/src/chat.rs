//! Chat orchestration
//!
//! One message is in flight at a time. A turn goes:
//!
//! 1. the user's text is appended to the transcript (never rolled back)
//! 2. the message is sent to `/talk`
//! 3. device changes in the reply are merged into the table
//! 4. a mood change in the reply is applied to the theme store
//! 5. the reply text is appended to the transcript
//!
//! Any failure after step 1 appends exactly one Genie error message instead
//! of steps 3 to 5, and nothing from the reply is applied.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use genie_api::DeviceId;
use genie_state::DeviceSyncEngine;

use crate::context::HomeContext;
use crate::mood::MoodThemeApplier;
use crate::SdkError;

/// The applied result of one chat exchange
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatTurn {
    pub reply: String,
    /// Devices replaced in the table, sorted
    pub devices_updated: Vec<DeviceId>,
    /// Devices in the reply skipped because a newer request already wrote them
    pub stale: Vec<DeviceId>,
    pub scene_applied: Option<String>,
    pub mood_changed: Option<String>,
}

/// Clears the in-flight flag when the send finishes, however it finishes
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Sends chat messages and applies what the backend did in response
///
/// Clones share the in-flight flag.
#[derive(Clone)]
pub struct ChatOrchestrator {
    context: Arc<HomeContext>,
    applier: MoodThemeApplier,
    in_flight: Arc<AtomicBool>,
}

impl ChatOrchestrator {
    pub(crate) fn new(context: Arc<HomeContext>, applier: MoodThemeApplier) -> Self {
        Self {
            context,
            applier,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// False while a message is awaiting its reply
    pub fn can_send(&self) -> bool {
        !self.in_flight.load(Ordering::Acquire)
    }

    pub fn send(&self, message: &str) -> Result<ChatTurn, SdkError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(SdkError::EmptyMessage);
        }
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(SdkError::RequestInFlight)?;

        self.context.transcript.push_user(message);

        match self.exchange(message) {
            Ok(turn) => Ok(turn),
            Err(e) => {
                tracing::warn!("Chat message failed: {}", e);
                self.context.transcript.push_genie(e.user_message());
                Err(e)
            }
        }
    }

    fn exchange(&self, message: &str) -> Result<ChatTurn, SdkError> {
        let sequence = self.context.engine.issue_sequence();
        let reply = self.context.client.talk(message)?;
        let changes = reply.device_changes.unwrap_or_default();

        // Nothing is applied unless the whole reply is usable
        DeviceSyncEngine::validate_delta(&changes.devices_updated)?;
        if let Some(mood) = &changes.mood_changed {
            if !self.context.moods.is_available(&mood.mood_name) {
                return Err(SdkError::UnknownMood(mood.mood_name.clone()));
            }
        }

        let mut turn = ChatTurn {
            reply: reply.response,
            scene_applied: changes.scene_applied,
            ..ChatTurn::default()
        };

        if !changes.devices_updated.is_empty() {
            let report = self
                .context
                .engine
                .apply_update_sequenced(sequence, changes.devices_updated)?;
            turn.devices_updated = report.applied;
            turn.devices_updated.sort();
            turn.stale = report.stale;
        }

        if let Some(mood) = changes.mood_changed {
            // Mood devices already arrived in devices_updated
            self.applier
                .apply_sequenced(sequence, &mood.mood_name, mood.theme_vars, None)?;
            turn.mood_changed = Some(mood.mood_name);
        }

        self.context.transcript.push_genie(turn.reply.clone());
        Ok(turn)
    }
}

impl std::fmt::Debug for ChatOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatOrchestrator")
            .field("in_flight", &!self.can_send())
            .finish()
    }
}
