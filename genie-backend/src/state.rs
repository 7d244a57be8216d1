//! Backend state shared by every route

use genie_api::wire::{DeviceChanges, MoodChange, TalkResponse, STATUS_SUCCESS};
use genie_api::{Device, DeviceId, DeviceMap, DeviceUpdate, Theme};

use crate::automation::{self, ActionLog};
use crate::commands;
use crate::error::BackendError;
use crate::moods::MoodEngine;
use crate::simulator::DeviceSimulator;

/// Device table, mood selection and the user action log
#[derive(Debug, Clone, Default)]
pub struct BackendState {
    pub simulator: DeviceSimulator,
    pub moods: MoodEngine,
    pub actions: ActionLog,
}

impl BackendState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update one device on behalf of `user_id`, recording the action
    pub fn update_device(
        &mut self,
        user_id: &str,
        device_id: &DeviceId,
        update: &DeviceUpdate,
    ) -> Result<Device, BackendError> {
        let device = self.simulator.update(device_id, update)?;
        self.actions
            .record(automation::device_control(user_id, device_id, update));
        Ok(device)
    }

    /// Apply a scene on behalf of `user_id`, recording the action
    pub fn apply_scene(&mut self, user_id: &str, scene_name: &str) -> Result<DeviceMap, BackendError> {
        let devices = self.simulator.apply_scene(scene_name)?;
        self.actions
            .record(automation::scene_application(user_id, scene_name));
        Ok(devices)
    }

    /// Select a mood and apply its scene
    pub fn set_mood(&mut self, mood_name: &str) -> Result<(Theme, DeviceMap), BackendError> {
        let (theme, scene) = self.moods.select(mood_name)?;
        let devices = self.simulator.apply_scene(scene)?;
        tracing::info!("Mood set to {}", mood_name);
        Ok((theme, devices))
    }

    /// Answer a chat message, carrying out whatever it asks for
    ///
    /// Device commands run first, then a scene, then a mood. A device command
    /// the simulator refuses is skipped.
    pub fn talk(&mut self, message: &str) -> Result<TalkResponse, BackendError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(BackendError::EmptyMessage);
        }

        let mut actions = Vec::new();
        let mut changes = DeviceChanges::default();

        for command in commands::parse_device_commands(message, self.simulator.devices()) {
            match self.update_device(automation::CHAT_USER, &command.device_id, &command.update) {
                Ok(state) => {
                    changes.devices_updated.insert(command.device_id, state);
                    actions.push(command.action);
                }
                Err(e) => tracing::warn!("Skipping '{}': {}", command.action, e),
            }
        }

        if let Some(scene) = commands::parse_scene(message) {
            let devices = self.apply_scene(automation::CHAT_USER, scene)?;
            changes.devices_updated.extend(devices);
            changes.scene_applied = Some(scene.to_string());
            actions.push(format!("Applied {} scene", scene));
        }

        let available = MoodEngine::available();
        if let Some(mood_name) = commands::parse_mood(message, &available) {
            let (theme_vars, devices) = self.set_mood(mood_name)?;
            changes.devices_updated.extend(devices);
            changes.mood_changed = Some(MoodChange {
                mood_name: mood_name.to_string(),
                theme_vars,
            });
            actions.push(format!("Changed mood to {}", mood_name));
        }

        tracing::debug!("Talk '{}' -> {} actions", message, actions.len());
        Ok(TalkResponse {
            response: commands::compose_reply(&actions),
            status: Some(STATUS_SUCCESS.to_string()),
            device_changes: Some(changes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genie_api::DeviceKind;

    #[test]
    fn test_turn_on_all_lights() {
        let mut state = BackendState::new();
        let reply = state.talk("Turn on all lights").unwrap();
        let changes = reply.device_changes.unwrap();

        assert_eq!(changes.devices_updated.len(), 3);
        assert!(changes
            .devices_updated
            .values()
            .all(|d| d.kind() == DeviceKind::Light && d.as_toggleable().is_active()));
        assert!(changes.scene_applied.is_none());
        assert!(reply.response.starts_with("I've turned on bedroom light"));
    }

    #[test]
    fn test_brightness_command_is_not_a_scene() {
        let mut state = BackendState::new();
        let reply = state.talk("set light brightness to 40").unwrap();
        let changes = reply.device_changes.unwrap();

        assert!(changes.scene_applied.is_none());
        assert_eq!(changes.devices_updated.len(), 3);
        for device in changes.devices_updated.values() {
            assert!(matches!(device, Device::Light(light) if light.brightness == 40));
        }
    }

    #[test]
    fn test_mood_by_name() {
        let mut state = BackendState::new();
        let reply = state.talk("switch to the Focus mood please").unwrap();
        let changes = reply.device_changes.unwrap();

        assert_eq!(state.moods.current(), "Focus");
        assert_eq!(changes.scene_applied.as_deref(), Some("Focus"));
        assert_eq!(changes.mood_changed.unwrap().mood_name, "Focus");
        assert_eq!(changes.devices_updated.len(), 8);
    }

    #[test]
    fn test_nothing_recognised() {
        let mut state = BackendState::new();
        let before = state.simulator.clone();
        let reply = state.talk("hello there").unwrap();

        assert!(reply.device_changes.unwrap().is_empty());
        assert_eq!(state.simulator, before);
    }

    #[test]
    fn test_talk_records_actions() {
        let mut state = BackendState::new();
        state.talk("Turn on all lights and lock the door").unwrap();
        state.talk("hello there").unwrap();

        let patterns = state.actions.patterns();
        assert_eq!(patterns.len(), 4);
        assert!(patterns
            .iter()
            .all(|p| p.action.user_id == automation::CHAT_USER
                && p.action.action_type == automation::DEVICE_CONTROL));
        assert_eq!(patterns[0].action.device_id, "door_front");
        assert_eq!(patterns[0].action.action_data, serde_json::json!({"locked": true}));
    }

    #[test]
    fn test_refused_update_is_not_recorded() {
        let mut state = BackendState::new();
        let fridge = DeviceId::from("fridge");
        assert!(state
            .update_device(automation::API_USER, &fridge, &DeviceUpdate::new().on(true))
            .is_err());
        assert!(state.apply_scene(automation::API_USER, "Party").is_err());
        assert!(state.actions.is_empty());

        state.apply_scene(automation::API_USER, "Sleep").unwrap();
        let insights = state.actions.insights();
        assert_eq!(
            insights.most_used_devices,
            vec![(automation::SCENE_CONTROLLER.to_string(), 1)]
        );
    }

    #[test]
    fn test_empty_message() {
        let mut state = BackendState::new();
        assert_eq!(state.talk("  ").unwrap_err(), BackendError::EmptyMessage);
    }

    #[test]
    fn test_set_mood_applies_scene() {
        let mut state = BackendState::new();
        let (theme, devices) = state.set_mood("Sleep").unwrap();
        assert_eq!(theme.get("accentColor"), Some("#483D8B"));
        assert!(matches!(
            devices.get(&DeviceId::from("ac_main")),
            Some(Device::Ac(ac)) if ac.temperature == 20
        ));
        assert!(state.set_mood("Party").is_err());
        assert_eq!(state.moods.current(), "Sleep");
    }
}
