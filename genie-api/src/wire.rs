//! Request and response bodies of the backend HTTP interface
//!
//! Both the client and the simulated backend use these types. Every response
//! from the backend also carries `"status": "success"`, which is kept as an
//! optional field so older replies without it still decode.

use serde::{Deserialize, Serialize};

use crate::model::{DeviceId, DeviceMap, DeviceUpdate, Theme};
use crate::validation::{Validate, ValidationError};

/// Value of the `status` field on successful replies
pub const STATUS_SUCCESS: &str = "success";

fn success() -> Option<String> {
    Some(STATUS_SUCCESS.to_string())
}

// ============================================================================
// Devices
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevicesResponse {
    pub devices: DeviceMap,
    #[serde(default = "success", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRequest {
    pub device_id: DeviceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceUpdateRequest {
    pub device_id: DeviceId,
    pub updates: DeviceUpdate,
}

impl Validate for DeviceUpdateRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        self.updates.validate()
    }
}

/// Reply to both `GET /device/{id}` and `POST /device/update`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStateResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<DeviceId>,
    pub state: crate::model::Device,
    #[serde(default = "success", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ============================================================================
// Scenes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRequest {
    pub scene_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_name: Option<String>,
    pub devices: DeviceMap,
    #[serde(default = "success", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenesResponse {
    pub scenes: Vec<String>,
    #[serde(default = "success", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ============================================================================
// Moods
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodsResponse {
    pub moods: Vec<String>,
    pub current_mood: String,
    #[serde(default = "success", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentMoodResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_mood: Option<String>,
    pub theme_vars: Theme,
    #[serde(default = "success", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodRequest {
    pub mood_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSetResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_name: Option<String>,
    pub theme_vars: Theme,
    pub device_states: DeviceMap,
    #[serde(default = "success", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodPreviewResponse {
    pub mood_name: String,
    pub theme_vars: Theme,
    #[serde(default = "success", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalkRequest {
    pub message: String,
}

impl Validate for TalkRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.message.trim().is_empty() {
            return Err(ValidationError::invalid_value(
                "message",
                &self.message,
                "message cannot be empty",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodChange {
    pub mood_name: String,
    pub theme_vars: Theme,
}

/// Side effects the backend carried out while answering a chat message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceChanges {
    #[serde(default)]
    pub devices_updated: DeviceMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_applied: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_changed: Option<MoodChange>,
}

impl DeviceChanges {
    pub fn is_empty(&self) -> bool {
        self.devices_updated.is_empty()
            && self.scene_applied.is_none()
            && self.mood_changed.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalkResponse {
    pub response: String,
    #[serde(default = "success", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_changes: Option<DeviceChanges>,
}

// ============================================================================
// Automation
// ============================================================================

/// A user action, recorded by the backend so usage patterns can be derived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAction {
    pub user_id: String,
    /// A device id, or a pseudo-device such as `scene_controller`
    pub device_id: String,
    pub action_type: String,
    #[serde(default)]
    pub action_data: serde_json::Value,
}

impl Validate for UserAction {
    fn validate(&self) -> Result<(), ValidationError> {
        for (parameter, value) in [
            ("user_id", &self.user_id),
            ("device_id", &self.device_id),
            ("action_type", &self.action_type),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::invalid_value(
                    parameter,
                    value,
                    "cannot be empty",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLoggedResponse {
    pub message: String,
    #[serde(default = "success", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A recorded action with the local time it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPattern {
    pub id: u64,
    #[serde(flatten)]
    pub action: UserAction,
    /// Hour of day, 0-23
    pub time_of_day: u32,
    /// Monday is 0
    pub day_of_week: u32,
    /// RFC 3339
    pub timestamp: String,
}

/// Most recent actions first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternsResponse {
    pub patterns: Vec<ActionPattern>,
    pub total_patterns: usize,
    #[serde(default = "success", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Usage summary over the recent actions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub total_patterns: usize,
    /// `(device_id, count)`, busiest first, at most five
    pub most_used_devices: Vec<(String, usize)>,
    /// `(hour, count)`, busiest first, at most five
    pub most_active_hours: Vec<(u32, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub insights: Insights,
    #[serde(default = "success", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

/// Body of every non-2xx reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Device;

    #[test]
    fn test_insights_decode_pairs_as_arrays() {
        let json = r#"{
            "status": "success",
            "insights": {
                "total_patterns": 3,
                "most_used_devices": [["light_kitchen", 2], ["scene_controller", 1]],
                "most_active_hours": [[21, 3]]
            }
        }"#;
        let reply: InsightsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(reply.insights.total_patterns, 3);
        assert_eq!(reply.insights.most_used_devices[0], ("light_kitchen".to_string(), 2));
        assert_eq!(reply.insights.most_active_hours, vec![(21, 3)]);
    }

    #[test]
    fn test_pattern_flattens_action() {
        let json = r#"{"id": 7, "user_id": "user_via_api", "device_id": "ac_main",
            "action_type": "device_control", "action_data": {"temperature": 22},
            "time_of_day": 8, "day_of_week": 0, "timestamp": "2026-10-19T08:00:00+00:00"}"#;
        let pattern: ActionPattern = serde_json::from_str(json).unwrap();
        assert_eq!(pattern.action.device_id, "ac_main");
        assert_eq!(pattern.action.action_data["temperature"], 22);
        assert_eq!(pattern.time_of_day, 8);
    }

    #[test]
    fn test_user_action_requires_ids() {
        let action = UserAction {
            user_id: "user_via_api".to_string(),
            device_id: " ".to_string(),
            action_type: "device_control".to_string(),
            action_data: serde_json::Value::Null,
        };
        assert!(action.validate().is_err());
    }

    #[test]
    fn test_talk_response_with_changes() {
        let json = r##"{
            "response": "Turned on 3 lights.",
            "status": "success",
            "device_changes": {
                "devices_updated": {
                    "light_kitchen": {"type": "light", "name": "Kitchen Light",
                                      "on": true, "brightness": 80, "color": "#FFFFFF"}
                },
                "scene_applied": null,
                "mood_changed": null
            }
        }"##;
        let reply: TalkResponse = serde_json::from_str(json).unwrap();
        let changes = reply.device_changes.unwrap();
        assert_eq!(changes.devices_updated.len(), 1);
        assert!(changes.scene_applied.is_none());
        assert!(matches!(
            changes.devices_updated.get(&DeviceId::new("light_kitchen")),
            Some(Device::Light(_))
        ));
    }

    #[test]
    fn test_talk_response_without_changes() {
        let reply: TalkResponse =
            serde_json::from_str(r#"{"response": "Hello!", "status": "success"}"#).unwrap();
        assert!(reply.device_changes.is_none());
    }

    #[test]
    fn test_missing_status_defaults_to_success() {
        let reply: ScenesResponse = serde_json::from_str(r#"{"scenes": ["Sleep"]}"#).unwrap();
        assert_eq!(reply.status.as_deref(), Some(STATUS_SUCCESS));
    }

    #[test]
    fn test_empty_message_invalid() {
        let request = TalkRequest {
            message: "   ".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
