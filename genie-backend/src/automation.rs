//! User action log and usage insights
//!
//! Every device update, scene and chat command is recorded with the local
//! time it happened. Patterns are the most recent actions; insights count
//! them by device and by hour of day.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Datelike, FixedOffset, Local, Timelike};
use genie_api::wire::{ActionPattern, Insights, UserAction};
use genie_api::{DeviceId, DeviceUpdate};

/// How many recent actions patterns and insights look at
pub const PATTERN_LIMIT: usize = 100;

/// Insight lists keep this many entries
pub const TOP_ENTRIES: usize = 5;

const LOG_CAPACITY: usize = 1000;

pub const API_USER: &str = "user_via_api";
pub const CHAT_USER: &str = "user_via_chat";

/// Pseudo-device that scene applications are recorded against
pub const SCENE_CONTROLLER: &str = "scene_controller";

pub const DEVICE_CONTROL: &str = "device_control";
pub const SCENE_APPLICATION: &str = "scene_application";

/// A device update made by `user_id`
pub fn device_control(user_id: &str, device_id: &DeviceId, update: &DeviceUpdate) -> UserAction {
    UserAction {
        user_id: user_id.to_string(),
        device_id: device_id.to_string(),
        action_type: DEVICE_CONTROL.to_string(),
        action_data: serde_json::to_value(update).unwrap_or_default(),
    }
}

/// A scene applied by `user_id`
pub fn scene_application(user_id: &str, scene_name: &str) -> UserAction {
    UserAction {
        user_id: user_id.to_string(),
        device_id: SCENE_CONTROLLER.to_string(),
        action_type: SCENE_APPLICATION.to_string(),
        action_data: serde_json::json!({ "scene_name": scene_name }),
    }
}

/// Bounded, in-memory record of user actions
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    entries: VecDeque<ActionPattern>,
    next_id: u64,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action as happening now
    pub fn record(&mut self, action: UserAction) -> &ActionPattern {
        self.record_at(action, Local::now().into())
    }

    pub fn record_at(&mut self, action: UserAction, at: DateTime<FixedOffset>) -> &ActionPattern {
        if self.entries.len() == LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.next_id += 1;
        tracing::debug!(
            "Logged {} on {} by {}",
            action.action_type,
            action.device_id,
            action.user_id
        );
        self.entries.push_back(ActionPattern {
            id: self.next_id,
            action,
            time_of_day: at.hour(),
            day_of_week: at.weekday().num_days_from_monday(),
            timestamp: at.to_rfc3339(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent actions, newest first
    pub fn patterns(&self) -> Vec<ActionPattern> {
        self.entries.iter().rev().take(PATTERN_LIMIT).cloned().collect()
    }

    /// Busiest devices and hours over [`patterns`](Self::patterns)
    pub fn insights(&self) -> Insights {
        let recent = self.entries.iter().rev().take(PATTERN_LIMIT);

        let mut devices: BTreeMap<String, usize> = BTreeMap::new();
        let mut hours: BTreeMap<u32, usize> = BTreeMap::new();
        let mut total = 0;
        for pattern in recent {
            *devices.entry(pattern.action.device_id.clone()).or_default() += 1;
            *hours.entry(pattern.time_of_day).or_default() += 1;
            total += 1;
        }

        Insights {
            total_patterns: total,
            most_used_devices: top(devices),
            most_active_hours: top(hours),
        }
    }
}

/// Highest counts first; ties keep key order
fn top<K: Ord>(counts: BTreeMap<K, usize>) -> Vec<(K, usize)> {
    let mut counts: Vec<(K, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(TOP_ENTRIES);
    counts
}
