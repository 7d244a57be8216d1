//! Available moods and the current selection

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Result, StateError};

#[derive(Debug, Default)]
struct Moods {
    available: Vec<String>,
    current: Option<String>,
}

/// The backend's mood list plus the one currently selected
///
/// The current mood is always one of the available moods: selecting anything
/// else fails, and replacing the list drops a selection that is no longer in it.
#[derive(Debug, Clone, Default)]
pub struct MoodState {
    inner: Arc<RwLock<Moods>>,
}

impl MoodState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the available list and selection in one step
    pub fn reset(&self, available: Vec<String>, current: &str) -> Result<()> {
        if !available.iter().any(|m| m == current) {
            return Err(StateError::UnknownMood(current.to_string()));
        }
        let mut moods = self.inner.write();
        moods.available = available;
        moods.current = Some(current.to_string());
        Ok(())
    }

    /// Replace the available list, keeping the selection only if still offered
    pub fn set_available(&self, available: Vec<String>) {
        let mut moods = self.inner.write();
        if let Some(current) = &moods.current {
            if !available.contains(current) {
                tracing::warn!("Current mood {} is no longer available", current);
                moods.current = None;
            }
        }
        moods.available = available;
    }

    pub fn select(&self, name: &str) -> Result<()> {
        let mut moods = self.inner.write();
        if !moods.available.iter().any(|m| m == name) {
            return Err(StateError::UnknownMood(name.to_string()));
        }
        moods.current = Some(name.to_string());
        Ok(())
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.inner.read().available.iter().any(|m| m == name)
    }

    pub fn available(&self) -> Vec<String> {
        self.inner.read().available.clone()
    }

    pub fn current(&self) -> Option<String> {
        self.inner.read().current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moods() -> Vec<String> {
        ["Relax", "Energetic", "Sleep"]
            .iter()
            .map(|m| m.to_string())
            .collect()
    }

    #[test]
    fn test_select_known_mood() {
        let state = MoodState::new();
        state.reset(moods(), "Relax").unwrap();
        state.select("Sleep").unwrap();
        assert_eq!(state.current().as_deref(), Some("Sleep"));
    }

    #[test]
    fn test_select_unknown_mood_keeps_current() {
        let state = MoodState::new();
        state.reset(moods(), "Relax").unwrap();

        let err = state.select("Party").unwrap_err();
        assert!(matches!(err, StateError::UnknownMood(ref name) if name == "Party"));
        assert_eq!(state.current().as_deref(), Some("Relax"));
    }

    #[test]
    fn test_reset_rejects_current_outside_list() {
        let state = MoodState::new();
        assert!(state.reset(moods(), "Focus").is_err());
        assert!(state.available().is_empty());
        assert_eq!(state.current(), None);
    }

    #[test]
    fn test_set_available_drops_missing_selection() {
        let state = MoodState::new();
        state.reset(moods(), "Sleep").unwrap();
        state.set_available(vec!["Relax".to_string()]);
        assert_eq!(state.current(), None);
        assert!(state.is_available("Relax"));
    }
}
