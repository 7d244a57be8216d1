//! Mood definitions and the current selection
//!
//! Every mood pairs a scene with a seven-variable theme.

use genie_api::Theme;

use crate::error::BackendError;
use crate::scenes;

/// Mood selected at startup
pub const DEFAULT_MOOD: &str = "Relax";

struct MoodSetting {
    name: &'static str,
    scene: &'static str,
    theme: [(&'static str, &'static str); 7],
}

static MOODS: [MoodSetting; 6] = [
    MoodSetting {
        name: "Relax",
        scene: scenes::RELAX,
        theme: [
            ("bgGradientStart", "#0D1B2A"),
            ("bgGradientEnd", "#003F5C"),
            ("accentColor", "#00E5FF"),
            ("accentColorRGB", "0, 229, 255"),
            ("textColorPrimary", "#F8F8FF"),
            ("cardBgColor", "rgba(23, 37, 59, 0.5)"),
            ("glowColor", "#00E5FF"),
        ],
    },
    MoodSetting {
        name: "Energetic",
        scene: scenes::ENERGETIC,
        theme: [
            ("bgGradientStart", "#FF6B35"),
            ("bgGradientEnd", "#F7931E"),
            ("accentColor", "#00FF7F"),
            ("accentColorRGB", "0, 255, 127"),
            ("textColorPrimary", "#FFFFFF"),
            ("cardBgColor", "rgba(255, 107, 53, 0.2)"),
            ("glowColor", "#00FF7F"),
        ],
    },
    MoodSetting {
        name: "Movie Mode",
        scene: scenes::MOVIE_MODE,
        theme: [
            ("bgGradientStart", "#0F0F23"),
            ("bgGradientEnd", "#000000"),
            ("accentColor", "#4B0082"),
            ("accentColorRGB", "75, 0, 130"),
            ("textColorPrimary", "#C0C0C0"),
            ("cardBgColor", "rgba(15, 15, 35, 0.8)"),
            ("glowColor", "#4B0082"),
        ],
    },
    MoodSetting {
        name: "Good Morning",
        scene: scenes::GOOD_MORNING,
        theme: [
            ("bgGradientStart", "#FFE4B5"),
            ("bgGradientEnd", "#FFEFD5"),
            ("accentColor", "#FF8C00"),
            ("accentColorRGB", "255, 140, 0"),
            ("textColorPrimary", "#2F4F4F"),
            ("cardBgColor", "rgba(255, 228, 181, 0.4)"),
            ("glowColor", "#FF8C00"),
        ],
    },
    MoodSetting {
        name: "Focus",
        scene: scenes::FOCUS,
        theme: [
            ("bgGradientStart", "#E6F3FF"),
            ("bgGradientEnd", "#B3D9FF"),
            ("accentColor", "#0066CC"),
            ("accentColorRGB", "0, 102, 204"),
            ("textColorPrimary", "#1A1A1A"),
            ("cardBgColor", "rgba(230, 243, 255, 0.6)"),
            ("glowColor", "#0066CC"),
        ],
    },
    MoodSetting {
        name: "Sleep",
        scene: scenes::SLEEP,
        theme: [
            ("bgGradientStart", "#191970"),
            ("bgGradientEnd", "#000080"),
            ("accentColor", "#483D8B"),
            ("accentColorRGB", "72, 61, 139"),
            ("textColorPrimary", "#E6E6FA"),
            ("cardBgColor", "rgba(25, 25, 112, 0.4)"),
            ("glowColor", "#483D8B"),
        ],
    },
];

fn setting(name: &str) -> Option<&'static MoodSetting> {
    MOODS.iter().find(|m| m.name == name)
}

/// Tracks the current mood
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodEngine {
    current: String,
}

impl Default for MoodEngine {
    fn default() -> Self {
        Self {
            current: DEFAULT_MOOD.to_string(),
        }
    }
}

impl MoodEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn available() -> Vec<String> {
        MOODS.iter().map(|m| m.name.to_string()).collect()
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Theme of `name` without selecting it
    pub fn preview(name: &str) -> Result<Theme, BackendError> {
        setting(name)
            .map(|m| Theme::from_pairs(m.theme))
            .ok_or_else(|| BackendError::MoodNotFound(name.to_string()))
    }

    /// Select `name`; returns its theme and the scene to apply
    pub fn select(&mut self, name: &str) -> Result<(Theme, &'static str), BackendError> {
        let mood = setting(name).ok_or_else(|| BackendError::UnknownMood {
            name: name.to_string(),
            available: Self::available().join(", "),
        })?;
        self.current = mood.name.to_string();
        Ok((Theme::from_pairs(mood.theme), mood.scene))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_and_order() {
        let engine = MoodEngine::new();
        assert_eq!(engine.current(), "Relax");
        assert_eq!(
            MoodEngine::available(),
            vec!["Relax", "Energetic", "Movie Mode", "Good Morning", "Focus", "Sleep"]
        );
    }

    #[test]
    fn test_every_mood_has_scene_and_full_theme() {
        for name in MoodEngine::available() {
            let theme = MoodEngine::preview(&name).unwrap();
            assert_eq!(theme.len(), 7);
            assert!(theme.get("accentColor").is_some());
            assert!(scenes::scene(setting(&name).unwrap().scene).is_some());
        }
    }

    #[test]
    fn test_select() {
        let mut engine = MoodEngine::new();
        let (theme, scene) = engine.select("Sleep").unwrap();
        assert_eq!(engine.current(), "Sleep");
        assert_eq!(theme.get("accentColor"), Some("#483D8B"));
        assert_eq!(scene, scenes::SLEEP);
    }

    #[test]
    fn test_unknown_mood() {
        let mut engine = MoodEngine::new();
        let err = engine.select("Party").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown mood 'Party'. Available moods: Relax, Energetic, Movie Mode, Good Morning, Focus, Sleep"
        );
        assert_eq!(engine.current(), "Relax");
        assert!(matches!(
            MoodEngine::preview("Party"),
            Err(BackendError::MoodNotFound(_))
        ));
    }
}
