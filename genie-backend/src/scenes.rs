//! Predefined scenes
//!
//! A scene is a partial update for a subset of devices. Devices a scene does
//! not name keep their state.

use genie_api::DeviceUpdate;

pub const MOVIE_MODE: &str = "Movie Mode";
pub const GOOD_MORNING: &str = "Good Morning";
pub const RELAX: &str = "Relax";
pub const ENERGETIC: &str = "Energetic";
pub const FOCUS: &str = "Focus";
pub const SLEEP: &str = "Sleep";

/// Every scene, in display order
pub const SCENE_NAMES: [&str; 6] = [MOVIE_MODE, GOOD_MORNING, RELAX, ENERGETIC, FOCUS, SLEEP];

pub type SceneChanges = Vec<(&'static str, DeviceUpdate)>;

fn light(brightness: u32, color: &str) -> DeviceUpdate {
    DeviceUpdate::new().on(true).brightness(brightness).color(color)
}

fn off() -> DeviceUpdate {
    DeviceUpdate::new().on(false)
}

fn ac(temperature: i32) -> DeviceUpdate {
    DeviceUpdate::new().on(true).temperature(temperature)
}

fn blinds(open: bool) -> DeviceUpdate {
    DeviceUpdate::new().open(open).position(if open { 100 } else { 0 })
}

fn music(track: &str, volume: u32) -> DeviceUpdate {
    DeviceUpdate::new().playing(true).track(track).volume(volume)
}

/// The per-device changes of `name`, or `None` for an unknown scene
pub fn scene(name: &str) -> Option<SceneChanges> {
    let changes = match name {
        MOVIE_MODE => vec![
            ("light_living_room", light(20, "#4B0082")),
            ("light_kitchen", off()),
            ("light_bedroom", off()),
            ("blinds_living_room", blinds(false)),
            ("music_player", DeviceUpdate::new().playing(false)),
            ("ac_main", ac(21)),
        ],
        GOOD_MORNING => vec![
            ("light_living_room", light(90, "#FFFDD0")),
            ("light_kitchen", light(85, "#FFFFFF")),
            ("light_bedroom", light(70, "#FFF8DC")),
            ("blinds_living_room", blinds(true)),
            ("music_player", music("Morning Relax Mix", 40)),
            ("ac_main", ac(22)),
            ("security_system", DeviceUpdate::new().armed(false).mode("off")),
        ],
        RELAX => vec![
            ("light_living_room", light(40, "#FF6B6B")),
            ("light_kitchen", off()),
            ("light_bedroom", light(30, "#FFB6C1")),
            ("music_player", music("Ambient Sounds", 35)),
            ("ac_main", ac(23)),
        ],
        ENERGETIC => vec![
            ("light_living_room", light(100, "#00FF7F")),
            ("light_kitchen", light(100, "#FFFFFF")),
            ("light_bedroom", light(90, "#87CEEB")),
            ("blinds_living_room", blinds(true)),
            ("music_player", music("Upbeat Workout Mix", 70)),
            ("ac_main", ac(20)),
        ],
        FOCUS => vec![
            ("light_living_room", light(80, "#F0F8FF")),
            ("light_kitchen", light(75, "#FFFFFF")),
            ("music_player", music("Focus & Concentration", 25)),
            ("ac_main", ac(21)),
        ],
        SLEEP => vec![
            ("light_living_room", off()),
            ("light_kitchen", off()),
            ("light_bedroom", light(10, "#191970")),
            ("blinds_living_room", blinds(false)),
            ("music_player", music("Sleep Sounds", 20)),
            ("ac_main", ac(20)),
            ("door_front", DeviceUpdate::new().locked(true)),
            ("security_system", DeviceUpdate::new().armed(true).mode("night")),
        ],
        _ => return None,
    };
    Some(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use genie_api::Validate;

    #[test]
    fn test_every_listed_scene_is_defined_and_valid() {
        for name in SCENE_NAMES {
            let changes = scene(name).unwrap();
            assert!(!changes.is_empty(), "{} is empty", name);
            for (device_id, update) in changes {
                assert!(update.validate().is_ok(), "{} in {}", device_id, name);
            }
        }
    }

    #[test]
    fn test_unknown_scene() {
        assert!(scene("Party").is_none());
        assert!(scene("sleep").is_none());
    }
}
