//! Keyword command parser for chat messages
//!
//! Matching is case-insensitive. Device keywords match as substrings, so
//! `light` also covers `lights`, except for short ones that commonly appear
//! inside other words (`ac`, `arm`). Scene keywords always match whole words:
//! "brightness" is not "bright" and "tonight" is not "night".

use genie_api::{DeviceId, DeviceKind, DeviceMap, DeviceUpdate};

use crate::scenes;

/// One device change requested by a chat message
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCommand {
    pub device_id: DeviceId,
    pub update: DeviceUpdate,
    /// Human-readable summary, e.g. "Turned on Kitchen Light"
    pub action: String,
}

const SCENE_KEYWORDS: [(&str, &str); 17] = [
    ("movie", scenes::MOVIE_MODE),
    ("cinema", scenes::MOVIE_MODE),
    ("film", scenes::MOVIE_MODE),
    ("morning", scenes::GOOD_MORNING),
    ("wake up", scenes::GOOD_MORNING),
    ("relax", scenes::RELAX),
    ("chill", scenes::RELAX),
    ("calm", scenes::RELAX),
    ("energetic", scenes::ENERGETIC),
    ("energy", scenes::ENERGETIC),
    ("bright", scenes::ENERGETIC),
    ("focus", scenes::FOCUS),
    ("work", scenes::FOCUS),
    ("concentrate", scenes::FOCUS),
    ("sleep", scenes::SLEEP),
    ("bedtime", scenes::SLEEP),
    ("night", scenes::SLEEP),
];

struct Message {
    text: String,
    words: Vec<String>,
}

impl Message {
    fn new(raw: &str) -> Self {
        let text = raw.to_lowercase();
        let words = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        Self { text, words }
    }

    fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.text.contains(n))
    }

    fn has_word(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    /// Whole words of `phrase` appearing consecutively
    fn has_phrase(&self, phrase: &str) -> bool {
        let wanted: Vec<&str> = phrase.split_whitespace().collect();
        !wanted.is_empty()
            && self
                .words
                .windows(wanted.len())
                .any(|window| window.iter().zip(&wanted).all(|(w, p)| w == p))
    }

    /// First run of digits anywhere in the message
    fn first_number(&self) -> Option<u32> {
        numbers(&self.text).next().map(|(n, _)| n)
    }

    /// A number directly followed by "degree(s)" or "°"
    fn temperature(&self) -> Option<i32> {
        numbers(&self.text).find_map(|(n, rest)| {
            let rest = rest.trim_start();
            (rest.starts_with("degree") || rest.starts_with('°'))
                .then(|| i32::try_from(n).ok())
                .flatten()
        })
    }
}

/// Each digit run parsed as a number, paired with the text after it
fn numbers(text: &str) -> impl Iterator<Item = (u32, &str)> {
    let mut rest = text;
    std::iter::from_fn(move || loop {
        let start = rest.find(|c: char| c.is_ascii_digit())?;
        let tail = &rest[start..];
        let end = tail
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (digits, after) = tail.split_at(end);
        rest = after;
        if let Ok(n) = digits.parse() {
            return Some((n, after));
        }
    })
}

fn for_kind(
    devices: &DeviceMap,
    kind: DeviceKind,
    update: &DeviceUpdate,
    action: impl Fn(&str) -> String,
) -> Vec<DeviceCommand> {
    devices
        .iter()
        .filter(|(_, device)| device.kind() == kind)
        .map(|(device_id, device)| DeviceCommand {
            device_id: device_id.clone(),
            update: update.clone(),
            action: action(device.name()),
        })
        .collect()
}

/// Device changes requested by `message`, in device-id order per kind
pub fn parse_device_commands(message: &str, devices: &DeviceMap) -> Vec<DeviceCommand> {
    let msg = Message::new(message);
    let mut commands = Vec::new();

    if msg.contains_any(&["light", "lamp"]) {
        if msg.contains_any(&["turn on", "switch on"]) {
            commands.extend(for_kind(devices, DeviceKind::Light, &DeviceUpdate::new().on(true), |name| {
                format!("Turned on {}", name)
            }));
        } else if msg.contains_any(&["turn off", "switch off"]) {
            commands.extend(for_kind(devices, DeviceKind::Light, &DeviceUpdate::new().on(false), |name| {
                format!("Turned off {}", name)
            }));
        } else if msg.contains_any(&["dim", "brightness"]) {
            let brightness = msg.first_number().unwrap_or(30);
            commands.extend(for_kind(
                devices,
                DeviceKind::Light,
                &DeviceUpdate::new().on(true).brightness(brightness),
                |name| format!("Set {} brightness to {}%", name, brightness),
            ));
        }
    }

    if msg.contains_any(&["temperature", "air conditioning", "thermostat"]) || msg.has_word("ac") {
        if let Some(temperature) = msg.temperature() {
            commands.extend(for_kind(
                devices,
                DeviceKind::Ac,
                &DeviceUpdate::new().on(true).temperature(temperature),
                |name| format!("Set {} to {}°C", name, temperature),
            ));
        } else if msg.contains("turn on") {
            commands.extend(for_kind(devices, DeviceKind::Ac, &DeviceUpdate::new().on(true), |name| {
                format!("Turned on {}", name)
            }));
        } else if msg.contains("turn off") {
            commands.extend(for_kind(devices, DeviceKind::Ac, &DeviceUpdate::new().on(false), |name| {
                format!("Turned off {}", name)
            }));
        }
    }

    if msg.contains_any(&["music", "song", "play", "pause", "volume"]) {
        if msg.contains("play") {
            commands.extend(for_kind(devices, DeviceKind::Music, &DeviceUpdate::new().playing(true), |name| {
                format!("Started playing music on {}", name)
            }));
        } else if msg.contains_any(&["pause", "stop"]) {
            commands.extend(for_kind(devices, DeviceKind::Music, &DeviceUpdate::new().playing(false), |name| {
                format!("Paused music on {}", name)
            }));
        } else if msg.contains("volume") {
            if let Some(volume) = msg.first_number() {
                commands.extend(for_kind(
                    devices,
                    DeviceKind::Music,
                    &DeviceUpdate::new().volume(volume),
                    |name| format!("Set {} volume to {}%", name, volume),
                ));
            }
        }
    }

    if msg.contains_any(&["door", "lock"]) {
        if msg.contains("lock") && !msg.contains("unlock") {
            commands.extend(for_kind(devices, DeviceKind::Door, &DeviceUpdate::new().locked(true), |name| {
                format!("Locked {}", name)
            }));
        } else if msg.contains("unlock") {
            commands.extend(for_kind(devices, DeviceKind::Door, &DeviceUpdate::new().locked(false), |name| {
                format!("Unlocked {}", name)
            }));
        }
    }

    if msg.contains_any(&["blinds", "curtains", "shades"]) {
        if msg.contains("open") {
            commands.extend(for_kind(
                devices,
                DeviceKind::Blinds,
                &DeviceUpdate::new().open(true).position(100),
                |name| format!("Opened {}", name),
            ));
        } else if msg.contains("close") {
            commands.extend(for_kind(
                devices,
                DeviceKind::Blinds,
                &DeviceUpdate::new().open(false).position(0),
                |name| format!("Closed {}", name),
            ));
        }
    }

    if msg.contains_any(&["security", "alarm"]) || msg.has_word("arm") || msg.has_word("disarm") {
        if msg.has_word("disarm") {
            commands.extend(for_kind(
                devices,
                DeviceKind::Security,
                &DeviceUpdate::new().armed(false).mode("off"),
                |name| format!("Disarmed {}", name),
            ));
        } else if msg.has_word("arm") {
            commands.extend(for_kind(
                devices,
                DeviceKind::Security,
                &DeviceUpdate::new().armed(true).mode("home"),
                |name| format!("Armed {}", name),
            ));
        }
    }

    commands
}

/// The first scene whose keyword appears in `message`
pub fn parse_scene(message: &str) -> Option<&'static str> {
    let msg = Message::new(message);
    SCENE_KEYWORDS
        .iter()
        .find(|(keyword, _)| msg.has_phrase(keyword))
        .map(|(_, scene)| *scene)
}

/// The first mood whose name appears in `message`
pub fn parse_mood<'a>(message: &str, moods: &'a [String]) -> Option<&'a str> {
    let msg = Message::new(message);
    moods
        .iter()
        .find(|mood| msg.contains(&mood.to_lowercase()))
        .map(String::as_str)
}

/// Reply text summarising what was done
pub fn compose_reply(actions: &[String]) -> String {
    if actions.is_empty() {
        return "I'm Genie, your smart home assistant. I can control lights, the AC, music, \
                blinds, door locks and security, or set a scene or mood for you."
            .to_string();
    }
    format!(
        "I've {}. How else can I help you?",
        actions.join(", ").to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::default_devices;

    fn ids(commands: &[DeviceCommand]) -> Vec<&str> {
        commands.iter().map(|c| c.device_id.as_str()).collect()
    }

    #[test]
    fn test_turn_on_all_lights_touches_only_lights() {
        let commands = parse_device_commands("Turn on all lights", &default_devices());
        assert_eq!(
            ids(&commands),
            vec!["light_bedroom", "light_kitchen", "light_living_room"]
        );
        assert!(commands.iter().all(|c| c.update == DeviceUpdate::new().on(true)));
        assert_eq!(commands[1].action, "Turned on Kitchen Light");
        assert_eq!(parse_scene("Turn on all lights"), None);
    }

    #[test]
    fn test_dim_uses_number_or_default() {
        let devices = default_devices();
        let commands = parse_device_commands("dim the lights to 40%", &devices);
        assert!(commands.iter().all(|c| c.update.brightness == Some(40)));

        let commands = parse_device_commands("dim the lamps", &devices);
        assert!(commands.iter().all(|c| c.update.brightness == Some(30)));
    }

    #[test]
    fn test_ac_temperature() {
        let commands = parse_device_commands("Set the AC to 24 degrees", &default_devices());
        assert_eq!(ids(&commands), vec!["ac_main"]);
        assert_eq!(commands[0].update, DeviceUpdate::new().on(true).temperature(24));
        assert_eq!(commands[0].action, "Set Main AC to 24°C");

        let commands = parse_device_commands("thermostat 19°", &default_devices());
        assert_eq!(commands[0].update.temperature, Some(19));
    }

    #[test]
    fn test_ac_needs_whole_word() {
        let commands = parse_device_commands("turn on the backyard lights", &default_devices());
        assert!(commands.iter().all(|c| c.device_id.as_str().starts_with("light_")));
    }

    #[test]
    fn test_music_and_door_and_blinds() {
        let devices = default_devices();

        let commands = parse_device_commands("set the volume to 65", &devices);
        assert_eq!(commands[0].update, DeviceUpdate::new().volume(65));

        let commands = parse_device_commands("pause the music", &devices);
        assert_eq!(commands[0].update, DeviceUpdate::new().playing(false));

        let commands = parse_device_commands("unlock the door", &devices);
        assert_eq!(commands[0].update, DeviceUpdate::new().locked(false));

        let commands = parse_device_commands("open the curtains", &devices);
        assert_eq!(commands[0].update, DeviceUpdate::new().open(true).position(100));
    }

    #[test]
    fn test_security() {
        let devices = default_devices();
        let commands = parse_device_commands("disarm the security system", &devices);
        assert_eq!(commands[0].update, DeviceUpdate::new().armed(false).mode("off"));

        let commands = parse_device_commands("arm the alarm", &devices);
        assert_eq!(commands[0].update, DeviceUpdate::new().armed(true).mode("home"));

        assert!(parse_device_commands("it's warm in here", &devices).is_empty());
    }

    #[test]
    fn test_scene_keywords_in_order() {
        assert_eq!(parse_scene("Let's watch a movie"), Some(scenes::MOVIE_MODE));
        assert_eq!(parse_scene("time for bedtime"), Some(scenes::SLEEP));
        assert_eq!(parse_scene("I need to concentrate"), Some(scenes::FOCUS));
        assert_eq!(parse_scene("hello"), None);
        assert_eq!(parse_scene("time to wake up"), Some(scenes::GOOD_MORNING));
    }

    #[test]
    fn test_scene_keywords_need_whole_words() {
        assert_eq!(parse_scene("set light brightness to 40"), None);
        assert_eq!(parse_scene("what's on tonight"), None);
        assert_eq!(parse_scene("check the network"), None);
        assert_eq!(parse_scene("wake the kids up"), None);
        assert_eq!(parse_scene("Good night!"), Some(scenes::SLEEP));
    }

    #[test]
    fn test_mood_names() {
        let moods = vec!["Relax".to_string(), "Movie Mode".to_string()];
        assert_eq!(parse_mood("switch to movie mode", &moods), Some("Movie Mode"));
        assert_eq!(parse_mood("hello", &moods), None);
    }

    #[test]
    fn test_reply() {
        let reply = compose_reply(&["Turned on Kitchen Light".to_string(), "Applied Sleep scene".to_string()]);
        assert_eq!(
            reply,
            "I've turned on kitchen light, applied sleep scene. How else can I help you?"
        );
        assert!(compose_reply(&[]).starts_with("I'm Genie"));
    }
}
