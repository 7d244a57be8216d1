//! Fixed catalog of local tracks

use rand::Rng;

use crate::SdkError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub filename: String,
    pub title: String,
}

impl Track {
    pub fn new(filename: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            title: title.into(),
        }
    }
}

/// The tracks a music card chooses from
///
/// Never empty. Selection is uniform and may repeat the previous pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackCatalog {
    tracks: Vec<Track>,
}

impl TrackCatalog {
    pub fn new(tracks: Vec<Track>) -> Result<Self, SdkError> {
        if tracks.is_empty() {
            return Err(SdkError::Config("track catalog cannot be empty".to_string()));
        }
        Ok(Self { tracks })
    }

    /// The tracks bundled with the dashboard
    pub fn bundled() -> Self {
        Self {
            tracks: vec![
                Track::new("ambient-sounds.mp3", "Ambient Sounds"),
                Track::new("chill-vibes.mp3", "Chill Vibes"),
                Track::new("focus-flow.mp3", "Focus & Concentration"),
                Track::new("morning-relax-mix.mp3", "Morning Relax Mix"),
                Track::new("sleep-sounds.mp3", "Sleep Sounds"),
                Track::new("upbeat-workout-mix.mp3", "Upbeat Workout Mix"),
            ],
        }
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &Track {
        &self.tracks[rng.gen_range(0..self.tracks.len())]
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl Default for TrackCatalog {
    fn default() -> Self {
        Self::bundled()
    }
}
