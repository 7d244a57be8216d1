//! In-memory audio sink driven by a manual clock

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::catalog::Track;
use super::sink::{AudioSink, MediaError, MediaEvent};

/// Duration given to tracks without an explicit one
pub const DEFAULT_TRACK_DURATION: Duration = Duration::from_secs(180);

#[derive(Debug)]
struct SimState {
    loaded: Option<Track>,
    playing: bool,
    position: Duration,
    duration: Duration,
    gain: f32,
    reject_play: bool,
    durations: HashMap<String, Duration>,
    events: VecDeque<MediaEvent>,
    loads: usize,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            loaded: None,
            playing: false,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            gain: 1.0,
            reject_play: false,
            durations: HashMap::new(),
            events: VecDeque::new(),
            loads: 0,
        }
    }
}

/// A sink with no audio output
///
/// Time only moves when [`advance`](SimulatedSink::advance) is called.
/// Clones share one state, so a test can keep a clone for inspection while
/// the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSink {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `play` call fail, as an autoplay policy would
    pub fn reject_play(&self, reject: bool) {
        self.state.lock().reject_play = reject;
    }

    /// Give `filename` a specific duration
    pub fn set_duration(&self, filename: &str, duration: Duration) {
        self.state
            .lock()
            .durations
            .insert(filename.to_string(), duration);
    }

    /// Move the clock forward; a playing track may reach its end
    pub fn advance(&self, elapsed: Duration) {
        let mut state = self.state.lock();
        if !state.playing {
            return;
        }
        state.position += elapsed;
        if state.position >= state.duration {
            state.position = state.duration;
            state.playing = false;
            state.events.push_back(MediaEvent::Ended);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn loaded(&self) -> Option<Track> {
        self.state.lock().loaded.clone()
    }

    pub fn gain(&self) -> f32 {
        self.state.lock().gain
    }

    pub fn current_position(&self) -> Duration {
        self.state.lock().position
    }

    /// Number of `load` calls so far
    pub fn load_count(&self) -> usize {
        self.state.lock().loads
    }
}

impl AudioSink for SimulatedSink {
    fn load(&mut self, track: &Track) -> Result<(), MediaError> {
        let mut state = self.state.lock();
        let duration = state
            .durations
            .get(&track.filename)
            .copied()
            .unwrap_or(DEFAULT_TRACK_DURATION);
        state.loaded = Some(track.clone());
        state.playing = false;
        state.position = Duration::ZERO;
        state.duration = duration;
        state.loads += 1;
        state.events.push_back(MediaEvent::MetadataLoaded(duration));
        Ok(())
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let mut state = self.state.lock();
        if state.loaded.is_none() {
            return Err(MediaError::NothingLoaded);
        }
        if state.reject_play {
            return Err(MediaError::PlayRejected(
                "play() is not allowed without a user gesture".to_string(),
            ));
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.lock().playing = false;
    }

    fn seek(&mut self, position: Duration) {
        let mut state = self.state.lock();
        state.position = position.min(state.duration);
    }

    fn set_gain(&mut self, gain: f32) {
        self.state.lock().gain = gain.clamp(0.0, 1.0);
    }

    fn position(&self) -> Duration {
        self.state.lock().position
    }

    fn poll_event(&mut self) -> Option<MediaEvent> {
        self.state.lock().events.pop_front()
    }
}
