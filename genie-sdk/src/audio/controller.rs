//! Per-card playback state machine
//!
//! The controller is fed music devices from the sync engine and drives one
//! [`AudioSink`] to match them. It only reacts to a new `Arc<Device>`: the
//! engine hands out a fresh allocation for every applied change, so pointer
//! identity is the change signal.
//!
//! ```text
//!            desired=true                     play()
//!   Idle ------------------> LoadedPaused -------------> LoadedPlaying
//!    ^       (random track)       ^       desired=false        |
//!    |                            +-------(pause, rewind)------+
//!    |                                                          |
//!    +-------------------------- track ended -------------------+
//!         (new random track; plays again if still desired)
//! ```

use std::sync::Arc;
use std::time::Duration;

use genie_api::{Device, DeviceId, VolumeControllable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::catalog::{Track, TrackCatalog};
use super::sink::{AudioSink, MediaError, MediaEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No track loaded
    Idle,
    LoadedPaused,
    LoadedPlaying,
}

/// Result of feeding the controller a device or its pending sink events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Unchanged,
    Started,
    /// Paused and rewound to the start
    Stopped,
    /// The previous track ended and a new one was loaded
    Advanced { playing: bool },
    /// The sink refused to play; desired-playing was rolled back to false
    Rejected(MediaError),
}

impl PlaybackOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, PlaybackOutcome::Rejected(_))
    }
}

/// Playback position for a progress bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub position: Duration,
    /// Zero until the sink reports metadata
    pub duration: Duration,
}

impl Progress {
    /// `position / duration` in `0.0..=1.0`, zero while the duration is unknown
    pub fn ratio(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.position.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}

/// Drives one audio sink from one music device
pub struct AudioPlaybackController<R: Rng = StdRng> {
    device_id: DeviceId,
    sink: Box<dyn AudioSink>,
    catalog: TrackCatalog,
    rng: R,
    state: PlaybackState,
    desired_playing: bool,
    track: Option<Track>,
    duration: Duration,
    last_device: Option<Arc<Device>>,
}

impl AudioPlaybackController<StdRng> {
    pub fn new(device_id: DeviceId, sink: Box<dyn AudioSink>, catalog: TrackCatalog) -> Self {
        Self::with_rng(device_id, sink, catalog, StdRng::from_entropy())
    }
}

impl<R: Rng> AudioPlaybackController<R> {
    pub fn with_rng(
        device_id: DeviceId,
        sink: Box<dyn AudioSink>,
        catalog: TrackCatalog,
        rng: R,
    ) -> Self {
        Self {
            device_id,
            sink,
            catalog,
            rng,
            state: PlaybackState::Idle,
            desired_playing: false,
            track: None,
            duration: Duration::ZERO,
            last_device: None,
        }
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn desired_playing(&self) -> bool {
        self.desired_playing
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            position: self.sink.position(),
            duration: self.duration,
        }
    }

    /// Reconcile the sink with the latest device value
    pub fn sync(&mut self, device: &Arc<Device>) -> PlaybackOutcome {
        if let Some(last) = &self.last_device {
            if Arc::ptr_eq(last, device) {
                return PlaybackOutcome::Unchanged;
            }
        }
        self.last_device = Some(Arc::clone(device));

        let Some(music) = device.as_music() else {
            tracing::warn!("Device {} is not a music device", self.device_id);
            return PlaybackOutcome::Unchanged;
        };

        self.sink.set_gain(music.gain());
        self.desired_playing = music.playing;

        match (self.desired_playing, self.state) {
            (true, PlaybackState::Idle) => {
                if let Err(e) = self.load_random() {
                    return self.reject(e);
                }
                self.start()
            }
            (true, PlaybackState::LoadedPaused) => self.start(),
            (false, PlaybackState::LoadedPlaying) => {
                self.sink.pause();
                self.sink.seek(Duration::ZERO);
                self.state = PlaybackState::LoadedPaused;
                tracing::debug!("Stopped playback on {}", self.device_id);
                PlaybackOutcome::Stopped
            }
            _ => PlaybackOutcome::Unchanged,
        }
    }

    /// Drain pending sink events
    ///
    /// A rejection takes precedence over any other outcome in the batch.
    pub fn handle_events(&mut self) -> PlaybackOutcome {
        let mut outcome = PlaybackOutcome::Unchanged;
        while let Some(event) = self.sink.poll_event() {
            let next = match event {
                MediaEvent::MetadataLoaded(duration) => {
                    self.duration = duration;
                    PlaybackOutcome::Unchanged
                }
                MediaEvent::Ended => self.advance(),
            };
            if !outcome.is_rejected() && next != PlaybackOutcome::Unchanged {
                outcome = next;
            }
        }
        outcome
    }

    /// Pause the sink, e.g. when the owning card goes away
    pub fn shutdown(&mut self) {
        self.sink.pause();
        if self.state == PlaybackState::LoadedPlaying {
            self.state = PlaybackState::LoadedPaused;
        }
    }

    fn advance(&mut self) -> PlaybackOutcome {
        tracing::debug!("Track ended on {}", self.device_id);
        self.state = PlaybackState::Idle;
        self.track = None;
        if let Err(e) = self.load_random() {
            return self.reject(e);
        }
        if self.desired_playing {
            match self.start() {
                PlaybackOutcome::Started => PlaybackOutcome::Advanced { playing: true },
                other => other,
            }
        } else {
            self.sink.seek(Duration::ZERO);
            PlaybackOutcome::Advanced { playing: false }
        }
    }

    fn load_random(&mut self) -> Result<(), MediaError> {
        let track = self.catalog.pick(&mut self.rng).clone();
        self.duration = Duration::ZERO;
        self.sink.load(&track)?;
        tracing::debug!("Loaded {} on {}", track.title, self.device_id);
        self.track = Some(track);
        self.state = PlaybackState::LoadedPaused;
        Ok(())
    }

    fn start(&mut self) -> PlaybackOutcome {
        match self.sink.play() {
            Ok(()) => {
                self.state = PlaybackState::LoadedPlaying;
                PlaybackOutcome::Started
            }
            Err(e) => self.reject(e),
        }
    }

    fn reject(&mut self, error: MediaError) -> PlaybackOutcome {
        tracing::warn!("Playback on {} failed: {}", self.device_id, error);
        self.desired_playing = false;
        PlaybackOutcome::Rejected(error)
    }
}

impl<R: Rng> std::fmt::Debug for AudioPlaybackController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioPlaybackController")
            .field("device_id", &self.device_id)
            .field("state", &self.state)
            .field("desired_playing", &self.desired_playing)
            .field("track", &self.track)
            .field("duration", &self.duration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SimulatedSink;
    use genie_api::Music;
    use rstest::rstest;

    const TRACK_LEN: Duration = Duration::from_secs(10);

    fn music(playing: bool, volume: u32) -> Arc<Device> {
        Arc::new(Device::Music(Music {
            name: "Music Player".to_string(),
            playing,
            track: "Chill Vibes".to_string(),
            volume,
            playlist: None,
        }))
    }

    fn controller(seed: u64) -> (AudioPlaybackController<StdRng>, SimulatedSink) {
        let sink = SimulatedSink::new();
        let catalog = TrackCatalog::bundled();
        for track in catalog.tracks() {
            sink.set_duration(&track.filename, TRACK_LEN);
        }
        let controller = AudioPlaybackController::with_rng(
            DeviceId::from("music_player"),
            Box::new(sink.clone()),
            catalog,
            StdRng::seed_from_u64(seed),
        );
        (controller, sink)
    }

    #[test]
    fn test_play_from_idle_loads_and_plays() {
        let (mut ctl, sink) = controller(1);
        assert_eq!(ctl.state(), PlaybackState::Idle);

        assert_eq!(ctl.sync(&music(true, 50)), PlaybackOutcome::Started);
        assert_eq!(ctl.state(), PlaybackState::LoadedPlaying);
        assert!(sink.is_playing());
        assert!(ctl.track().is_some());
        assert_eq!(sink.loaded().as_ref(), ctl.track());
    }

    #[test]
    fn test_same_arc_is_ignored() {
        let (mut ctl, sink) = controller(2);
        let device = music(true, 50);
        ctl.sync(&device);
        assert_eq!(ctl.sync(&device), PlaybackOutcome::Unchanged);
        assert_eq!(sink.load_count(), 1);
    }

    #[test]
    fn test_stop_rewinds() {
        let (mut ctl, sink) = controller(3);
        ctl.sync(&music(true, 50));
        sink.advance(Duration::from_secs(4));

        assert_eq!(ctl.sync(&music(false, 50)), PlaybackOutcome::Stopped);
        assert_eq!(ctl.state(), PlaybackState::LoadedPaused);
        assert_eq!(sink.current_position(), Duration::ZERO);
        assert!(!sink.is_playing());

        // Resume starts the same track from the top
        let track = ctl.track().cloned();
        assert_eq!(ctl.sync(&music(true, 50)), PlaybackOutcome::Started);
        assert_eq!(ctl.track().cloned(), track);
        assert_eq!(sink.load_count(), 1);
    }

    #[rstest]
    #[case(0, 0.0)]
    #[case(35, 0.35)]
    #[case(100, 1.0)]
    fn test_gain_follows_volume_in_any_state(#[case] volume: u32, #[case] gain: f32) {
        let (mut ctl, sink) = controller(4);
        ctl.sync(&music(false, volume));
        assert!((sink.gain() - gain).abs() < 1e-6);
        assert_eq!(ctl.state(), PlaybackState::Idle);

        ctl.sync(&music(true, volume));
        assert!((sink.gain() - gain).abs() < 1e-6);
    }

    #[test]
    fn test_track_end_while_desired_keeps_playing() {
        for seed in 0..20 {
            let (mut ctl, sink) = controller(seed);
            ctl.sync(&music(true, 60));
            ctl.handle_events();

            sink.advance(TRACK_LEN);
            assert_eq!(ctl.handle_events(), PlaybackOutcome::Advanced { playing: true });
            assert_eq!(ctl.state(), PlaybackState::LoadedPlaying);
            assert!(sink.is_playing());
            assert_eq!(sink.load_count(), 2);
        }
    }

    #[test]
    fn test_track_end_while_not_desired_stays_paused_at_start() {
        let (mut ctl, sink) = controller(5);
        ctl.sync(&music(true, 60));
        ctl.desired_playing = false;

        sink.advance(TRACK_LEN);
        assert_eq!(ctl.handle_events(), PlaybackOutcome::Advanced { playing: false });
        assert_eq!(ctl.state(), PlaybackState::LoadedPaused);
        assert_eq!(sink.current_position(), Duration::ZERO);
        assert!(!sink.is_playing());
    }

    #[test]
    fn test_rejection_rolls_back_desired() {
        let (mut ctl, sink) = controller(6);
        sink.reject_play(true);

        let outcome = ctl.sync(&music(true, 50));
        assert!(outcome.is_rejected());
        assert!(!ctl.desired_playing());
        assert_eq!(ctl.state(), PlaybackState::LoadedPaused);
        assert!(!sink.is_playing());
    }

    #[test]
    fn test_progress_ratio() {
        let (mut ctl, sink) = controller(7);
        assert_eq!(ctl.progress().ratio(), 0.0);

        ctl.sync(&music(true, 50));
        assert_eq!(ctl.progress().ratio(), 0.0);
        ctl.handle_events();
        assert_eq!(ctl.progress().duration, TRACK_LEN);

        sink.advance(Duration::from_secs(5));
        assert!((ctl.progress().ratio() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_shutdown_pauses() {
        let (mut ctl, sink) = controller(8);
        ctl.sync(&music(true, 50));
        ctl.shutdown();
        assert!(!sink.is_playing());
        assert_eq!(ctl.state(), PlaybackState::LoadedPaused);
    }
}
