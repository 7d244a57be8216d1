//! The playable hardware resource behind a music card

use std::time::Duration;

use thiserror::Error;

use super::catalog::Track;

/// Errors raised by an [`AudioSink`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// The sink refused to start playback (e.g. an autoplay policy)
    #[error("Playback rejected: {0}")]
    PlayRejected(String),

    #[error("Failed to load {track}: {reason}")]
    LoadFailed { track: String, reason: String },

    #[error("No track loaded")]
    NothingLoaded,
}

/// Notifications a sink reports asynchronously
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    /// The loaded track's duration became known
    MetadataLoaded(Duration),
    /// The loaded track played to its end
    Ended,
}

/// One playable audio resource
///
/// Loading never starts playback. Events are queued by the sink and
/// drained by the controller through [`poll_event`](AudioSink::poll_event).
pub trait AudioSink: Send {
    fn load(&mut self, track: &Track) -> Result<(), MediaError>;

    fn play(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self);

    fn seek(&mut self, position: Duration);

    /// Output gain in `0.0..=1.0`
    fn set_gain(&mut self, gain: f32);

    fn position(&self) -> Duration;

    fn poll_event(&mut self) -> Option<MediaEvent>;
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn load(&mut self, track: &Track) -> Result<(), MediaError> {
        (**self).load(track)
    }

    fn play(&mut self) -> Result<(), MediaError> {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn seek(&mut self, position: Duration) {
        (**self).seek(position)
    }

    fn set_gain(&mut self, gain: f32) {
        (**self).set_gain(gain)
    }

    fn position(&self) -> Duration {
        (**self).position()
    }

    fn poll_event(&mut self) -> Option<MediaEvent> {
        (**self).poll_event()
    }
}
