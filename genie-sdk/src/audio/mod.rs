//! Local audio playback for music devices
//!
//! - [`AudioSink`]: the playable resource (a [`SimulatedSink`] is provided)
//! - [`TrackCatalog`]: the fixed set of tracks to choose from
//! - [`AudioPlaybackController`]: the per-card state machine
//! - [`MusicCard`]: a controller bound to a device in the table

pub mod card;
pub mod catalog;
pub mod controller;
pub mod simulated;
pub mod sink;

pub use card::MusicCard;
pub use catalog::{Track, TrackCatalog};
pub use controller::{AudioPlaybackController, PlaybackOutcome, PlaybackState, Progress};
pub use simulated::SimulatedSink;
pub use sink::{AudioSink, MediaError, MediaEvent};
