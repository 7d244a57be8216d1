//! # Genie SDK - chat-driven smart-home dashboard client
//!
//! Provides a blocking, handle-based API over a genie-home backend:
//!
//! ```rust,no_run
//! use genie_sdk::{GenieConfig, GenieHome, RootStyle};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), genie_sdk::SdkError> {
//!     let home = GenieHome::connect(GenieConfig::from_env()?)?;
//!
//!     let root = RootStyle::new();
//!     home.attach_style(Arc::new(root.clone()));
//!
//!     home.set_mood("Relax")?;
//!     assert_eq!(root.get("--accentColor").as_deref(), Some("#00E5FF"));
//!
//!     let turn = home.chat().send("Dim the lights to 40")?;
//!     println!("Genie: {}", turn.reply);
//!     Ok(())
//! }
//! ```
//!
//! ## Key Features
//!
//! - **One writer**: every backend reply that carries devices goes through the
//!   state crate's `DeviceSyncEngine`
//! - **Ordered replies**: each request takes a sequence before it is sent, and a
//!   reply older than what the table already holds is dropped per device
//! - **All-or-nothing moods**: theme and device scene change together
//! - **One message in flight**: the chat orchestrator refuses overlapping sends
//! - **Music cards**: local playback follows the music device, with
//!   cancellation on drop
//! - **Insights feed**: usage insights refetched in the background until
//!   the feed is dropped
//!
//! ## Architecture
//!
//! ```text
//! genie-sdk (GenieHome, handles, chat, moods, music cards)
//!     ↓
//! genie-state (DeviceSyncEngine, ThemeStore, MoodState, Transcript)
//!     ↓
//! genie-api (model, validation, GenieClient)
//! ```

pub mod audio;
mod chat;
mod config;
mod context;
mod device;
mod error;
mod home;
mod insights;
mod mood;
pub mod poller;

pub use chat::{ChatOrchestrator, ChatTurn};
pub use config::GenieConfig;
pub use device::DeviceHandle;
pub use error::SdkError;
pub use home::GenieHome;
pub use insights::InsightsFeed;
pub use mood::{MoodOutcome, MoodThemeApplier};

// Re-export commonly used types
pub use genie_api::wire::{ActionPattern, Insights};
pub use genie_api::{Device, DeviceId, DeviceKind, DeviceUpdate, Theme};
pub use genie_state::{
    ChatMessage, RootStyle, Sender, StyleTarget, SyncReport, TableSnapshot, Transcript,
};
